//! Client for the video analysis inference provider.
//!
//! The provider is Google's Gemini `generateContent` REST surface: one
//! request carries the fixed instructional prompt, the video URI, and an
//! output-length bound; the response is raw analysis text. Everything the
//! provider can do wrong — transport failure, non-2xx, unparsable body,
//! empty text — collapses into [`InferenceError`], which the orchestrator
//! treats uniformly.

pub mod client;
pub mod error;
mod types;

pub use client::{GeminiClient, GeminiConfig};
pub use error::{InferenceError, InferenceResult};
