//! Firestore REST persistence for videos and montage sheets.
//!
//! This crate provides:
//! - A Firestore REST client with service-account authentication and a
//!   cached access token
//! - Value/document mapping between Firestore wire values and the
//!   Cutsheet data model
//! - Typed repositories for video lifecycle records and montage sheets,
//!   including an atomic batch insert for sheet entries

pub mod auth;
pub mod client;
pub mod error;
pub mod repos;
pub mod types;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use repos::{SheetRepository, VideoRepository};
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
