//! Scene extraction from vision-model analysis text.
//!
//! The inference provider returns loosely formatted natural-language text
//! describing a video's shots. Two grammars are applied in fixed priority
//! order: the emphasis-delimited markdown form the prompt asks for
//! ([`primary`]), and a plain line-oriented form some model outputs degrade
//! into ([`fallback`]). Individual fragments either grammar cannot read are
//! dropped silently; only a total extraction failure surfaces as an error.

pub mod extract;
pub mod fallback;
pub mod primary;

pub use extract::{extract_scenes, number_scenes, Extraction, ParseError, ParseStrategy};
