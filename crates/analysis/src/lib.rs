//! Model-backed inconsistency analysis for extracted slide decks.
//!
//! The stage is a straight line: assemble the deck into one prompt body,
//! call the model (with bounded retry on rate limiting), then dig the JSON
//! findings out of the free-text reply. Every failure past extraction
//! degrades to an empty findings list; the caller always gets a
//! well-formed result.

pub mod analyzer;
pub mod client;
pub mod parse;
pub mod prompt;

pub use analyzer::{Analyzer, RAW_REPLY_FILE};
pub use client::{GeminiClient, ModelClient, ModelConfig, ModelError};
