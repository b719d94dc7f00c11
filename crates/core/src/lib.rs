//! Core domain types, error taxonomy, and report assembly
//! for slide-deck inconsistency analysis.

pub mod error;
pub mod report;
pub mod types;

pub use error::{Error, Result};
pub use report::{AnalysisReport, RunStatistics};
pub use types::{Inconsistency, Severity, SlideContent};
