//! Final report assembly and serialization.
//!
//! The report is the terminal artifact of a run: run statistics plus the
//! finding records, written once as pretty-printed JSON.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::types::Inconsistency;

/// Run statistics included in every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Slides in the source deck, including content-free ones.
    pub total_slides: usize,

    /// Number of finding records in the report.
    pub issues_found: usize,

    /// Completion time, formatted `YYYY-MM-DD HH:MM:SS`.
    pub analysis_time: String,
}

/// Aggregated result of an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub statistics: RunStatistics,
    pub inconsistencies: Vec<Inconsistency>,
}

impl AnalysisReport {
    /// Assemble a report from the deck size and the parsed findings,
    /// stamped with the current local time.
    pub fn new(total_slides: usize, inconsistencies: Vec<Inconsistency>) -> Self {
        Self::with_timestamp(total_slides, inconsistencies, Local::now())
    }

    /// Assemble a report with an explicit completion time.
    pub fn with_timestamp(
        total_slides: usize,
        inconsistencies: Vec<Inconsistency>,
        completed: DateTime<Local>,
    ) -> Self {
        Self {
            statistics: RunStatistics {
                total_slides,
                issues_found: inconsistencies.len(),
                analysis_time: completed.format("%Y-%m-%d %H:%M:%S").to_string(),
            },
            inconsistencies,
        }
    }

    /// Pretty-printed JSON rendering of the report.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
