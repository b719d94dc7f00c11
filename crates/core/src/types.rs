//! Domain types for extracted deck content and model findings.

use serde::{Deserialize, Serialize};

/// Per-slide extracted text for an entire deck.
///
/// Slide numbers are 1-based and contiguous. A slide with no extractable
/// content keeps its slot as an empty string so numbering never drifts
/// from the source document. Built once by the extractor, read-only after.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlideContent {
    slides: Vec<String>,
}

impl SlideContent {
    /// Create an empty deck.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next slide's content blob. Empty strings are kept so the
    /// slide count matches the source deck.
    pub fn push_slide(&mut self, content: impl Into<String>) {
        self.slides.push(content.into());
    }

    /// Number of slides in the deck.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Content of the given 1-based slide number.
    pub fn get(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.slides.get(i))
            .map(String::as_str)
    }

    /// Iterate slides as `(1-based number, content)` in deck order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.slides
            .iter()
            .enumerate()
            .map(|(i, s)| (i + 1, s.as_str()))
    }
}

/// A single finding reported by the model.
///
/// The record is kept as the raw JSON the model produced: the response
/// parser extracts shape, it does not enforce schema, so a malformed
/// record flows through to the report exactly as the model wrote it.
/// The typed accessors read the documented fields where they are present
/// and well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inconsistency(serde_json::Value);

impl Inconsistency {
    /// Category label, e.g. `NUMERICAL` or `TIMELINE`.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(serde_json::Value::as_str)
    }

    /// Slide numbers involved, in the order the model listed them.
    /// Entries that are not numbers are not included here (they are still
    /// present in the raw record).
    pub fn slides(&self) -> Vec<u32> {
        self.0
            .get("slides")
            .and_then(serde_json::Value::as_array)
            .map(|slides| {
                slides
                    .iter()
                    .filter_map(|v| v.as_u64().map(|n| n as u32))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Free-text explanation of the conflict.
    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(serde_json::Value::as_str)
    }

    /// Quoted excerpts from the slides backing the finding.
    pub fn evidence(&self) -> Vec<&str> {
        self.0
            .get("evidence")
            .and_then(serde_json::Value::as_array)
            .map(|quotes| quotes.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn severity(&self) -> Severity {
        self.0
            .get("severity")
            .and_then(serde_json::Value::as_str)
            .map(Severity::from_label)
            .unwrap_or_default()
    }

    /// The record exactly as the model produced it.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for Inconsistency {
    fn from(record: serde_json::Value) -> Self {
        Self(record)
    }
}

/// Severity level attached to a finding by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    /// Anything that is not one of the four known labels.
    #[default]
    Unknown,
}

impl Severity {
    /// Read the label the model attaches to a finding.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Critical" => Self::Critical,
            "High" => Self::High,
            "Medium" => Self::Medium,
            "Low" => Self::Low,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_numbers_are_contiguous_and_one_based() {
        let mut deck = SlideContent::new();
        deck.push_slide("TITLE: Intro");
        deck.push_slide("");
        deck.push_slide("closing remarks");

        assert_eq!(deck.len(), 3);
        let numbers: Vec<usize> = deck.iter().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(deck.get(2), Some(""));
        assert_eq!(deck.get(0), None);
        assert_eq!(deck.get(4), None);
    }

    #[test]
    fn accessors_read_well_formed_fields() {
        let record: Inconsistency = serde_json::from_str(
            r#"{"type": "NUMERICAL", "slides": [2, 5], "description": "d",
                "evidence": ["e1", "e2"], "severity": "High"}"#,
        )
        .unwrap();
        assert_eq!(record.kind(), Some("NUMERICAL"));
        assert_eq!(record.slides(), vec![2, 5]);
        assert_eq!(record.description(), Some("d"));
        assert_eq!(record.evidence(), vec!["e1", "e2"]);
        assert_eq!(record.severity(), Severity::High);
    }

    #[test]
    fn missing_fields_fall_back_without_failing_the_record() {
        let record: Inconsistency = serde_json::from_str(r#"{"type": "TIMELINE"}"#).unwrap();
        assert_eq!(record.kind(), Some("TIMELINE"));
        assert!(record.slides().is_empty());
        assert_eq!(record.description(), None);
        assert_eq!(record.severity(), Severity::Unknown);
    }

    #[test]
    fn malformed_records_round_trip_verbatim() {
        let raw = serde_json::json!({"slides": ["2", "5"], "severity": "high"});
        let record = Inconsistency::from(raw.clone());

        // Typed reads degrade, the raw record does not
        assert!(record.slides().is_empty());
        assert_eq!(record.severity(), Severity::Unknown);
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn severity_labels_are_matched_exactly() {
        assert_eq!(Severity::from_label("Critical"), Severity::Critical);
        assert_eq!(Severity::from_label("Low"), Severity::Low);
        assert_eq!(Severity::from_label("high"), Severity::Unknown);
        assert_eq!(Severity::from_label("Catastrophic"), Severity::Unknown);
    }
}
