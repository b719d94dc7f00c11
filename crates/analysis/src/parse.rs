//! Digging the JSON findings out of a free-text model reply.

use deckcheck_core::Inconsistency;

/// Substring spanning the first `{` through the last `}` of the reply.
///
/// Brace scanning is inherently fragile (prose containing braces, multiple
/// JSON-like blocks), so it is isolated here: a stricter fence-based
/// strategy can replace this function without touching the rest of the
/// stage.
pub fn extract_json_block(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&reply[start..=end])
}

/// Finding records from a raw model reply.
///
/// Soft failure throughout: a reply with no locatable JSON, or JSON that
/// does not decode, logs and yields an empty list. An absent
/// `inconsistencies` field means no findings. Individual records are
/// carried through as-is, malformed or not; the report echoes what the
/// model wrote.
pub fn parse_findings(reply: &str) -> Vec<Inconsistency> {
    let block = match extract_json_block(reply) {
        Some(block) => block,
        None => {
            log::error!("No JSON object found in model reply");
            return Vec::new();
        }
    };

    let value: serde_json::Value = match serde_json::from_str(block) {
        Ok(value) => value,
        Err(e) => {
            log::error!("Model reply JSON failed to decode: {}", e);
            return Vec::new();
        }
    };

    let records = match value.get("inconsistencies").and_then(|v| v.as_array()) {
        Some(records) => records,
        None => {
            log::info!("Model reply carries no inconsistencies field");
            return Vec::new();
        }
    };

    let findings: Vec<Inconsistency> = records
        .iter()
        .map(|record| Inconsistency::from(record.clone()))
        .collect();

    log::info!("Found {} inconsistencies in response", findings.len());
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckcheck_core::Severity;

    #[test]
    fn finds_json_embedded_in_prose() {
        let reply = concat!(
            "Here is the result: {\"inconsistencies\": [{\"type\": \"NUMERICAL\",",
            "\"slides\":[2,5],\"description\":\"d\",\"evidence\":[\"e1\",\"e2\"],",
            "\"severity\":\"High\"}]} Thanks"
        );

        let findings = parse_findings(reply);
        assert_eq!(findings.len(), 1);

        let finding = &findings[0];
        assert_eq!(finding.kind(), Some("NUMERICAL"));
        assert_eq!(finding.slides(), vec![2, 5]);
        assert_eq!(finding.description(), Some("d"));
        assert_eq!(finding.evidence(), vec!["e1", "e2"]);
        assert_eq!(finding.severity(), Severity::High);
    }

    #[test]
    fn reply_without_braces_yields_empty_list() {
        assert!(parse_findings("I could not find any issues.").is_empty());
    }

    #[test]
    fn invalid_json_between_braces_yields_empty_list() {
        assert!(parse_findings("see {not valid json}").is_empty());
    }

    #[test]
    fn reversed_braces_yield_empty_list() {
        assert!(parse_findings("} backwards {").is_empty());
    }

    #[test]
    fn missing_inconsistencies_field_means_no_findings() {
        assert!(parse_findings(r#"{"result": "clean"}"#).is_empty());
    }

    #[test]
    fn empty_inconsistencies_array_means_no_findings() {
        assert!(parse_findings(r#"{"inconsistencies": []}"#).is_empty());
    }

    #[test]
    fn partially_shaped_records_survive() {
        let findings =
            parse_findings(r#"{"inconsistencies": [{"type": "TIMELINE"}, {"slides": [1]}]}"#);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].kind(), Some("TIMELINE"));
        assert_eq!(findings[0].severity(), Severity::Unknown);
        assert_eq!(findings[1].slides(), vec![1]);
    }

    #[test]
    fn malformed_records_pass_through_untouched() {
        let findings = parse_findings(
            r#"{"inconsistencies": [
                {"slides": ["2", "5"], "severity": "high"},
                "not even an object"
            ]}"#,
        );
        assert_eq!(findings.len(), 2);

        let first = serde_json::to_value(&findings[0]).unwrap();
        assert_eq!(first["slides"], serde_json::json!(["2", "5"]));
        assert_eq!(first["severity"], "high");

        let second = serde_json::to_value(&findings[1]).unwrap();
        assert_eq!(second, serde_json::json!("not even an object"));
    }

    #[test]
    fn json_block_spans_first_open_to_last_close() {
        assert_eq!(extract_json_block("a {b} c {d} e"), Some("{b} c {d}"));
        assert_eq!(extract_json_block("no braces"), None);
    }
}
