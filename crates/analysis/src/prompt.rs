//! Prompt assembly: the fixed instruction template and the deck body.

use deckcheck_core::SlideContent;

/// Instruction template sent ahead of the deck body on every call.
pub const ANALYSIS_INSTRUCTIONS: &str = r#"
Analyze this PowerPoint presentation for factual/logical inconsistencies with focus on:
1. Numerical conflicts (values, percentages, timeframes)
2. Contradictory claims (descriptions, comparisons)
3. Timeline mismatches
4. Definitional inconsistencies
5. Internal slide consistency (totals vs breakdowns)
6. Cross-slide comparisons of similar metrics
7. Baseline omissions in comparative claims

Return as valid JSON ONLY with structure:
{
    "inconsistencies": [{
        "type": "CATEGORY",
        "slides": [X, Y, ...],
        "description": "Explanation with context",
        "evidence": ["Full context quote from slide X", "Full context quote from slide Y"],
        "severity": "Critical/High/Medium/Low"
    }]
}

CRITICAL = Major numerical conflicts or contradictory core claims
HIGH = Significant inconsistencies affecting key messages
MEDIUM = Minor numerical mismatches or missing context
LOW = Presentation inconsistencies without material impact

If no issues: {"inconsistencies": []}
"#;

/// Serialize the deck into one prompt body: a `--- SLIDE <n> ---` header
/// per slide followed by that slide's content, slides separated by a
/// blank line.
pub fn assemble_deck_body(deck: &SlideContent) -> String {
    deck.iter()
        .map(|(number, content)| format!("--- SLIDE {} ---\n{}", number, content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Rough token count for log output. 1 token is roughly 4 characters.
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / 4
}
