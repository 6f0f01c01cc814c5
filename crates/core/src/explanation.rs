//! Human-readable explanation of a candidate diagnosis.

use crate::scoring::DiagnosisResult;

const SEGMENT_SEPARATOR: &str = " | ";

/// Rendered when a candidate has nothing in any bucket.
pub const NO_EVIDENCE: &str = "No direct symptom evidence";

/// Render the explanation for a scored candidate.
///
/// Segments appear in a fixed order (strong matches, partial matches, negative-match notes,
/// suggested checks) and empty buckets are skipped, so the output depends only on the result.
pub fn explain(result: &DiagnosisResult) -> String {
    let mut segments = Vec::new();

    if !result.matched.is_empty() {
        segments.push(format!(
            "Strong match on: {}",
            join_names(result.matched.iter().map(|m| m.display_name.as_str()))
        ));
    }
    if !result.partial.is_empty() {
        segments.push(format!(
            "Partial match on: {}",
            join_names(result.partial.iter().map(|m| m.display_name.as_str()))
        ));
    }
    segments.extend(result.negative.iter().map(|n| n.note.clone()));
    if !result.missing.is_empty() {
        segments.push(format!(
            "Consider checking for: {}",
            join_names(result.missing.iter().map(|m| m.display_name.as_str()))
        ));
    }

    if segments.is_empty() {
        NO_EVIDENCE.to_string()
    } else {
        segments.join(SEGMENT_SEPARATOR)
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}
