//! Extraction and validation of the evaluator's score report.
//!
//! The evaluator returns prose expected to contain exactly one JSON
//! object matching the report contract. This module isolates the
//! locate/parse/validate step as a pure function so malformed outputs
//! can be tested without any network behavior.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use atelier_domain::{Mention, ScoreReport};

use crate::{Result, ScoringError};

/// The evaluator's JSON shape, before range validation. French wire
/// keys per the prompt contract.
#[derive(Debug, Deserialize)]
struct RawReport {
    score_global: i64,
    score_pertinence: i64,
    score_analyse: i64,
    score_clarte: i64,
    score_creativite: i64,
    mention: Mention,
    points_forts: Vec<String>,
    axes_amelioration: Vec<String>,
    commentaire_detaille: String,
}

// Widest brace span, same extraction the prompt contract assumes: one
// object, possibly wrapped in prose.
#[allow(clippy::unwrap_used)] // pattern is a checked literal
fn json_object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}").unwrap())
}

/// Locates and validates the score report embedded in evaluator output.
///
/// Fails with [`ScoringError::InvalidOutput`] when no JSON object is
/// present, required fields are missing, a score falls outside 0-100,
/// or the strengths/improvements lists are empty.
pub fn parse_score_report(raw: &str) -> Result<ScoreReport> {
    let candidate = json_object_pattern()
        .find(raw)
        .ok_or_else(|| ScoringError::invalid_output("no JSON object in evaluator output"))?;

    let raw_report: RawReport = serde_json::from_str(candidate.as_str())
        .map_err(|e| ScoringError::invalid_output(format!("malformed report: {e}")))?;

    let report = ScoreReport {
        global: score_in_range("score_global", raw_report.score_global)?,
        relevance: score_in_range("score_pertinence", raw_report.score_pertinence)?,
        analysis: score_in_range("score_analyse", raw_report.score_analyse)?,
        clarity: score_in_range("score_clarte", raw_report.score_clarte)?,
        creativity: score_in_range("score_creativite", raw_report.score_creativite)?,
        mention: raw_report.mention,
        strengths: raw_report.points_forts,
        improvements: raw_report.axes_amelioration,
        comment: raw_report.commentaire_detaille,
    };

    if report.strengths.is_empty() {
        return Err(ScoringError::invalid_output("points_forts is empty"));
    }
    if report.improvements.is_empty() {
        return Err(ScoringError::invalid_output("axes_amelioration is empty"));
    }
    Ok(report)
}

fn score_in_range(field: &str, value: i64) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 100)
        .ok_or_else(|| ScoringError::invalid_output(format!("{field} out of range: {value}")))
}
