//! Submissions and their evaluation results.
//!
//! A [`Submission`] is one learner's deliverable for one module within
//! one enrollment. A [`ScoreReport`] is the parsed output of the
//! external evaluator; a [`Feedback`] is that report persisted against
//! a submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mention::Mention;

/// Evaluation status of a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Admitted, not yet evaluated.
    #[default]
    Pending,
    /// Feedback recorded; the submission is immutable from here on.
    Evaluated,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Evaluated => "evaluated",
        };
        f.write_str(s)
    }
}

/// One learner's deliverable for one module within one enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Unique submission id.
    pub id: Uuid,
    /// The learner who submitted.
    pub learner_id: Uuid,
    /// The module the deliverable answers.
    pub module_id: Uuid,
    /// The enrollment this submission belongs to.
    pub enrollment_id: Uuid,
    /// Trimmed deliverable text.
    pub text: String,
    /// Evaluation status.
    pub status: SubmissionStatus,
    /// When the submission was admitted.
    pub submitted_at: DateTime<Utc>,
}

/// Structured result of evaluating one deliverable.
///
/// Sub-scores are weighted 30/30/20/20 into the global score by the
/// evaluator; the gateway validates ranges but does not recompute the
/// weighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Global score, 0-100.
    pub global: u8,
    /// Relevance to the briefing (30%).
    pub relevance: u8,
    /// Quality of analysis (30%).
    pub analysis: u8,
    /// Clarity and presentation (20%).
    pub clarity: u8,
    /// Creativity and initiative (20%).
    pub creativity: u8,
    /// Mention band reported by the evaluator.
    pub mention: Mention,
    /// 2-3 concrete strengths.
    pub strengths: Vec<String>,
    /// 2-3 concrete improvement areas.
    pub improvements: Vec<String>,
    /// Narrative comment, a few sentences.
    pub comment: String,
}

/// A [`ScoreReport`] persisted against a submission.
///
/// Created exactly once per submission and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    /// Unique feedback id.
    pub id: Uuid,
    /// The submission this feedback evaluates.
    pub submission_id: Uuid,
    /// Global score, 0-100.
    pub global_score: u8,
    /// Relevance sub-score.
    pub relevance_score: u8,
    /// Analysis sub-score.
    pub analysis_score: u8,
    /// Clarity sub-score.
    pub clarity_score: u8,
    /// Creativity sub-score.
    pub creativity_score: u8,
    /// Mention band.
    pub mention: Mention,
    /// Strengths copied verbatim from the report.
    pub strengths: Vec<String>,
    /// Improvement areas copied verbatim from the report.
    pub improvements: Vec<String>,
    /// Narrative comment.
    pub comment: String,
    /// When the feedback was generated.
    pub generated_at: DateTime<Utc>,
}
