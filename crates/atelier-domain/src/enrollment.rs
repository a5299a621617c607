//! Enrollment: one learner's attempt at one simulation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an enrollment.
///
/// `InProgress` is the only state mutated by the progression engine;
/// `Complete` and `Abandoned` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Learner is working through the simulation's modules.
    #[default]
    InProgress,
    /// All modules evaluated; final score recorded.
    Complete,
    /// Learner gave up; no transition out of this state.
    Abandoned,
}

impl EnrollmentStatus {
    /// Returns `true` if no further progression is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Abandoned)
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
            Self::Abandoned => "abandoned",
        };
        f.write_str(s)
    }
}

/// One learner's attempt at one simulation.
///
/// `current_module_id` is the progression cursor; it is `None` exactly
/// when the enrollment is no longer in progress. `final_score` is set
/// only on completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    /// Unique enrollment id.
    pub id: Uuid,
    /// The learner who started this attempt.
    pub learner_id: Uuid,
    /// The simulation being attempted.
    pub simulation_id: Uuid,
    /// Lifecycle status.
    pub status: EnrollmentStatus,
    /// The module the learner is currently on, if in progress.
    pub current_module_id: Option<Uuid>,
    /// Global score recorded at completion.
    pub final_score: Option<u8>,
    /// When the learner started the simulation.
    pub started_at: DateTime<Utc>,
    /// When the enrollment completed, if it did.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    /// Creates a fresh in-progress enrollment pointing at the first module.
    #[must_use]
    pub fn new(learner_id: Uuid, simulation_id: Uuid, first_module_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            learner_id,
            simulation_id,
            status: EnrollmentStatus::InProgress,
            current_module_id: Some(first_module_id),
            final_score: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Returns `true` if the enrollment can still advance.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, EnrollmentStatus::InProgress)
    }
}
