//! Certificate: the terminal proof artifact for a completed enrollment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mention::Mention;

/// Proof of simulation completion.
///
/// At most one certificate exists per enrollment; its existence implies
/// the enrollment's status is complete. Never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    /// Unique certificate id.
    pub id: Uuid,
    /// The certified learner.
    pub learner_id: Uuid,
    /// The completed simulation.
    pub simulation_id: Uuid,
    /// The enrollment that earned this certificate (unique).
    pub enrollment_id: Uuid,
    /// Final global score of the enrollment.
    pub final_score: u8,
    /// Mention band of the final score.
    pub mention: Mention,
    /// Human-shareable number, e.g. `ATELIER-2026-K3X9QZ`.
    pub number: String,
    /// When the certificate was minted.
    pub issued_at: DateTime<Utc>,
}
