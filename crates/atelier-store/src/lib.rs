//! Atelier Store
//!
//! The persistence seam for the platform. [`Store`] describes the
//! read/write contracts the orchestration pipeline relies on; the
//! relational backend sits behind it as an external collaborator.
//! [`MemoryStore`] is the in-process implementation used by the dev
//! server and the test suites.
//!
//! Write ordering matters to callers (submission, then feedback, then
//! status, then enrollment, then certificate) and the store makes no
//! atomicity promise across calls; each method is one committed
//! round-trip.

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use atelier_domain::{Certificate, Enrollment, Feedback, Mention, ModuleRef, Submission};

/// A specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An update targeted a row that does not exist.
    #[error("{entity} not found: {id}")]
    RowNotFound {
        /// Entity kind, e.g. "enrollment".
        entity: &'static str,
        /// The missing row's id.
        id: Uuid,
    },

    /// An insert violated a uniqueness constraint.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation {
        /// Name of the violated constraint.
        constraint: &'static str,
    },

    /// The backend failed (connectivity, query error).
    #[error("store backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a `RowNotFound` error.
    #[must_use]
    pub const fn row_not_found(entity: &'static str, id: Uuid) -> Self {
        Self::RowNotFound { entity, id }
    }

    /// Returns `true` for uniqueness violations, which certificate
    /// issuance treats as retryable once.
    #[must_use]
    pub const fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

/// Insert payload for a new submission row.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    /// The submitting learner.
    pub learner_id: Uuid,
    /// The module the deliverable answers.
    pub module_id: Uuid,
    /// The enrollment the submission belongs to.
    pub enrollment_id: Uuid,
    /// Trimmed deliverable text.
    pub text: String,
}

/// Insert payload for a new feedback row.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    /// The submission being evaluated.
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
    /// Strengths from the score report.
    pub strengths: Vec<String>,
    /// Improvement areas from the score report.
    pub improvements: Vec<String>,
    /// Narrative comment.
    pub comment: String,
}

/// Insert payload for a new certificate row.
#[derive(Debug, Clone)]
pub struct NewCertificate {
    /// The certified learner.
    pub learner_id: Uuid,
    /// The completed simulation.
    pub simulation_id: Uuid,
    /// The completed enrollment (unique per certificate).
    pub enrollment_id: Uuid,
    /// Final global score.
    pub final_score: u8,
    /// Mention band.
    pub mention: Mention,
    /// Generated human-shareable number (unique).
    pub number: String,
}

/// Read/write contracts the orchestration pipeline depends on.
///
/// Each method is a single committed operation against the backend;
/// callers sequence them and own the (non-transactional) ordering.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Fetches an enrollment by id.
    async fn enrollment(&self, id: Uuid) -> Result<Option<Enrollment>>;

    /// Moves an in-progress enrollment's cursor to `next_module_id`.
    async fn advance_enrollment(&self, id: Uuid, next_module_id: Uuid) -> Result<()>;

    /// Marks an enrollment complete: status, final score, cleared
    /// cursor, completion timestamp.
    async fn complete_enrollment(
        &self,
        id: Uuid,
        final_score: u8,
        completed_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Fetches a submission by id.
    async fn submission(&self, id: Uuid) -> Result<Option<Submission>>;

    /// Finds the existing submission for a (learner, module, enrollment)
    /// triple, if any. When several exist (pending re-submissions), any
    /// evaluated one wins.
    async fn find_submission(
        &self,
        learner_id: Uuid,
        module_id: Uuid,
        enrollment_id: Uuid,
    ) -> Result<Option<Submission>>;

    /// Counts a learner's submissions admitted at or after `since`.
    async fn count_submissions_since(&self, learner_id: Uuid, since: DateTime<Utc>) -> Result<u64>;

    /// Inserts a pending submission row and returns it.
    async fn insert_submission(&self, new: NewSubmission) -> Result<Submission>;

    /// Transitions a submission to evaluated.
    async fn mark_submission_evaluated(&self, id: Uuid) -> Result<()>;

    /// Inserts a feedback row and returns it.
    async fn insert_feedback(&self, new: NewFeedback) -> Result<Feedback>;

    /// Fetches a simulation's modules ordered by sequence position.
    async fn simulation_modules(&self, simulation_id: Uuid) -> Result<Vec<ModuleRef>>;

    /// Finds the certificate for an enrollment, if one was issued.
    async fn certificate_for_enrollment(&self, enrollment_id: Uuid)
        -> Result<Option<Certificate>>;

    /// Inserts a certificate row and returns it.
    ///
    /// Fails with [`StoreError::UniqueViolation`] when the enrollment
    /// already holds a certificate or the number is taken.
    async fn insert_certificate(&self, new: NewCertificate) -> Result<Certificate>;
}
