//! Error taxonomy for the orchestration pipeline.
//!
//! Validation, authorization, state-conflict, and rate-limit errors are
//! terminal 4xx with specific, user-facing (French) messages;
//! dependency and backend failures are 5xx whose real cause is logged
//! server-side while the API body stays generic.

use axum::http::StatusCode;

use atelier_scoring::ScoringError;
use atelier_store::StoreError;

/// A specialized `Result` type for orchestration operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Errors raised by the submission/feedback/certification pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// No authenticated learner identity on the request.
    #[error("Non authentifié")]
    Unauthenticated,

    /// A required request field is absent.
    #[error("Paramètres manquants : {required} requis.")]
    MissingParameters {
        /// Comma-separated list of the required fields.
        required: &'static str,
    },

    /// Trimmed deliverable below the minimum length.
    #[error("Le livrable est trop court. Minimum {minimum} caractères.")]
    DeliverableTooShort {
        /// The configured minimum, in characters.
        minimum: usize,
    },

    /// The referenced enrollment does not exist.
    #[error("Inscription introuvable.")]
    EnrollmentNotFound,

    /// The referenced submission does not exist.
    #[error("Soumission introuvable.")]
    SubmissionNotFound,

    /// The resource exists but belongs to another learner.
    #[error("Accès refusé.")]
    AccessDenied,

    /// The module already has an evaluated submission.
    #[error("Ce module a déjà été évalué.")]
    AlreadyEvaluated,

    /// A final score outside the 0-100 scale.
    #[error("Le score final doit être compris entre 0 et 100.")]
    ScoreOutOfRange,

    /// The learner exhausted the daily submission budget.
    #[error("Tu as atteint la limite de {limit} soumissions par jour. Réessaie demain !")]
    RateLimitExceeded {
        /// The daily budget that was hit.
        limit: u64,
    },

    /// Certificate number generation collided twice in a row.
    #[error("certificate number collision after retry")]
    CertificateNumberCollision,

    /// The scoring gateway failed (timeout, malformed output, upstream).
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// The persistence layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PlatformError {
    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::MissingParameters { .. }
            | Self::DeliverableTooShort { .. }
            | Self::ScoreOutOfRange => StatusCode::BAD_REQUEST,
            Self::EnrollmentNotFound | Self::SubmissionNotFound => StatusCode::NOT_FOUND,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::AlreadyEvaluated => StatusCode::CONFLICT,
            Self::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::CertificateNumberCollision | Self::Scoring(_) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns `true` when the real cause must stay server-side and the
    /// API body should carry a generic message.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }
}
