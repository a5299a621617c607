//! Atelier Orchestrator
//!
//! Admission control, scoring orchestration, enrollment progression, and
//! certificate issuance behind the HTTP API.

pub mod api;
pub mod certificate;
pub mod config;
pub mod error;
pub mod feedback;
pub mod submission;

pub use api::{
    create_router, AppState, ErrorResponse, FeedbackResponse, IssueCertificateRequest,
    IssueCertificateResponse, LearnerIdentity, ProcessFeedbackRequest, SubmitRequest,
    SubmitResponse,
};
pub use certificate::{certificate_number, CertificateService};
pub use config::{Config, ConfigError};
pub use error::{PlatformError, Result};
pub use feedback::FeedbackService;
pub use submission::{start_of_day, SubmissionService};
