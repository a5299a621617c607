//! HTTP API endpoints for the learner progression platform.
//!
//! # Endpoints
//!
//! - `POST /api/submissions` - Admit a deliverable for a module
//! - `POST /api/feedback` - Score a submission and advance the enrollment
//! - `POST /api/certificates` - Issue a certificate for a completed enrollment
//!
//! The learner identity comes from the `x-learner-id` header, set by the
//! authenticating proxy in front of this service. The certificates
//! endpoint is internal and trusts its caller.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use atelier_orchestrator::{create_router, AppState, Config};
//! use atelier_scoring::ScriptedEvaluator;
//! use atelier_store::MemoryStore;
//!
//! # async fn example() {
//! let state = AppState::new(
//!     Config::default(),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(ScriptedEvaluator::always("{}")),
//! );
//!
//! let router = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(listener, router).await.unwrap();
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::request::Parts,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;
use uuid::Uuid;

use atelier_domain::Mention;
use atelier_scoring::{Evaluator, ScoringGateway};
use atelier_store::Store;

use crate::certificate::CertificateService;
use crate::config::Config;
use crate::error::PlatformError;
use crate::feedback::FeedbackService;
use crate::submission::SubmissionService;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the submissions endpoint.
///
/// Fields are optional so that a missing one maps to a 400 with the list
/// of required parameters rather than a generic deserialization error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    /// Module the deliverable answers.
    pub module_id: Option<Uuid>,
    /// Enrollment the submission belongs to.
    pub enrollment_id: Option<Uuid>,
    /// The deliverable text.
    pub deliverable_text: Option<String>,
}

/// Response body for the submissions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// Whether the submission was admitted.
    pub success: bool,
    /// Identifier of the stored submission.
    pub submission_id: Uuid,
}

/// Request body for the feedback endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFeedbackRequest {
    /// Submission to score.
    pub submission_id: Option<Uuid>,
    /// Briefing the deliverable answers.
    pub briefing: Option<String>,
    /// The deliverable text.
    pub deliverable_text: Option<String>,
    /// Title of the module, for the evaluation prompt.
    pub module_title: Option<String>,
    /// Title of the simulation, for the evaluation prompt.
    pub simulation_title: Option<String>,
}

/// Response body for the feedback endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    /// Whether the feedback was recorded.
    pub success: bool,
    /// Identifier of the stored feedback.
    pub feedback_id: Uuid,
}

/// Request body for the certificates endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateRequest {
    /// Completed enrollment to certify.
    pub enrollment_id: Option<Uuid>,
    /// Learner the certificate belongs to.
    pub learner_id: Option<Uuid>,
    /// Simulation the enrollment covered.
    pub simulation_id: Option<Uuid>,
    /// Final score carried onto the certificate.
    pub final_score: Option<u8>,
}

/// Response body for the certificates endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateResponse {
    /// Whether a certificate exists for the enrollment.
    pub success: bool,
    /// Identifier of the certificate.
    pub certificate_id: Uuid,
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error, in the learner's language.
    pub error: String,
}

// ============================================================================
// Learner Identity
// ============================================================================

/// Authenticated learner identity, taken from the `x-learner-id` header.
#[derive(Debug, Clone, Copy)]
pub struct LearnerIdentity(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for LearnerIdentity
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-learner-id")
            .and_then(|v| v.to_str().ok())
            .ok_or(PlatformError::Unauthenticated)?;
        let id = Uuid::parse_str(header).map_err(|_| PlatformError::Unauthenticated)?;
        Ok(Self(id))
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the platform.
    pub config: Config,
    /// Admission control for deliverables.
    pub submissions: SubmissionService,
    /// Scoring and progression pipeline.
    pub feedback: FeedbackService,
    /// Certificate issuance.
    pub certificates: CertificateService,
}

impl AppState {
    /// Creates a new `AppState`, wiring the services to the given store
    /// and evaluator according to the configuration.
    #[must_use]
    pub fn new(config: Config, store: Arc<dyn Store>, evaluator: Arc<dyn Evaluator>) -> Self {
        let gateway = ScoringGateway::with_timeout(
            evaluator,
            Duration::from_secs(config.scoring_timeout_secs),
        );
        let submissions = SubmissionService::new(
            store.clone(),
            config.min_deliverable_chars,
            config.daily_submission_limit,
        );
        let certificates = CertificateService::new(store.clone(), config.certificate_prefix.clone());
        let feedback = FeedbackService::new(store, gateway, certificates.clone());

        Self {
            config,
            submissions,
            feedback,
            certificates,
        }
    }
}

// ============================================================================
// Error Responses
// ============================================================================

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal failures get logged with detail and surfaced generically.
        let message = if self.is_internal() {
            error!(error = %self, "Request failed");
            "Erreur interne".to_string()
        } else {
            self.to_string()
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all API endpoints.
///
/// The router carries:
/// - All API routes under `/api`
/// - CORS middleware for development
/// - Tracing middleware for request logging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/submissions", post(handle_submit))
        .route("/feedback", post(handle_feedback))
        .route("/certificates", post(handle_certificate));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for `POST /api/submissions`.
async fn handle_submit(
    State(state): State<Arc<AppState>>,
    LearnerIdentity(learner_id): LearnerIdentity,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, PlatformError> {
    let (module_id, enrollment_id, deliverable_text) = match (
        request.module_id,
        request.enrollment_id,
        request.deliverable_text,
    ) {
        (Some(m), Some(e), Some(t)) => (m, e, t),
        _ => {
            return Err(PlatformError::MissingParameters {
                required: "moduleId, enrollmentId et deliverableText",
            })
        }
    };

    let submission_id = state
        .submissions
        .submit(learner_id, module_id, enrollment_id, &deliverable_text)
        .await?;

    Ok(Json(SubmitResponse {
        success: true,
        submission_id,
    }))
}

/// Treats a blank (whitespace-only) string the same as an absent one.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Handler for `POST /api/feedback`.
async fn handle_feedback(
    State(state): State<Arc<AppState>>,
    LearnerIdentity(learner_id): LearnerIdentity,
    Json(request): Json<ProcessFeedbackRequest>,
) -> Result<Json<FeedbackResponse>, PlatformError> {
    let (submission_id, briefing, deliverable_text, module_title, simulation_title) = match (
        request.submission_id,
        present(request.briefing),
        present(request.deliverable_text),
        present(request.module_title),
        present(request.simulation_title),
    ) {
        (Some(s), Some(b), Some(d), Some(m), Some(sim)) => (s, b, d, m, sim),
        _ => {
            return Err(PlatformError::MissingParameters {
                required:
                    "submissionId, briefing, deliverableText, moduleTitle et simulationTitle",
            })
        }
    };

    let feedback_id = state
        .feedback
        .process(
            learner_id,
            submission_id,
            &briefing,
            &deliverable_text,
            &module_title,
            &simulation_title,
        )
        .await?;

    Ok(Json(FeedbackResponse {
        success: true,
        feedback_id,
    }))
}

/// Handler for `POST /api/certificates`.
///
/// Idempotent: re-posting for an already certified enrollment returns
/// the existing certificate.
async fn handle_certificate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IssueCertificateRequest>,
) -> Result<Json<IssueCertificateResponse>, PlatformError> {
    let (enrollment_id, learner_id, simulation_id, final_score) = match (
        request.enrollment_id,
        request.learner_id,
        request.simulation_id,
        request.final_score,
    ) {
        (Some(e), Some(l), Some(s), Some(f)) => (e, l, s, f),
        _ => {
            return Err(PlatformError::MissingParameters {
                required: "enrollmentId, learnerId, simulationId et finalScore",
            })
        }
    };

    if final_score > 100 {
        return Err(PlatformError::ScoreOutOfRange);
    }

    let certificate_id = state
        .certificates
        .issue(
            enrollment_id,
            learner_id,
            simulation_id,
            final_score,
            Mention::from_score(final_score),
        )
        .await?;

    Ok(Json(IssueCertificateResponse {
        success: true,
        certificate_id,
    }))
}
