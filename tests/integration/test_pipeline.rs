//! End-to-end integration tests for the learner progression pipeline.
//!
//! These tests drive the full HTTP stack: admission control, scoring,
//! feedback persistence, enrollment advancement, and certification, with
//! a scripted evaluator standing in for the external scoring API.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, Response, StatusCode},
    Router,
};
use tower::util::ServiceExt;
use uuid::Uuid;

use atelier_domain::{Enrollment, EnrollmentStatus, ModuleRef, SubmissionStatus};
use atelier_orchestrator::{create_router, AppState, Config};
use atelier_scoring::{Evaluator, ScriptedEvaluator};
use atelier_store::{MemoryStore, Store};

const DELIVERABLE: &str = "Mon analyse couvre le contexte, les cibles prioritaires et trois \
                           recommandations chiffrées pour le lancement.";

/// A complete seeded platform: store, router, and the seeded identifiers.
struct Platform {
    store: Arc<MemoryStore>,
    state: AppState,
    learner: Uuid,
    enrollment: Uuid,
    modules: Vec<ModuleRef>,
}

impl Platform {
    fn router(&self) -> Router {
        create_router(self.state.clone())
    }
}

async fn platform(module_count: usize, evaluator: Arc<dyn Evaluator>) -> Platform {
    let store = Arc::new(MemoryStore::new());
    let learner = Uuid::new_v4();
    let simulation = Uuid::new_v4();
    let modules: Vec<ModuleRef> = (0..module_count)
        .map(|i| ModuleRef {
            id: Uuid::new_v4(),
            position: i32::try_from(i).expect("module position"),
        })
        .collect();
    store.seed_modules(simulation, modules.clone()).await;

    let enrollment = Enrollment::new(learner, simulation, modules[0].id);
    let enrollment_id = enrollment.id;
    store.seed_enrollment(enrollment).await;

    let state = AppState::new(Config::default(), store.clone(), evaluator);

    Platform {
        store,
        state,
        learner,
        enrollment: enrollment_id,
        modules,
    }
}

fn report(global: u8, mention: &str) -> String {
    serde_json::json!({
        "score_global": global,
        "score_pertinence": 80,
        "score_analyse": 85,
        "score_clarte": 78,
        "score_creativite": 83,
        "mention": mention,
        "points_forts": ["Structure claire", "Bonne analyse"],
        "axes_amelioration": ["Chiffrer davantage"],
        "commentaire_detaille": "Un travail solide et bien argumenté."
    })
    .to_string()
}

fn post(uri: &str, learner: Uuid, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-learner-id", learner.to_string())
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Submits a deliverable for the given module and returns the submission id.
async fn submit(p: &Platform, module_id: Uuid) -> Uuid {
    let response = p
        .router()
        .oneshot(post(
            "/api/submissions",
            p.learner,
            serde_json::json!({
                "moduleId": module_id,
                "enrollmentId": p.enrollment,
                "deliverableText": DELIVERABLE,
            }),
        ))
        .await
        .expect("submissions response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    serde_json::from_value(body["submissionId"].clone()).expect("submission id")
}

/// Requests feedback for a submission and returns the raw response.
async fn request_feedback(p: &Platform, submission_id: Uuid) -> Response<Body> {
    p.router()
        .oneshot(post(
            "/api/feedback",
            p.learner,
            serde_json::json!({
                "submissionId": submission_id,
                "briefing": "Analyser le marché local et proposer un positionnement.",
                "deliverableText": DELIVERABLE,
                "moduleTitle": "Étude de marché",
                "simulationTitle": "Lancement produit",
            }),
        ))
        .await
        .expect("feedback response")
}

#[tokio::test]
async fn test_single_module_journey_ends_with_certificate() {
    let p = platform(1, Arc::new(ScriptedEvaluator::always(report(82, "Très bien")))).await;

    let submission_id = submit(&p, p.modules[0].id).await;

    let response = request_feedback(&p, submission_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let submission = p
        .store
        .submission(submission_id)
        .await
        .expect("store")
        .expect("submission");
    assert_eq!(submission.status, SubmissionStatus::Evaluated);

    let enrollment = p
        .store
        .enrollment(p.enrollment)
        .await
        .expect("store")
        .expect("enrollment");
    assert_eq!(enrollment.status, EnrollmentStatus::Complete);
    assert_eq!(enrollment.final_score, Some(82));
    assert!(enrollment.completed_at.is_some());

    let certificate = p
        .store
        .certificate_for_enrollment(p.enrollment)
        .await
        .expect("store")
        .expect("certificate");
    assert_eq!(certificate.final_score, 82);
    assert_eq!(certificate.mention.label(), "Très bien");
    assert!(certificate.number.starts_with("ATELIER-"));
}

#[tokio::test]
async fn test_two_module_journey_advances_then_completes() {
    let p = platform(
        2,
        Arc::new(ScriptedEvaluator::with_responses(vec![
            report(70, "Bien"),
            report(91, "Excellent"),
        ])),
    )
    .await;

    // Module 1: evaluation moves the cursor forward.
    let first = submit(&p, p.modules[0].id).await;
    let response = request_feedback(&p, first).await;
    assert_eq!(response.status(), StatusCode::OK);

    let enrollment = p
        .store
        .enrollment(p.enrollment)
        .await
        .expect("store")
        .expect("enrollment");
    assert_eq!(enrollment.status, EnrollmentStatus::InProgress);
    assert_eq!(enrollment.current_module_id, Some(p.modules[1].id));
    assert_eq!(p.store.certificate_count().await, 0);

    // Module 2: last module completes the enrollment.
    let second = submit(&p, p.modules[1].id).await;
    let response = request_feedback(&p, second).await;
    assert_eq!(response.status(), StatusCode::OK);

    let enrollment = p
        .store
        .enrollment(p.enrollment)
        .await
        .expect("store")
        .expect("enrollment");
    assert_eq!(enrollment.status, EnrollmentStatus::Complete);
    assert_eq!(enrollment.current_module_id, None);
    // The final score is the last module's global score.
    assert_eq!(enrollment.final_score, Some(91));

    let certificate = p
        .store
        .certificate_for_enrollment(p.enrollment)
        .await
        .expect("store")
        .expect("certificate");
    assert_eq!(certificate.mention.label(), "Excellent");
}

#[tokio::test]
async fn test_resubmitting_an_evaluated_module_conflicts() {
    let p = platform(2, Arc::new(ScriptedEvaluator::always(report(70, "Bien")))).await;

    let submission_id = submit(&p, p.modules[0].id).await;
    let response = request_feedback(&p, submission_id).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = p
        .router()
        .oneshot(post(
            "/api/submissions",
            p.learner,
            serde_json::json!({
                "moduleId": p.modules[0].id,
                "enrollmentId": p.enrollment,
                "deliverableText": DELIVERABLE,
            }),
        ))
        .await
        .expect("submissions response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Ce module a déjà été évalué.");
}

#[tokio::test]
async fn test_daily_quota_enforced_over_http() {
    let p = platform(1, Arc::new(ScriptedEvaluator::always(report(70, "Bien")))).await;

    for _ in 0..5 {
        let response = p
            .router()
            .oneshot(post(
                "/api/submissions",
                p.learner,
                serde_json::json!({
                    "moduleId": p.modules[0].id,
                    "enrollmentId": p.enrollment,
                    "deliverableText": DELIVERABLE,
                }),
            ))
            .await
            .expect("submissions response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = p
        .router()
        .oneshot(post(
            "/api/submissions",
            p.learner,
            serde_json::json!({
                "moduleId": p.modules[0].id,
                "enrollmentId": p.enrollment,
                "deliverableText": DELIVERABLE,
            }),
        ))
        .await
        .expect("submissions response");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Tu as atteint la limite de 5 soumissions par jour. Réessaie demain !"
    );
}

#[tokio::test(start_paused = true)]
async fn test_stalled_evaluation_leaves_the_submission_pending() {
    struct StalledEvaluator;

    #[async_trait::async_trait]
    impl Evaluator for StalledEvaluator {
        async fn complete(&self, _system: &str, _user: &str) -> atelier_scoring::Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    let p = platform(1, Arc::new(StalledEvaluator)).await;
    let submission_id = submit(&p, p.modules[0].id).await;

    let response = request_feedback(&p, submission_id).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Erreur interne");

    // Nothing was written: the learner can retry.
    assert_eq!(p.store.feedback_count().await, 0);
    let submission = p
        .store
        .submission(submission_id)
        .await
        .expect("store")
        .expect("submission");
    assert_eq!(submission.status, SubmissionStatus::Pending);
    let enrollment = p
        .store
        .enrollment(p.enrollment)
        .await
        .expect("store")
        .expect("enrollment");
    assert_eq!(enrollment.status, EnrollmentStatus::InProgress);
}

#[tokio::test]
async fn test_retry_after_invalid_evaluation_succeeds() {
    let p = platform(
        1,
        Arc::new(ScriptedEvaluator::with_responses(vec![
            "Désolé, je ne peux pas produire de JSON.".to_string(),
            report(82, "Très bien"),
        ])),
    )
    .await;

    let submission_id = submit(&p, p.modules[0].id).await;

    let response = request_feedback(&p, submission_id).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(p.store.feedback_count().await, 0);

    // The submission stayed pending, so the same call can be replayed.
    let response = request_feedback(&p, submission_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(p.store.feedback_count().await, 1);
    assert_eq!(p.store.certificate_count().await, 1);
}
