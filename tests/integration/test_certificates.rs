//! Integration tests for the certificates endpoint.
//!
//! The endpoint is internal (no learner identity required) and must be
//! idempotent per enrollment.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, Response, StatusCode},
};
use tower::util::ServiceExt;
use uuid::Uuid;

use atelier_orchestrator::{create_router, AppState, Config};
use atelier_scoring::ScriptedEvaluator;
use atelier_store::{MemoryStore, Store};

fn app() -> (Arc<MemoryStore>, AppState) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        Config::default(),
        store.clone(),
        Arc::new(ScriptedEvaluator::always("{}")),
    );
    (store, state)
}

fn issue_request(enrollment: Uuid, learner: Uuid, simulation: Uuid, score: u8) -> Request<Body> {
    let body = serde_json::json!({
        "enrollmentId": enrollment,
        "learnerId": learner,
        "simulationId": simulation,
        "finalScore": score,
    });
    Request::builder()
        .method(Method::POST)
        .uri("/api/certificates")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn test_issuance_records_score_mention_and_number() {
    let (store, state) = app();
    let enrollment = Uuid::new_v4();
    let learner = Uuid::new_v4();
    let simulation = Uuid::new_v4();

    let response = create_router(state)
        .oneshot(issue_request(enrollment, learner, simulation, 82))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let certificate = store
        .certificate_for_enrollment(enrollment)
        .await
        .expect("store")
        .expect("certificate");
    assert_eq!(certificate.learner_id, learner);
    assert_eq!(certificate.simulation_id, simulation);
    assert_eq!(certificate.final_score, 82);
    // The mention is derived from the score.
    assert_eq!(certificate.mention.label(), "Très bien");

    // Number shape: PREFIX-YEAR-XXXXXX.
    let parts: Vec<&str> = certificate.number.splitn(3, '-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "ATELIER");
    assert_eq!(parts[1].len(), 4);
    assert_eq!(parts[2].len(), 6);
    assert!(parts[2]
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[tokio::test]
async fn test_reissuing_returns_the_same_certificate() {
    let (store, state) = app();
    let enrollment = Uuid::new_v4();
    let learner = Uuid::new_v4();
    let simulation = Uuid::new_v4();

    let first = create_router(state.clone())
        .oneshot(issue_request(enrollment, learner, simulation, 91))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::OK);
    let first_body = body_json(first).await;

    let second = create_router(state)
        .oneshot(issue_request(enrollment, learner, simulation, 91))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::OK);
    let second_body = body_json(second).await;

    assert_eq!(first_body["certificateId"], second_body["certificateId"]);
    assert_eq!(store.certificate_count().await, 1);
}

#[tokio::test]
async fn test_distinct_enrollments_get_distinct_numbers() {
    let (store, state) = app();
    let learner = Uuid::new_v4();
    let simulation = Uuid::new_v4();
    let first_enrollment = Uuid::new_v4();
    let second_enrollment = Uuid::new_v4();

    for enrollment in [first_enrollment, second_enrollment] {
        let response = create_router(state.clone())
            .oneshot(issue_request(enrollment, learner, simulation, 55))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let first = store
        .certificate_for_enrollment(first_enrollment)
        .await
        .expect("store")
        .expect("certificate");
    let second = store
        .certificate_for_enrollment(second_enrollment)
        .await
        .expect("store")
        .expect("certificate");
    assert_ne!(first.number, second.number);
    assert_eq!(first.mention.label(), "Satisfaisant");
}

#[tokio::test]
async fn test_missing_final_score_is_a_bad_request() {
    let (_store, state) = app();

    let body = serde_json::json!({
        "enrollmentId": Uuid::new_v4(),
        "learnerId": Uuid::new_v4(),
        "simulationId": Uuid::new_v4(),
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/certificates")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");

    let response = create_router(state).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .expect("error message")
        .starts_with("Paramètres manquants"));
}
