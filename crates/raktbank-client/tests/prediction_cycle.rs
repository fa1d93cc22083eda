//! Integration tests for the prediction request/response cycle

mod support;

use std::time::Duration;

use axum::{http::StatusCode, routing::post, Json, Router};
use raktbank_client::{
    view, AppointmentDraft, DonorDraft, PredictionOutcome, PredictionRequest, PredictionResult,
    PredictionState, Session, PREDICTION_FAILED,
};
use serde_json::{json, Value};
use support::{json_response, recording_route, remote_for, serve, unreachable_remote};

fn fever_only() -> PredictionRequest {
    PredictionRequest::new("30", true, false, false).unwrap()
}

async fn session_answering(status: StatusCode, body: Value) -> Session {
    let app = Router::new().route(
        "/api/predict",
        post(move || {
            let body = body.clone();
            async move { json_response(status, body) }
        }),
    );
    Session::new(remote_for(serve(app).await))
}

#[tokio::test]
async fn test_dengue_round_trip() {
    let mut session =
        session_answering(StatusCode::OK, json!({"label": "Dengue", "confidence": 0.82})).await;

    let state = session.predict(fever_only()).await.clone();

    assert_eq!(
        state,
        PredictionState::Settled(PredictionOutcome::Success(PredictionResult {
            label: "Dengue".to_string(),
            confidence: 0.82,
        }))
    );
    assert_eq!(
        view::prediction_lines(&state),
        vec!["Prediction: Dengue", "Confidence: 82%"]
    );
}

#[tokio::test]
async fn test_request_body_is_sent_verbatim() {
    let (predict, recorded) = recording_route(StatusCode::OK);
    let mut session = Session::new(remote_for(serve(Router::new().route("/api/predict", predict)).await));

    // The recording route replies without a body, which is malformed
    let state = session.predict(fever_only()).await;
    assert_eq!(state.outcome().and_then(|o| o.error()), Some(PREDICTION_FAILED));

    assert_eq!(
        recorded.bodies(),
        vec![json!({"age": "30", "fever": true, "cough": false, "fatigue": false})]
    );
}

#[tokio::test]
async fn test_unreachable_service_fails_cycle() {
    let mut session = Session::new(unreachable_remote());

    let state = session.predict(fever_only()).await;

    assert_eq!(
        state,
        &PredictionState::Settled(PredictionOutcome::Failed {
            error: "Prediction failed (no server).".to_string()
        })
    );
}

#[tokio::test]
async fn test_non_success_status_fails_even_with_label() {
    let mut session =
        session_answering(StatusCode::BAD_GATEWAY, json!({"label": "Dengue", "confidence": 0.9})).await;

    let state = session.predict(fever_only()).await;
    assert_eq!(state.outcome().and_then(|o| o.error()), Some(PREDICTION_FAILED));
}

#[tokio::test]
async fn test_missing_confidence_defaults_to_zero() {
    let mut session = session_answering(StatusCode::OK, json!({"label": "Common cold"})).await;

    let state = session.predict(fever_only()).await;
    assert_eq!(
        view::prediction_lines(state),
        vec!["Prediction: Common cold", "Confidence: 0%"]
    );
}

#[tokio::test]
async fn test_collaborator_error_body_is_shown() {
    let mut session = session_answering(StatusCode::OK, json!({"error": "model not loaded"})).await;

    let state = session.predict(fever_only()).await;
    assert_eq!(view::prediction_lines(state), vec!["model not loaded"]);
}

#[tokio::test]
async fn test_new_cycle_replaces_previous_result() {
    let mut session = session_answering(StatusCode::OK, json!({"label": "Flu", "confidence": 0.4})).await;

    let first = session.predict(fever_only()).await.clone();
    assert!(first.outcome().is_some_and(PredictionOutcome::is_success));

    let pending = session.prediction_mut().begin(fever_only());
    assert!(session.prediction().state().is_pending());
    assert!(session.prediction().outcome().is_none());

    let outcome = session.remote().predict(&pending.request).await;
    assert!(session.prediction_mut().complete(pending.ticket, outcome));
    assert!(session.prediction().outcome().is_some());
}

#[tokio::test]
async fn test_overlapping_cycles_latest_wins() {
    // The first request (age 70) is slow, the second (age 20) is fast
    let app = Router::new().route(
        "/api/predict",
        post(|Json(request): Json<Value>| async move {
            if request["age"] == "70" {
                tokio::time::sleep(Duration::from_millis(150)).await;
                json_response(StatusCode::OK, json!({"label": "Slow", "confidence": 0.5}))
            } else {
                json_response(StatusCode::OK, json!({"label": "Fast", "confidence": 0.9}))
            }
        }),
    );
    let mut session = Session::new(remote_for(serve(app).await));
    let remote = session.remote().clone();

    let older = session
        .prediction_mut()
        .begin(PredictionRequest::new("70", false, true, true).unwrap());
    let newer = session
        .prediction_mut()
        .begin(PredictionRequest::new("20", true, false, false).unwrap());

    let slow = tokio::spawn({
        let remote = remote.clone();
        let request = older.request.clone();
        async move { remote.predict(&request).await }
    });
    let fast = remote.predict(&newer.request).await;

    // Apply in arrival order: the newer answer lands first
    assert!(session.prediction_mut().complete(newer.ticket, fast));
    let late = slow.await.expect("slow request task");
    assert!(!session.prediction_mut().complete(older.ticket, late));

    let lines = view::prediction_lines(session.prediction().state());
    assert_eq!(lines, vec!["Prediction: Fast", "Confidence: 90%"]);
}

#[tokio::test]
async fn test_session_usable_while_prediction_pending() {
    let (donors, recorded) = recording_route(StatusCode::CREATED);
    let app = Router::new().route("/api/donors", donors).route(
        "/api/predict",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            json_response(StatusCode::OK, json!({"label": "Dengue", "confidence": 0.82}))
        }),
    );
    let mut session = Session::new(remote_for(serve(app).await));

    let call = session.start_prediction(fever_only());
    let in_flight = tokio::spawn(call.send());

    let save = session.register_donor(DonorDraft::new("Asha", "O+")).unwrap();
    save.finished().await;
    assert_eq!(recorded.bodies().len(), 1);
    assert_eq!(session.store().donors().len(), 1);
    assert!(session.prediction().state().is_pending());
    assert_eq!(view::prediction_lines(session.prediction().state()), vec!["Predicting..."]);

    let reply = in_flight.await.expect("prediction call task");
    assert!(session.finish_prediction(reply));
    assert_eq!(
        view::prediction_lines(session.prediction().state()),
        vec!["Prediction: Dengue", "Confidence: 82%"]
    );
}

#[tokio::test]
async fn test_unanswered_prediction_only_leaves_workflow_pending() {
    let app = Router::new().route(
        "/api/predict",
        post(|| std::future::pending::<StatusCode>()),
    );
    let mut session = Session::new(remote_for(serve(app).await));

    let call = session.start_prediction(fever_only());
    let ticket = call.ticket();
    let in_flight = tokio::spawn(call.send());
    tokio::time::sleep(Duration::from_millis(50)).await;

    let _donor_save = session.register_donor(DonorDraft::new("Ravi", "B-")).unwrap();
    let _appointment_save = session
        .schedule_appointment(AppointmentDraft::new("Ravi", "2026-11-03"))
        .unwrap();
    assert_eq!(session.store().donors().len(), 1);
    assert_eq!(session.store().appointments().len(), 1);
    assert_eq!(session.prediction().state(), &PredictionState::Pending(ticket));

    in_flight.abort();
}
