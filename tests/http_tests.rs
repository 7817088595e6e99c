// Tests for the HTTP event/status adapter

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use lift_replays::{create_router, AppState, LiftType, Phase, StatusBoard, StatusSink, TimingEvent};
use tokio::sync::mpsc;
use tower::ServiceExt;

fn post_event(json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/events")
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let (tx, _rx) = mpsc::channel(1);
    let app = create_router(AppState::new(tx, StatusBoard::new()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&body[..], b"OK");

    Ok(())
}

#[tokio::test]
async fn test_post_event_is_queued() -> Result<()> {
    let (tx, mut rx) = mpsc::channel(4);
    let app = create_router(AppState::new(tx, StatusBoard::new()));

    let response = app
        .oneshot(post_event(
            r#"{"type":"AttemptStart","athlete":"Jane Doe","lift_type":"SNATCH","attempt_number":1,"start_time_ms":1000}"#,
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(
        rx.recv().await,
        Some(TimingEvent::AttemptStart {
            athlete: "Jane Doe".to_string(),
            lift_type: LiftType::Snatch,
            attempt_number: 1,
            start_time_ms: 1000,
        })
    );

    Ok(())
}

#[tokio::test]
async fn test_post_event_without_recorder() -> Result<()> {
    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    let app = create_router(AppState::new(tx, StatusBoard::new()));

    let response = app
        .oneshot(post_event(r#"{"type":"DecisionGiven","stop_time_ms":9000}"#))
        .await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    Ok(())
}

#[tokio::test]
async fn test_malformed_event_is_rejected() -> Result<()> {
    let (tx, _rx) = mpsc::channel(1);
    let app = create_router(AppState::new(tx, StatusBoard::new()));

    let response = app.oneshot(post_event(r#"{"type":"Unknown"}"#)).await?;

    assert!(response.status().is_client_error());

    Ok(())
}

#[tokio::test]
async fn test_status_reports_latest_update() -> Result<()> {
    let (tx, _rx) = mpsc::channel(1);
    let status = StatusBoard::new();
    let app = create_router(AppState::new(tx, status.clone()));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/status").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    status.send_status(Phase::Ready, "Videos ready");

    let response = app
        .oneshot(Request::builder().uri("/status").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let json: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(json["phase"], "ready");
    assert_eq!(json["message"], "Videos ready");

    Ok(())
}
