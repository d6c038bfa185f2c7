use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use matchday_back::{
    config::AppConfig,
    dao::record_store::memory::MemoryStore,
    routes,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN_TOKEN: &str = "letmein";

fn app() -> Router {
    let config = AppConfig {
        admin_token: Some(ADMIN_TOKEN.into()),
        ..AppConfig::default()
    };
    routes::router(AppState::with_store(config, Arc::new(MemoryStore::new())))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    caller: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        request = request.header("x-user-id", caller);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, captain: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/teams",
        Some(captain),
        Some(json!({ "name": name, "sport": "soccer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn healthcheck_reports_ok_with_a_store() {
    let (status, body) = send(&app(), "GET", "/healthcheck", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn degraded_service_answers_503() {
    let app = routes::router(AppState::new(AppConfig::default()));
    let (status, body) = send(&app, "GET", "/healthcheck", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");

    let (status, body) = send(
        &app,
        "POST",
        "/teams",
        Some("alice"),
        Some(json!({ "name": "Home", "sport": "soccer" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "unavailable");
}

#[tokio::test]
async fn mutations_require_a_caller() {
    let (status, body) = send(
        &app(),
        "POST",
        "/teams",
        None,
        Some(json!({ "name": "Home", "sport": "soccer" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthenticated");
}

#[tokio::test]
async fn invalid_payloads_are_bad_requests() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/teams",
        Some("alice"),
        Some(json!({ "name": "Home", "sport": "Soccer League!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_argument");
    assert!(body["message"].as_str().is_some_and(|m| m.contains("sport")));

    let home = register(&app, "alice", "Home").await;
    let away = register(&app, "bob", "Away").await;
    let (status, body) = send(
        &app,
        "POST",
        "/matches",
        Some("alice"),
        Some(json!({ "homeTeamId": home, "awayTeamId": away })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_argument");

    let (status, body) = send(
        &app,
        "POST",
        "/matches",
        Some("alice"),
        Some(json!({ "homeTeamId": home, "awayTeamId": "not-a-uuid", "sport": "soccer" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_argument");

    let (status, body) = send(&app, "POST", "/teams", Some("alice"), Some(json!("{"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_argument");

    let (status, body) = send(&app, "GET", "/matches/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_argument");
}

#[tokio::test]
async fn full_match_over_http() {
    let app = app();
    let home = register(&app, "alice", "Home").await;
    let away = register(&app, "bob", "Away").await;

    let (status, proposed) = send(
        &app,
        "POST",
        "/matches",
        Some("alice"),
        Some(json!({ "homeTeamId": home, "awayTeamId": away, "sport": "soccer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(proposed["status"], "proposed");
    let id = proposed["id"].as_str().unwrap().to_owned();

    let (status, body) = send(&app, "POST", &format!("/matches/{id}/accept"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(&app, "POST", &format!("/matches/{id}/accept"), Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "scheduled");

    let (_, body) = send(
        &app,
        "POST",
        &format!("/matches/{id}/scores"),
        Some("alice"),
        Some(json!({ "teamId": home, "ourScore": 2, "theirScore": 1 })),
    )
    .await;
    assert_eq!(body["status"], "homeSubmitted");
    assert_eq!(body["homeScore"], 2);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/matches/{id}/scores"),
        Some("bob"),
        Some(json!({ "teamId": away, "ourScore": 1, "theirScore": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["awayScore"], 1);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/matches/{id}/scores"),
        Some("bob"),
        Some(json!({ "teamId": away, "ourScore": 5, "theirScore": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_state");

    let (_, team) = send(&app, "GET", &format!("/teams/{home}"), None, None).await;
    assert_eq!(team["rating"]["tp"], 7);
    assert_eq!(team["rating"]["winStreak"], 1);

    let (_, player) = send(&app, "GET", "/players/bob", None, None).await;
    assert_eq!(player["ratings"]["soccer"]["points"], 3);
    assert_eq!(player["ratings"]["soccer"]["tier"], "B");

    let (_, listed) = send(&app, "GET", &format!("/teams/{away}/matches"), None, None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn unknown_resources_are_not_found() {
    let app = app();
    let (status, body) = send(
        &app,
        "GET",
        "/matches/6f1c2b1e-4c53-4d2a-9a57-0c1d5e0f6a11",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = send(&app, "GET", "/players/nobody", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn season_reset_needs_the_admin_token() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/admin/season/reset",
        None,
        Some(json!({ "label": "2026" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/admin/season/reset")
        .header("x-admin-token", ADMIN_TOKEN)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "label": "2026" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["label"], "2026");
    assert_eq!(body["playersReset"], 0);
}

#[tokio::test]
async fn outcome_stream_is_server_sent_events() {
    let request = Request::builder()
        .uri("/sse/outcomes")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));
}
