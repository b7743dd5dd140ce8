//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - quiz API under `/api/v1/...`
/// - Static quiz page from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/questions", get(http::http_get_questions))
        .route("/api/v1/quiz", post(http::http_start_quiz))
        .route(
            "/api/v1/quiz/:quiz_id",
            get(http::http_get_quiz).delete(http::http_delete_quiz),
        )
        .route("/api/v1/quiz/:quiz_id/answer", post(http::http_post_answer))
        .route("/api/v1/quiz/:quiz_id/next", post(http::http_post_next))
        .route("/api/v1/quiz/:quiz_id/previous", post(http::http_post_previous))
        .route("/api/v1/quiz/:quiz_id/restart", post(http::http_post_restart))
        .route("/api/v1/quiz/:quiz_id/details/:index", post(http::http_post_details))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(Arc::new(AppState::with_parts(Catalog::builtin(), None)))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_catalog_size() {
        let (status, body) = call(&app(), Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true, "questions": 10, "recommender": false, "open_quizzes": 0}));
    }

    #[tokio::test]
    async fn questions_are_listed_in_order() {
        let (_, body) = call(&app(), Method::GET, "/api/v1/questions", None).await;
        let ids: Vec<u64> = body["questions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, (1..=10).collect::<Vec<u64>>());
        assert_eq!(body["questions"][0]["interaction"], "single_select");
    }

    #[tokio::test]
    async fn quiz_lifecycle_over_http() {
        let app = app();
        let (status, started) = call(&app, Method::POST, "/api/v1/quiz", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = started["quiz_id"].as_str().unwrap().to_string();
        assert_eq!(started["question"]["can_go_next"], false);

        let (_, view) = call(
            &app,
            Method::POST,
            &format!("/api/v1/quiz/{id}/answer"),
            Some(json!({"action": "select", "value": "Oily"})),
        )
        .await;
        assert_eq!(view["question"]["can_go_next"], true);

        let (_, view) = call(&app, Method::POST, &format!("/api/v1/quiz/{id}/next"), None).await;
        assert_eq!(view["question"]["index"], 1);
        assert_eq!(view["question"]["can_go_previous"], true);

        let (_, view) = call(&app, Method::POST, &format!("/api/v1/quiz/{id}/previous"), None).await;
        assert_eq!(view["question"]["index"], 0);
        assert_eq!(view["answers"]["1"], "oily");

        let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/quiz/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(&app, Method::GET, &format!("/api/v1/quiz/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], format!("Unknown quizId: {id}"));
    }
}
