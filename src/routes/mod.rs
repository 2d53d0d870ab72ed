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
/// - WebSocket at `/ws` (one exercise session per connection)
/// - REST-ish API under `/api/v1/...` for stateless use of the content core
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/catalog", get(http::http_get_catalog))
        .route("/api/v1/topics", post(http::http_post_topics))
        .route("/api/v1/exercise", post(http::http_post_exercise))
        .route("/api/v1/translate", post(http::http_post_translate))
        .route("/api/v1/share", post(http::http_post_share))
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
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Prompts;
    use crate::content::ContentService;
    use crate::error::ContentError;
    use crate::testing::{exercise_json, football_exercise, ScriptedBackend};

    fn app_with(backend: Option<Arc<ScriptedBackend>>) -> Router {
        let content = backend.map(|b| ContentService::new(b, Prompts::default()));
        build_router(Arc::new(AppState::with_content(content)))
    }

    async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn health_reports_generation_disabled_without_key() {
        let (status, body) = call(app_with(None), "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "generationEnabled": false }));
    }

    #[tokio::test]
    async fn generation_endpoints_need_a_key() {
        let req = json!({ "language": "French", "level": "B1" });
        let (status, body) = call(app_with(None), "POST", "/api/v1/exercise", Some(req)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["message"].as_str().unwrap().contains("OPENAI_API_KEY"));

        let (status, _) = call(app_with(None), "POST", "/api/v1/topics", Some(json!({}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn exercise_endpoint_returns_segments() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_ok(&exercise_json("I {{1}} the ball and {{2}} home."));
        let req = json!({ "topic": "Football", "language": "Standard Arabic", "level": "A2", "temperature": 0.9 });
        let (status, body) = call(app_with(Some(backend)), "POST", "/api/v1/exercise", Some(req)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["direction"], "rtl");
        assert_eq!(body["englishTranslation"], "I kicked off the ball and headed home.");
        assert_eq!(body["segments"][1], json!({ "kind": "blank_ref", "value": 1 }));
        assert_eq!(body["blanks"][0]["correctAnswer"], "kicked off");
    }

    #[tokio::test]
    async fn exercise_failure_is_generic_bad_gateway() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_err(ContentError::Transport("HTTP 429: rate limited".into()));
        let req = json!({ "language": "French" });
        let (status, body) = call(app_with(Some(backend)), "POST", "/api/v1/exercise", Some(req)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["message"], crate::session::GENERATION_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn topics_and_translate_fail_soft() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_err(ContentError::Transport("down".into()));
        backend.push_err(ContentError::Transport("down".into()));
        let app = app_with(Some(backend));

        let (status, body) = call(app.clone(), "POST", "/api/v1/topics", Some(json!({ "temperature": 1.0 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "topics": [] }));

        let req = json!({ "text": "Bonjour", "targetLanguage": "English" });
        let (status, body) = call(app, "POST", "/api/v1/translate", Some(req)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "translation": "" }));
    }

    #[tokio::test]
    async fn share_endpoint_scores_and_links() {
        let req = json!({
            "exercise": football_exercise(),
            "answers": { "1": "kicked off", "2": "went" },
            "level": "C1",
            "language": "English"
        });
        let (status, body) = call(app_with(None), "POST", "/api/v1/share", Some(req)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 1);
        assert_eq!(body["total"], 2);
        assert_eq!(body["subject"], "English Lexical Challenge Result: 1/2");
        assert!(body["body"].as_str().unwrap().contains("I [kicked off] the ball and [went] home."));
        assert!(body["url"].as_str().unwrap().contains("&body=My%20Lexical%20Gap"));
    }

    #[tokio::test]
    async fn catalog_is_public() {
        let (status, body) = call(app_with(None), "GET", "/api/v1/catalog", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["topics"][0], "Technology & AI");
    }
}
