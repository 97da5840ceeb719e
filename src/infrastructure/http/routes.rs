//! HTTP Routes
//!
//! API Endpoints:
//! - /                               GET   页面
//! - /api/ping                       GET   健康检查
//! - /api/models                     GET   可选模型列表（失败时返回备选）
//! - /api/session/create             POST  创建会话
//! - /api/session/close              POST  关闭会话
//! - /api/session/reset              POST  丢弃会话中的书
//! - /api/book/generate              POST  生成书籍（进度通过 WS 推送）
//! - /api/book/get                   POST  获取书籍、状态与统计
//! - /api/book/section/update        POST  编辑单个章节
//! - /api/book/export/{id}/{format}  GET   下载导出文件
//! - /ws/session/{id}                WS    生成进度事件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::index))
        .nest("/api", api_routes())
        .route("/ws/session/:session_id", get(handlers::websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/models", get(handlers::list_models))
        .nest("/session", session_routes())
        .nest("/book", book_routes())
}

/// Session 路由
fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_session))
        .route("/close", post(handlers::close_session))
        .route("/reset", post(handlers::reset_session))
}

/// Book 路由
fn book_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(handlers::generate_book))
        .route("/get", post(handlers::get_book))
        .route("/section/update", post(handlers::update_section))
        .route("/export/:session_id/:format", get(handlers::export_book))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use crate::application::{InferencePort, SessionManagerPort};
    use crate::domain::book::OutlineLimits;
    use crate::infrastructure::adapters::{DocumentExporter, FakeChatClient};
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemorySessionManager;

    const STRUCTURE: &str = r#"{"Opening": "How it starts", "Middle": {"Turn": "The twist"}}"#;

    fn app(client: FakeChatClient) -> Router {
        let inference: Arc<dyn InferencePort> = Arc::new(client);
        let sessions: Arc<dyn SessionManagerPort> = InMemorySessionManager::new().arc();
        let state = AppState::new(
            inference,
            sessions,
            Arc::new(DocumentExporter::new()),
            EventPublisher::new().arc(),
            OutlineLimits::default(),
            "llama3-70b-8192",
        );
        create_routes().with_state(Arc::new(state))
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Value {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let value = call(app, "POST", "/api/session/create", None).await;
        assert_eq!(value["errno"], 0);
        value["data"]["session_id"].as_str().unwrap().to_string()
    }

    fn generate_body(session_id: &str) -> Value {
        json!({
            "session_id": session_id,
            "topic": "lighthouses",
            "instructions": "",
            "title_model": "m",
            "structure_model": "m",
            "content_model": "m"
        })
    }

    #[tokio::test]
    async fn test_ping_and_page() {
        let app = app(FakeChatClient::new());
        let value = call(&app, "GET", "/api/ping", None).await;
        assert_eq!(value["status"], "ok");

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("<html"));
    }

    #[tokio::test]
    async fn test_models_fallback() {
        let app = app(FakeChatClient::new());
        let value = call(&app, "GET", "/api/models", None).await;
        assert_eq!(value["errno"], 0);
        assert_eq!(value["data"]["fallback"], true);
        assert_eq!(value["data"]["models"][0], "llama3-8b-8192");
        assert_eq!(value["data"]["default_model"], "llama3-70b-8192");
    }

    #[tokio::test]
    async fn test_generate_edit_export_flow() {
        let app = app(
            FakeChatClient::new()
                .with_response("Keepers of the Light")
                .with_response(STRUCTURE)
                .with_fallback("Generated prose."),
        );
        let session_id = create_session(&app).await;

        let value = call(&app, "POST", "/api/book/generate", Some(generate_body(&session_id))).await;
        assert_eq!(value["errno"], 0, "{}", value);
        assert_eq!(value["data"]["book"]["title"], "Keepers of the Light");
        assert_eq!(value["data"]["book"]["total_sections"], 2);
        assert_eq!(value["data"]["book"]["complete"], true);

        let value = call(
            &app,
            "POST",
            "/api/book/section/update",
            Some(json!({
                "session_id": session_id,
                "path": ["Middle", "Turn"],
                "content": "Edited by hand."
            })),
        )
        .await;
        assert_eq!(value["errno"], 0, "{}", value);

        let value = call(
            &app,
            "POST",
            "/api/book/get",
            Some(json!({ "session_id": session_id })),
        )
        .await;
        assert_eq!(value["data"]["status"], "ready");
        assert_eq!(value["data"]["book"]["sections"][2]["content"], "Edited by hand.");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/book/export/{}/md", session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"Keepers of the Light.md\""));
        let markdown = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(markdown.contains("### Turn\nEdited by hand.\n"));
    }

    #[tokio::test]
    async fn test_malformed_structure_reported_as_bad_request() {
        let app = app(
            FakeChatClient::new()
                .with_response("Title")
                .with_response("not json at all"),
        );
        let session_id = create_session(&app).await;

        let value = call(&app, "POST", "/api/book/generate", Some(generate_body(&session_id))).await;
        assert_eq!(value["errno"], 400);

        let value = call(
            &app,
            "POST",
            "/api/book/get",
            Some(json!({ "session_id": session_id })),
        )
        .await;
        assert_eq!(value["data"]["status"], "failed");
        assert!(value["data"].get("book").is_none());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/book/export/{}/pdf", session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let value: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(value["errno"], 400);
    }

    #[tokio::test]
    async fn test_inference_failure_reported_as_unavailable() {
        let app = app(FakeChatClient::new().with_failure("upstream down"));
        let session_id = create_session(&app).await;

        let value = call(&app, "POST", "/api/book/generate", Some(generate_body(&session_id))).await;
        assert_eq!(value["errno"], 503);
    }

    #[tokio::test]
    async fn test_unknown_session_and_format() {
        let app = app(FakeChatClient::new());
        let value = call(
            &app,
            "POST",
            "/api/book/get",
            Some(json!({ "session_id": "nope" })),
        )
        .await;
        assert_eq!(value["errno"], 404);

        let session_id = create_session(&app).await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/book/export/{}/rtf", session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let value: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(value["errno"], 400);

        let value = call(
            &app,
            "POST",
            "/api/session/close",
            Some(json!({ "session_id": session_id })),
        )
        .await;
        assert_eq!(value["errno"], 0);
    }
}
