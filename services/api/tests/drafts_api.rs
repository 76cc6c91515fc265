//! Router-level tests against the in-memory repository and a stub generator.

use api_lib::{
    adapters::InMemoryRepository,
    config::Config,
    web::{self, rest::ApiDoc, AppState},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use ignite_core::{
    document::{Document, Section},
    domain::SalesPageRequest,
    ports::{PortError, PortResult, SalesPageGenerationService},
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use utoipa::OpenApi;
use uuid::Uuid;

#[derive(Default)]
struct StubGenerator {
    fail: AtomicBool,
    calls: AtomicUsize,
    last_inputs: Mutex<Option<Value>>,
}

#[async_trait]
impl SalesPageGenerationService for StubGenerator {
    async fn generate_sales_page(&self, request: &SalesPageRequest) -> PortResult<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("upstream returned 500".to_string()));
        }
        *self.last_inputs.lock().unwrap() = Some(request.sales_page_inputs.clone());
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let page = Document::skeleton()
            .replace_section(Section::Headline, &format!("<h1>Version {n}</h1>"))
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(page.into_inner())
    }
}

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: None,
        log_level: tracing::Level::INFO,
        openai_api_key: None,
        generation_model: "test-model".to_string(),
        autosave_delay: Duration::from_millis(800),
        cors_origin: "http://localhost:3000".to_string(),
    }
}

fn app_with(generator: Arc<StubGenerator>) -> Router {
    let state = AppState::new(
        &test_config(),
        Arc::new(InMemoryRepository::new()),
        generator,
    );
    web::router(Arc::new(state))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

#[tokio::test]
async fn requests_without_user_header_are_rejected() {
    let app = app_with(Arc::new(StubGenerator::default()));
    let (status, _) = send(&app, Method::GET, "/offers/1/drafts", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/offers/1/drafts")
                .header("x-user-id", "not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generating_twice_appends_without_switching() {
    let app = app_with(Arc::new(StubGenerator::default()));
    let user = Some(Uuid::new_v4());

    let (status, first) = send(
        &app,
        Method::POST,
        "/offers/1/generate",
        user,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["name"], "Offer 1 - Draft 1");

    let (status, second) = send(
        &app,
        Method::POST,
        "/offers/1/generate",
        user,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["name"], "Offer 1 - Draft 2");

    let (_, collection) = send(&app, Method::GET, "/offers/1/drafts", user, None).await;
    assert_eq!(collection["drafts"].as_array().unwrap().len(), 2);
    assert_eq!(collection["currentDraftId"], first["id"]);

    let (status, switched) = send(
        &app,
        Method::PUT,
        "/offers/1/drafts/active",
        user,
        Some(json!({ "draftId": second["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(switched["currentDraftId"], second["id"]);

    let (_, active) = send(&app, Method::GET, "/offers/1/drafts/active", user, None).await;
    assert!(active["content"].as_str().unwrap().contains("<h1>Version 2</h1>"));
}

#[tokio::test]
async fn failed_generation_returns_bad_gateway_and_stores_nothing() {
    let generator = Arc::new(StubGenerator::default());
    generator.fail.store(true, Ordering::SeqCst);
    let app = app_with(generator);
    let user = Some(Uuid::new_v4());

    let (status, _) = send(&app, Method::POST, "/offers/2/generate", user, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, collection) = send(&app, Method::GET, "/offers/2/drafts", user, None).await;
    assert!(collection["drafts"].as_array().unwrap().is_empty());
    assert!(collection["currentDraftId"].is_null());
}

#[tokio::test]
async fn section_edits_require_existing_markers() {
    let app = app_with(Arc::new(StubGenerator::default()));
    let user = Some(Uuid::new_v4());
    let (_, draft) = send(
        &app,
        Method::POST,
        "/offers/1/drafts",
        user,
        Some(json!({ "content": "<!-- HEADLINE_START -->Old<!-- HEADLINE_END -->" })),
    )
    .await;
    let id = draft["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/offers/1/drafts/{id}/sections/headline"),
        user,
        Some(json!({ "content": "  New headline  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        Document::new(updated["content"].as_str().unwrap()).section(Section::Headline),
        "New headline"
    );

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/offers/1/drafts/{id}/sections/pricing"),
        user,
        Some(json!({ "content": "$497" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/offers/1/drafts/{id}/sections/footer"),
        user,
        Some(json!({ "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/offers/1/drafts/{id}/sections/headline"),
        user,
        Some(json!({ "content": "a <!-- HEADLINE_END --> b" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, sections) = send(
        &app,
        Method::GET,
        &format!("/offers/1/drafts/{id}/sections"),
        user,
        None,
    )
    .await;
    let sections = sections["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 8);
    assert_eq!(sections[0]["key"], "headline");
    assert_eq!(sections[0]["content"], "New headline");
    assert!(sections[0]["missing"].as_array().unwrap().is_empty());
    assert_eq!(sections[5]["missing"][0]["priority"], "high");
}

#[tokio::test]
async fn blank_rename_falls_back_and_deleting_last_draft_clears_active() {
    let app = app_with(Arc::new(StubGenerator::default()));
    let user = Some(Uuid::new_v4());
    let (_, draft) = send(
        &app,
        Method::POST,
        "/offers/3/drafts",
        user,
        Some(json!({ "content": "<p>page</p>" })),
    )
    .await;
    let id = draft["id"].as_str().unwrap();

    let (status, renamed) = send(
        &app,
        Method::PATCH,
        &format!("/offers/3/drafts/{id}"),
        user,
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Draft 1");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/offers/3/drafts/{id}"),
        user,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, collection) = send(&app, Method::GET, "/offers/3/drafts", user, None).await;
    assert!(collection["drafts"].as_array().unwrap().is_empty());
    assert!(collection["currentDraftId"].is_null());

    let (status, _) = send(&app, Method::GET, "/offers/3/drafts/active", user, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exports_word_document_with_docx_name() {
    let app = app_with(Arc::new(StubGenerator::default()));
    let user = Uuid::new_v4();
    let (_, draft) = send(
        &app,
        Method::POST,
        "/offers/1/generate",
        Some(user),
        Some(json!({})),
    )
    .await;
    let id = draft["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/offers/1/drafts/{id}/export/docx"))
                .header("x-user-id", user.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"offer-1-draft-1.docx\""
    );
    assert!(response.headers().get("x-google-docs-url").is_none());

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/offers/1/drafts/{id}/export/pdf"),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn text_export_points_at_google_docs() {
    let app = app_with(Arc::new(StubGenerator::default()));
    let user = Uuid::new_v4();
    let (_, draft) = send(
        &app,
        Method::POST,
        "/offers/2/generate",
        Some(user),
        Some(json!({})),
    )
    .await;
    let id = draft["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/offers/2/drafts/{id}/export/text"))
                .header("x-user-id", user.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"offer-2-draft-1.txt\""
    );
    assert_eq!(
        response.headers()["x-google-docs-url"],
        ignite_core::export::GOOGLE_DOCS_CREATE_URL
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("Version 1"));
    assert!(!text.contains("<!--"));
}

#[test]
fn openapi_describes_the_inputs_body() {
    let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
    let put = &doc["paths"]["/offers/{offer}/inputs"]["put"];
    assert!(put["requestBody"]["content"]["application/json"].is_object());
}

#[tokio::test]
async fn queued_inputs_are_flushed_on_read_and_used_for_generation() {
    let generator = Arc::new(StubGenerator::default());
    let app = app_with(generator.clone());
    let user = Some(Uuid::new_v4());

    let (status, _) = send(
        &app,
        Method::PUT,
        "/offers/1/inputs",
        user,
        Some(json!({ "price": "497" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, inputs) = send(&app, Method::GET, "/offers/1/inputs", user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inputs, json!({ "price": "497" }));

    send(
        &app,
        Method::PUT,
        "/offers/1/inputs",
        user,
        Some(json!({ "price": "997" })),
    )
    .await;
    let (status, _) = send(&app, Method::POST, "/offers/1/generate", user, Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        generator.last_inputs.lock().unwrap().clone(),
        Some(json!({ "price": "997" }))
    );

    let (status, _) = send(&app, Method::PUT, "/offers/1/inputs", user, Some(json!([1]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn completeness_scores_follow_the_heuristic() {
    let app = app_with(Arc::new(StubGenerator::default()));
    let user = Some(Uuid::new_v4());

    let (_, empty) = send(
        &app,
        Method::POST,
        "/completeness",
        user,
        Some(json!({ "messagingStrategy": {}, "offerOutline": {} })),
    )
    .await;
    assert_eq!(empty["score"], 60);

    let rich = json!({
        "messagingStrategy": { "customerAvatar": "a", "b": "b", "c": "c", "d": "d" },
        "offerOutline": { "transformation": "t", "x": "x", "y": "y", "z": "z" }
    });
    let (_, full) = send(&app, Method::POST, "/completeness", user, Some(rich.clone())).await;
    assert_eq!(full["score"], 100);

    let mut scoped = rich;
    scoped["offerNumber"] = json!(9);
    let (_, none) = send(&app, Method::POST, "/completeness", user, Some(scoped)).await;
    assert_eq!(none["score"], 0);
}
