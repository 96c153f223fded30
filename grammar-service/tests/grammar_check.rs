//! Router tests for the form and grammar check pages.
//!
//! The completion service is replaced by `MockCompletionProvider`, so these
//! tests run without network access.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use grammar_service::config::{CheckConfig, GrammarConfig, OpenAiConfig, ResponseFormat};
use grammar_service::services::providers::mock::MockCompletionProvider;
use grammar_service::services::providers::ProviderError;
use grammar_service::startup::{build_router, AppState};
use http_body_util::BodyExt;
use secrecy::Secret;
use std::sync::Arc;
use tower::util::ServiceExt;

const STRUCTURED_OK: &str =
    r#"{"grammar_score": 92, "changes": ["go -> goes"], "reasons": ["subject-verb agreement"]}"#;

fn test_config(format: ResponseFormat) -> GrammarConfig {
    GrammarConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        openai: OpenAiConfig {
            api_key: Secret::new("sk-test".to_string()),
            api_base: "http://localhost:0".to_string(),
        },
        check: CheckConfig {
            model: "gpt-test".to_string(),
            response_format: format,
            request_timeout_secs: 5,
        },
    }
}

fn app(provider: MockCompletionProvider, format: ResponseFormat) -> Router {
    build_router(AppState::new(Arc::new(provider), &test_config(format)))
}

fn check_request(form_body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/check")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form_body.to_string()))
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn landing_page_reflects_query_text() {
    let app = app(
        MockCompletionProvider::content("unused"),
        ResponseFormat::Structured,
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/?text_input=He%20go%20to%20school.")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(">He go to school.</textarea>"));
}

#[tokio::test]
async fn landing_page_reflects_posted_text() {
    let app = app(
        MockCompletionProvider::content("unused"),
        ResponseFormat::Structured,
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("text_input=He+go+to+school."))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(">He go to school.</textarea>"));
}

#[tokio::test]
async fn landing_page_without_text_is_empty() {
    let app = app(
        MockCompletionProvider::content("unused"),
        ResponseFormat::Structured,
    );

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("required></textarea>"));
}

#[tokio::test]
async fn landing_page_escapes_reflected_markup() {
    let app = app(
        MockCompletionProvider::content("unused"),
        ResponseFormat::Structured,
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/?text_input=%3Cscript%3Ealert(1)%3C%2Fscript%3E")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_string(response).await;
    assert!(!body.contains("<script>"));
    assert!(body.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn structured_result_is_rendered() {
    let provider = Arc::new(MockCompletionProvider::function_call(STRUCTURED_OK));
    let config = test_config(ResponseFormat::Structured);
    let app = build_router(AppState::new(provider.clone(), &config));

    let response = app
        .oneshot(check_request("text_input=He+go+to+school."))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(r#"<span class="score">92</span>"#));
    assert!(body.contains("<li>go -&gt; goes</li>"));
    assert!(body.contains("<li>subject-verb agreement</li>"));
    assert_eq!(body.matches("<li>").count(), 2);
    assert!(!body.contains(r#"class="error""#));

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages[0].content, "He go to school.");
}

#[tokio::test]
async fn structured_invalid_json_renders_error_view() {
    let app = app(
        MockCompletionProvider::function_call("{\"grammar_score\": 92, \"changes\": ["),
        ResponseFormat::Structured,
    );

    let response = app
        .oneshot(check_request("text_input=He+go+to+school."))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_string(response).await;
    assert!(body.contains("Oops! Something went wrong. Please try again."));
    assert!(!body.contains(r#"class="score""#));
    assert_eq!(body.matches("<li>").count(), 0);
    assert!(body.contains(">He go to school.</textarea>"));
}

#[tokio::test]
async fn free_text_result_is_rendered() {
    let app = app(
        MockCompletionProvider::content(
            "Score: 87.5\n\nChanges:\n- go -> goes\n\nReasons:\n- subject-verb agreement",
        ),
        ResponseFormat::FreeText,
    );

    let response = app
        .oneshot(check_request("text_input=He+go+to+school."))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(r#"<span class="score">87.5</span>"#));
    assert!(body.contains("<li>- go -&gt; goes</li>"));
    assert!(body.contains("<li>- subject-verb agreement</li>"));
}

#[tokio::test]
async fn free_text_without_sections_renders_error_view() {
    let app = app(
        MockCompletionProvider::content("Score: 87.5 Changes: go -> goes Reasons: agreement"),
        ResponseFormat::FreeText,
    );

    let response = app
        .oneshot(check_request("text_input=He+go+to+school."))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_string(response).await;
    assert!(body.contains(r#"class="error""#));
    assert!(!body.contains(r#"class="score""#));
}

#[tokio::test]
async fn upstream_failure_renders_error_view() {
    let app = app(
        MockCompletionProvider::failing(ProviderError::NetworkError(
            "connection refused".to_string(),
        )),
        ResponseFormat::Structured,
    );

    let response = app
        .oneshot(check_request("text_input=He+go+to+school."))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_string(response).await;
    assert!(body.contains("We could not reach the grammar checker."));
    assert!(!body.contains("connection refused"));
}

#[tokio::test]
async fn upstream_timeout_renders_gateway_timeout() {
    let app = app(
        MockCompletionProvider::failing(ProviderError::Timeout),
        ResponseFormat::Structured,
    );

    let response = app
        .oneshot(check_request("text_input=He+go+to+school."))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = body_string(response).await;
    assert!(body.contains("took too long"));
}

#[tokio::test]
async fn check_without_text_is_rejected() {
    let provider = Arc::new(MockCompletionProvider::function_call(STRUCTURED_OK));
    let config = test_config(ResponseFormat::Structured);
    let app = build_router(AppState::new(provider.clone(), &config));

    let response = app.oneshot(check_request("")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = app(
        MockCompletionProvider::function_call(STRUCTURED_OK),
        ResponseFormat::Structured,
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("x-request-id", "test-request-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-request-id"], "test-request-1");
    assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
}

#[tokio::test]
async fn health_and_readiness() {
    let app = app(
        MockCompletionProvider::content("unused"),
        ResponseFormat::Structured,
    );

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "grammar-service");

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn readiness_fails_without_provider() {
    let app = app(MockCompletionProvider::disabled(), ResponseFormat::Structured);

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
