//! Generation endpoint tests.
//!
//! Tests verify:
//! - Validation error bodies and status codes
//! - JSON, urlencoded and multipart request decoding
//! - One upstream call per requested image, results in call order
//! - Upstream failures surfacing as 500 with the provider message

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use image_relay::error::UpstreamError;
use image_relay::generate::Dispatcher;
use image_relay::server::{create_router, AppState, RouterConfig};
use image_relay::CredentialPool;

use super::test_utils::{
    body_json, form_post, json_post, pool_of, router_with, FixedRandom, MockFetcher, MockProvider,
};

const ENDPOINT: &str = "/v1/generate_images";

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_empty_keywords_rejected() {
    let provider = MockProvider::new();
    let router = router_with(provider.clone(), MockFetcher::new());

    let response = router
        .oneshot(json_post(ENDPOINT, json!({"keywords": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "No keywords provided"})
    );
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_missing_keywords_rejected() {
    let router = router_with(MockProvider::new(), MockFetcher::new());

    let response = router
        .oneshot(json_post(ENDPOINT, json!({"num_images": 2})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "No keywords provided"})
    );
}

#[tokio::test]
async fn test_blank_keywords_rejected() {
    let provider = MockProvider::new();
    let router = router_with(provider.clone(), MockFetcher::new());

    let response = router
        .oneshot(json_post(ENDPOINT, json!({"keywords": ["", "   "]})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_image_count_too_high_rejected() {
    let provider = MockProvider::new();
    let router = router_with(provider.clone(), MockFetcher::new());

    let response = router
        .oneshot(json_post(
            ENDPOINT,
            json!({"keywords": ["cat"], "num_images": 11}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Number of images must be between 1 and 10"})
    );
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_image_count_zero_rejected() {
    let router = router_with(MockProvider::new(), MockFetcher::new());

    let response = router
        .oneshot(json_post(
            ENDPOINT,
            json!({"keywords": ["cat"], "num_images": "0"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let router = router_with(MockProvider::new(), MockFetcher::new());

    let request = Request::builder()
        .method("POST")
        .uri(ENDPOINT)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_empty_body_reports_missing_keywords() {
    let router = router_with(MockProvider::new(), MockFetcher::new());

    let request = Request::builder()
        .method("POST")
        .uri(ENDPOINT)
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "No keywords provided"})
    );
}

#[tokio::test]
async fn test_null_body_reports_missing_keywords() {
    let provider = MockProvider::new();
    let router = router_with(provider.clone(), MockFetcher::new());

    let response = router
        .oneshot(json_post(ENDPOINT, serde_json::Value::Null))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "No keywords provided"})
    );
    assert_eq!(provider.call_count(), 0);
}

// =============================================================================
// Successful Dispatch
// =============================================================================

#[tokio::test]
async fn test_generate_three_images() {
    let provider = MockProvider::new();
    let router = router_with(provider.clone(), MockFetcher::new());

    let response = router
        .oneshot(json_post(
            ENDPOINT,
            json!({"keywords": ["  red ", "", "fox"], "size": "1792x1024", "num_images": 3}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"images": [
            "https://images.test/0.png",
            "https://images.test/1.png",
            "https://images.test/2.png"
        ]})
    );

    let calls = provider.calls();
    assert_eq!(calls.len(), 3);
    for (credential, call) in &calls {
        assert_eq!(credential, "sk-test-1");
        assert_eq!(call.prompt, "red fox");
        assert_eq!(call.size, "1792x1024");
        assert_eq!(call.n, 1);
    }
}

#[tokio::test]
async fn test_defaults_single_image() {
    let provider = MockProvider::new();
    let router = router_with(provider.clone(), MockFetcher::new());

    let response = router
        .oneshot(json_post(ENDPOINT, json!({"keywords": "a lighthouse at dusk"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["images"].as_array().unwrap().len(), 1);

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.size, "1024x1024");
    assert_eq!(calls[0].1.prompt, "a lighthouse at dusk");
}

#[tokio::test]
async fn test_form_encoded_request() {
    let provider = MockProvider::new();
    let router = router_with(provider.clone(), MockFetcher::new());

    let response = router
        .oneshot(form_post(
            ENDPOINT,
            "keywords=mountain+lake&size=512x512&num_images=2",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["images"].as_array().unwrap().len(), 2);

    let calls = provider.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1.prompt, "mountain lake");
    assert_eq!(calls[0].1.size, "512x512");
}

#[tokio::test]
async fn test_form_encoded_count_out_of_range() {
    let router = router_with(MockProvider::new(), MockFetcher::new());

    let response = router
        .oneshot(form_post(ENDPOINT, "keywords=cat&num_images=12"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Number of images must be between 1 and 10"})
    );
}

#[tokio::test]
async fn test_form_encoded_repeated_keywords() {
    let provider = MockProvider::new();
    let router = router_with(provider.clone(), MockFetcher::new());

    let response = router
        .oneshot(form_post(ENDPOINT, "keywords=red&keywords=fox"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.prompt, "red fox");
}

#[tokio::test]
async fn test_multipart_request() {
    let provider = MockProvider::new();
    let router = router_with(provider.clone(), MockFetcher::new());

    let boundary = "relay-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"keywords\"\r\n\r\n\
         cat\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"keywords\"\r\n\r\n\
         hat\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"num_images\"\r\n\r\n\
         2\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri(ENDPOINT)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["images"].as_array().unwrap().len(), 2);

    let calls = provider.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1.prompt, "cat hat");
    assert_eq!(calls[0].1.size, "1024x1024");
}

#[tokio::test]
async fn test_multipart_without_keywords_rejected() {
    let provider = MockProvider::new();
    let router = router_with(provider.clone(), MockFetcher::new());

    let body = "--b\r\n\
                Content-Disposition: form-data; name=\"size\"\r\n\r\n\
                512x512\r\n\
                --b--\r\n";
    let request = Request::builder()
        .method("POST")
        .uri(ENDPOINT)
        .header("content-type", "multipart/form-data; boundary=b")
        .body(Body::from(body))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "No keywords provided"})
    );
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_selected_credential_used_for_every_call() {
    let provider = MockProvider::new();
    let pool = CredentialPool::from_credentials(
        "OPENAI_API_KEY",
        ["sk-a", "sk-b", "sk-c"]
            .into_iter()
            .map(image_relay::Credential::new),
    )
    .unwrap()
    .with_random_source(Arc::new(FixedRandom(1)));

    let state = AppState::new(
        Dispatcher::new(Arc::new(pool), provider.clone()),
        MockFetcher::new(),
    );
    let router = create_router(state, RouterConfig::default().with_tracing(false));

    let response = router
        .oneshot(json_post(
            ENDPOINT,
            json!({"keywords": ["cat"], "num_images": 4}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let calls = provider.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|(credential, _)| credential == "sk-b"));
}

// =============================================================================
// Upstream Failures
// =============================================================================

#[tokio::test]
async fn test_upstream_failure_is_server_error() {
    let provider = MockProvider::failing(UpstreamError::Status {
        status: 400,
        message: "Your request was rejected as a result of our safety system.".to_string(),
    });
    let router = router_with(provider.clone(), MockFetcher::new());

    let response = router
        .oneshot(json_post(
            ENDPOINT,
            json!({"keywords": ["cat"], "num_images": 3}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("safety system"));
    assert!(body.get("images").is_none());
    // The first failure aborts the dispatch.
    assert_eq!(provider.call_count(), 1);
}

// =============================================================================
// Health and Index
// =============================================================================

#[tokio::test]
async fn test_health_reports_credentials() {
    let dispatcher = Dispatcher::new(pool_of(&["sk-1", "sk-2", "sk-1"]), MockProvider::new());
    let state = AppState::new(dispatcher, MockFetcher::new());
    let router = create_router(state, RouterConfig::default());

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["credentials"], 2);
}

#[tokio::test]
async fn test_index_page() {
    let router = router_with(MockProvider::new(), MockFetcher::new());

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));
}

#[tokio::test]
async fn test_generate_requires_post() {
    let router = router_with(MockProvider::new(), MockFetcher::new());

    let request = Request::builder()
        .uri(ENDPOINT)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
