//! Integration tests for web routes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use reddit_thread_fetcher::config::Config;
use reddit_thread_fetcher::reddit::{
    FetchError, NormalizedComment, NormalizedPost, PostContent, ThreadFetcher, ThreadResult,
};
use reddit_thread_fetcher::web::{create_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Succeeds for any URL with a `/comments/` segment.
struct StubFetcher;

#[async_trait]
impl ThreadFetcher for StubFetcher {
    async fn fetch_thread(&self, url: &str) -> Result<ThreadResult, FetchError> {
        if !url.contains("/comments/") {
            return Err(FetchError::MissingThreadId(url.to_string()));
        }
        Ok(ThreadResult {
            source_url: url.to_string(),
            post: NormalizedPost {
                id: "abc".to_string(),
                title: "Title".to_string(),
                subreddit: "rust".to_string(),
                author: Some("op".to_string()),
                url: "https://www.reddit.com/r/rust/comments/abc/title/".to_string(),
                score: 1,
                created_utc: Some(1_700_000_000.0),
                num_comments: 1,
                permalink: "/r/rust/comments/abc/title/".to_string(),
                content: PostContent::Link {
                    url: Some("https://example.com".to_string()),
                },
                flair_text: None,
                media: None,
            },
            comments: vec![NormalizedComment {
                id: "c1".to_string(),
                author: None,
                body: "hi".to_string(),
                score: 0,
                created_utc: 1_700_000_100.0,
                parent_id: "t3_abc".to_string(),
                depth: 0,
            }],
        })
    }
}

/// Create a test app, optionally gated by `passkey`.
fn create_test_app(passkey: Option<&str>) -> Router {
    let config = Config {
        site_passkey: passkey.map(String::from),
        ..Config::for_testing()
    };

    create_app(AppState {
        config: Arc::new(config),
        fetcher: Arc::new(StubFetcher),
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app(Some("s3cret"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_fetch_returns_results_and_errors() {
    let app = create_test_app(None);
    let body = json!({
        "urls": [
            "https://www.reddit.com/r/rust/comments/abc/title/",
            "  https://www.reddit.com/r/rust/  ",
            ""
        ]
    });

    let response = app.oneshot(post_json("/api/reddit", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
    assert_eq!(
        json["results"][0]["sourceUrl"],
        "https://www.reddit.com/r/rust/comments/abc/title/"
    );
    assert_eq!(json["results"][0]["post"]["content"]["type"], "link");
    assert_eq!(json["results"][0]["comments"][0]["depth"], 0);

    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["url"], "https://www.reddit.com/r/rust/");
    assert!(errors[0]["error"].as_str().unwrap().contains("no thread id"));
}

#[tokio::test]
async fn test_empty_urls_is_bad_request() {
    for body in [json!({ "urls": [] }), json!({ "urls": ["  ", ""] }), json!({})] {
        let app = create_test_app(None);
        let response = app.oneshot(post_json("/api/reddit", &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().contains("at least one URL"));
    }
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = create_test_app(None);
    let request = Request::builder()
        .method("POST")
        .uri("/api/reddit")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_passkey_required_when_configured() {
    let app = create_test_app(Some("s3cret"));
    let body = json!({ "urls": ["https://www.reddit.com/r/rust/comments/abc/"] });

    let response = app.oneshot(post_json("/api/reddit", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Unauthorized");
}

#[tokio::test]
async fn test_wrong_passkey_rejected_before_body_validation() {
    let app = create_test_app(Some("s3cret"));
    let mut request = post_json("/api/reddit", &json!({ "urls": [] }));
    request
        .headers_mut()
        .insert("x-passkey", "wrong".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_passkey_accepted_from_header_query_and_cookie() {
    let body = json!({ "urls": ["https://www.reddit.com/r/rust/comments/abc/"] });

    let mut via_header = post_json("/api/reddit", &body);
    via_header
        .headers_mut()
        .insert("x-passkey", "s3cret".parse().unwrap());

    let via_query = post_json("/api/reddit?key=s3cret", &body);

    let mut via_cookie = post_json("/api/reddit", &body);
    via_cookie
        .headers_mut()
        .insert("cookie", "site_passkey=s3cret".parse().unwrap());

    for request in [via_header, via_query, via_cookie] {
        let app = create_test_app(Some("s3cret"));
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_query_passkey_is_remembered_in_cookie() {
    let body = json!({ "urls": ["https://www.reddit.com/r/rust/comments/abc/"] });

    let app = create_test_app(Some("s3cret"));
    let response = app
        .oneshot(post_json("/api/reddit?key=s3cret", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("site_passkey=s3cret;"), "{cookie}");
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=604800"));

    let mut via_header = post_json("/api/reddit", &body);
    via_header
        .headers_mut()
        .insert("x-passkey", "s3cret".parse().unwrap());
    let app = create_test_app(Some("s3cret"));
    let response = app.oneshot(via_header).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app(None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
