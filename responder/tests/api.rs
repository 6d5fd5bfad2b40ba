use std::time::Duration;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use responder::{app, GREETING};
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn form_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(body.to_string())
        .unwrap()
}

#[tokio::test]
async fn post_form_gets_greeting() {
    let resp = app(Duration::ZERO)
        .oneshot(form_request("/", "token=testtoken"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, GREETING.as_bytes());
}

#[tokio::test]
async fn any_method_and_path_gets_greeting() {
    for method in ["GET", "PUT", "DELETE"] {
        let resp = app(Duration::ZERO)
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/some/where?x=1")
                    .body(String::new())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK, "{method}");
        assert_eq!(body_bytes(resp).await, GREETING.as_bytes());
    }
}

#[tokio::test]
async fn non_utf8_body_is_accepted() {
    let resp = app(Duration::ZERO)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(axum::body::Body::from(vec![0xff, 0xfe, 0x00]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn answers_only_after_delay() {
    let start = tokio::time::Instant::now();
    let resp = app(Duration::from_secs(10))
        .oneshot(form_request("/", "token=testtoken"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(start.elapsed() >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn caller_giving_up_early_gets_nothing() {
    let pending = app(Duration::from_secs(10)).oneshot(form_request("/", "token=testtoken"));
    let result = tokio::time::timeout(Duration::from_secs(5), pending).await;
    assert!(result.is_err(), "response arrived before the delay");
}
