//! Driving a sealed server in-process through tower, without a socket.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use burrow::{Reply, RequestContext, Server, ServerOptions};
use serde_json::{json, Value};
use tower::ServiceExt;

fn demo_server() -> Server {
    let mut server = Server::new(ServerOptions {
        recovery: Some(true),
        logging: Some(true),
        ..Default::default()
    });
    server
        .get("/files/*path", |ctx: RequestContext| async move {
            Reply::ok(&ctx.param("path").unwrap_or_default().to_string())
        })
        .unwrap();
    server
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_wildcard_route_oneshot() {
    let app = demo_server().into_router().unwrap();

    let response = app
        .oneshot(
            Request::get("/files/docs/guide.md")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        body_json(response).await,
        json!({"status": true, "data": "docs/guide.md", "message": "OK"})
    );
}

#[tokio::test]
async fn test_empty_segment_is_not_found() {
    let app = demo_server().into_router().unwrap();

    let response = app
        .oneshot(Request::get("/files/a//b").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["status"], json!(false));
}
