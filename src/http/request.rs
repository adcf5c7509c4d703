//! Per-request context handed to handlers and middleware.
//!
//! # Responsibilities
//! - Carry the transport request and the matched path params
//! - Assign a request ID (client-supplied `x-request-id` or UUID v4)
//! - Offer query and JSON body accessors
//!
//! # Design Decisions
//! - One context per request, moved through the chain, never shared
//! - Request ID assigned as early as possible for log correlation
//! - Body reads are bounded by `MAX_BODY_BYTES`

use std::fmt;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::http::Reply;
use crate::routing::Params;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Upper bound for buffered request bodies.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Correlation ID attached to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh UUID v4 ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure to read or decode a request body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("failed to read request body: {0}")]
    Read(#[from] axum::Error),

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntoResponse for BodyError {
    fn into_response(self) -> Response {
        Reply::error(StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// The request as seen by handlers.
#[derive(Debug)]
pub struct RequestContext {
    request: Request<Body>,
    params: Params,
    request_id: RequestId,
}

impl RequestContext {
    /// Wrap a transport request, reusing its `x-request-id` if present.
    pub fn new(request: Request<Body>) -> Self {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| RequestId(v.to_string()))
            .unwrap_or_else(RequestId::generate);

        Self {
            request,
            params: Params::new(),
            request_id,
        }
    }

    pub(crate) fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// Path parameter bound by the matched route.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Decoded query string pairs in order of appearance.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.request
            .uri()
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First value of query parameter `name`.
    pub fn query(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn request(&self) -> &Request<Body> {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request<Body> {
        &mut self.request
    }

    /// Give back the transport request.
    pub fn into_request(self) -> Request<Body> {
        self.request
    }

    /// Buffer the body and decode it as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, BodyError> {
        let bytes = axum::body::to_bytes(self.request.into_body(), MAX_BODY_BYTES).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Buffer the body as UTF-8 text (lossy).
    pub async fn text(self) -> Result<String, BodyError> {
        let bytes = axum::body::to_bytes(self.request.into_body(), MAX_BODY_BYTES).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_reused_from_header() {
        let req = Request::builder()
            .uri("/x")
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        let ctx = RequestContext::new(req);
        assert_eq!(ctx.request_id().as_str(), "abc-123");
    }

    #[test]
    fn test_request_id_generated() {
        let req = Request::builder().uri("/x").body(Body::empty()).unwrap();
        let a = RequestContext::new(req);
        let req = Request::builder().uri("/x").body(Body::empty()).unwrap();
        let b = RequestContext::new(req);
        assert_ne!(a.request_id(), b.request_id());
        assert!(Uuid::parse_str(a.request_id().as_str()).is_ok());
    }

    #[test]
    fn test_query_pairs_decoded() {
        let req = Request::builder()
            .uri("/search?q=hello+world&tag=a%2Fb&tag=c")
            .body(Body::empty())
            .unwrap();
        let ctx = RequestContext::new(req);
        assert_eq!(ctx.path(), "/search");
        assert_eq!(ctx.query("q").as_deref(), Some("hello world"));
        assert_eq!(ctx.query("tag").as_deref(), Some("a/b"));
        assert_eq!(ctx.query_pairs().len(), 3);
        assert_eq!(ctx.query("missing"), None);
    }

    #[tokio::test]
    async fn test_json_body() {
        #[derive(Debug, serde::Deserialize)]
        struct Input {
            name: String,
        }

        let req = Request::builder()
            .method(Method::POST)
            .uri("/users")
            .body(Body::from(r#"{"name":"ada"}"#))
            .unwrap();
        let input: Input = RequestContext::new(req).json().await.unwrap();
        assert_eq!(input.name, "ada");

        let req = Request::builder()
            .method(Method::POST)
            .uri("/users")
            .body(Body::from("not json"))
            .unwrap();
        let err = RequestContext::new(req).json::<Input>().await.unwrap_err();
        assert!(matches!(err, BodyError::Json(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
