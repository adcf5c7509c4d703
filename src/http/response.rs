//! Response envelope and builder.
//!
//! # Responsibilities
//! - Define the `{status, data, message}` JSON envelope
//! - Build replies fluently: `Reply::status(code).json(&data)`
//! - Provide the fixed 404/405/500 replies used by the framework
//!
//! # Design Decisions
//! - `status` mirrors whether the HTTP code is a success (2xx)
//! - Default message is the canonical reason phrase of the code
//! - Serialization failures degrade to a 500 envelope, never a panic

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire format of every JSON reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub status: bool,
    pub data: T,
    pub message: String,
}

/// A status code plus an [`Envelope`] body.
#[derive(Debug, Clone)]
pub struct Reply {
    code: StatusCode,
    body: Envelope,
}

impl Reply {
    /// Start a reply with the given status code, null data and the
    /// canonical reason as message.
    pub fn status(code: StatusCode) -> Self {
        Self {
            code,
            body: Envelope {
                status: code.is_success(),
                data: Value::Null,
                message: code.canonical_reason().unwrap_or_default().to_string(),
            },
        }
    }

    /// `200 OK` carrying `data`.
    pub fn ok<T: Serialize>(data: &T) -> Self {
        Self::status(StatusCode::OK).json(data)
    }

    /// An error reply with a custom message.
    pub fn error(code: StatusCode, message: impl Into<String>) -> Self {
        Self::status(code).message(message)
    }

    pub fn not_found() -> Self {
        Self::status(StatusCode::NOT_FOUND)
    }

    pub fn method_not_allowed() -> Self {
        Self::status(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn internal_error() -> Self {
        Self::status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Set the `data` field.
    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => {
                self.body.data = value;
                self
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize reply data");
                Self::internal_error()
            }
        }
    }

    /// Set the `message` field.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.body.message = message.into();
        self
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn envelope(&self) -> &Envelope {
        &self.body
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.code, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_shape() {
        let reply = Reply::ok(&json!({"id": 1}));
        assert_eq!(reply.code(), StatusCode::OK);
        assert_eq!(
            serde_json::to_value(reply.envelope()).unwrap(),
            json!({"status": true, "data": {"id": 1}, "message": "OK"})
        );
    }

    #[test]
    fn test_error_envelope_shape() {
        let reply = Reply::error(StatusCode::BAD_REQUEST, "bad input");
        assert_eq!(
            serde_json::to_value(reply.envelope()).unwrap(),
            json!({"status": false, "data": null, "message": "bad input"})
        );
    }

    #[test]
    fn test_fluent_status_json() {
        let reply = Reply::status(StatusCode::CREATED)
            .json(&vec!["a", "b"])
            .message("created");
        assert_eq!(reply.code(), StatusCode::CREATED);
        assert!(reply.envelope().status);
        assert_eq!(reply.envelope().data, json!(["a", "b"]));
        assert_eq!(reply.envelope().message, "created");
    }

    #[test]
    fn test_into_response_status() {
        let response = Reply::internal_error().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }
}
