//! Panic recovery.
//!
//! # Responsibilities
//! - Catch panics raised by inner handlers, whether while building the
//!   response future or while polling it, and expired request deadlines
//! - Answer the failing request with a generic 500 envelope
//! - Log the panic payload with the request path
//!
//! # Design Decisions
//! - Failure stays local to the panicking request's task; other in-flight
//!   requests are unaffected
//! - Responses are only committed when the handler returns, so a 500 can
//!   always be written after a panic
//! - When recovery is disabled the panic reaches the transport, which drops
//!   that one connection

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use axum::response::IntoResponse;
use futures_util::FutureExt;

use crate::http::{Handler, Reply, RequestContext};
use crate::middleware::{Middleware, RequestTimedOut};

/// Converts handler panics into `500 Internal Server Error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recovery;

impl Middleware for Recovery {
    fn decorate(&self, next: Handler) -> Handler {
        Handler::new(move |ctx: RequestContext| {
            let next = next.clone();
            async move {
                let path = ctx.path().to_string();
                let request_id = ctx.request_id().clone();

                let outcome = match panic::catch_unwind(AssertUnwindSafe(|| next.call(ctx))) {
                    Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await,
                    Err(payload) => Err(payload),
                };

                match outcome {
                    Ok(response) => response,
                    Err(payload) => {
                        if let Some(timed_out) = payload.downcast_ref::<RequestTimedOut>() {
                            tracing::warn!(
                                request_id = %request_id,
                                path = %path,
                                limit = ?timed_out.limit,
                                "Request timed out; recovered"
                            );
                            return Reply::internal_error().into_response();
                        }
                        tracing::error!(
                            request_id = %request_id,
                            path = %path,
                            error = %panic_message(payload.as_ref()),
                            "Handler panicked; recovered"
                        );
                        Reply::internal_error().into_response()
                    }
                }
            }
        })
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(timed_out) = payload.downcast_ref::<RequestTimedOut>() {
        timed_out.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}
