//! Request logging middleware.

use std::time::Instant;

use crate::http::{Handler, RequestContext};
use crate::middleware::Middleware;

/// Emits one structured `info` event per completed request.
///
/// Installed outermost so the logged status includes anything produced by
/// user middleware and recovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogging;

impl Middleware for RequestLogging {
    fn decorate(&self, next: Handler) -> Handler {
        Handler::new(move |ctx: RequestContext| {
            let next = next.clone();
            async move {
                let method = ctx.method().clone();
                let path = ctx.path().to_string();
                let request_id = ctx.request_id().clone();
                let start = Instant::now();

                let response = next.call(ctx).await;

                tracing::info!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status = response.status().as_u16(),
                    elapsed = ?start.elapsed(),
                    "Request completed"
                );

                response
            }
        })
    }
}
