//! Per-request deadline.
//!
//! # Responsibilities
//! - Bound the time a routed handler may take
//! - Turn an expired deadline into a request failure
//!
//! # Design Decisions
//! - Installed directly around dispatch, inside recovery, so an expiry
//!   goes through the same path as a handler panic: a 500 envelope when
//!   recovery is enabled, a dropped connection when it is not
//! - The failure is raised as a typed [`RequestTimedOut`] payload that
//!   recovery recognizes and logs as a timeout
//! - Expiry drops the handler future; no work continues in the background

use std::fmt;
use std::panic;
use std::time::Duration;

use crate::http::{Handler, RequestContext};
use crate::middleware::Middleware;

/// Failure payload raised when a request outlives its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimedOut {
    pub limit: Duration,
}

impl fmt::Display for RequestTimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request exceeded its {:?} deadline", self.limit)
    }
}

/// Fails requests whose handler runs longer than `limit`.
#[derive(Debug, Clone, Copy)]
pub struct Timeout {
    limit: Duration,
}

impl Timeout {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl Middleware for Timeout {
    fn decorate(&self, next: Handler) -> Handler {
        let limit = self.limit;
        Handler::new(move |ctx: RequestContext| {
            let next = next.clone();
            async move {
                match tokio::time::timeout(limit, next.call(ctx)).await {
                    Ok(response) => response,
                    Err(_) => panic::panic_any(RequestTimedOut { limit }),
                }
            }
        })
    }
}
