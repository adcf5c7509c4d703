//! Type-erased request handlers.
//!
//! Route handlers and middleware layers all reduce to [`Handler`]: a
//! cloneable, thread-safe function from [`RequestContext`] to a boxed
//! response future. Each request gets its own invocation; nothing here
//! synchronizes between requests.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};

use crate::http::RequestContext;

/// Future returned by a [`Handler`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A terminal handler or a handler already wrapped by middleware.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<dyn Fn(RequestContext) -> HandlerFuture + Send + Sync>,
}

impl Handler {
    /// Wrap an async function whose output converts into a response.
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self {
            inner: Arc::new(move |ctx| {
                let fut = f(ctx);
                Box::pin(async move { fut.await.into_response() })
            }),
        }
    }

    /// Invoke the handler for one request.
    pub fn call(&self, ctx: RequestContext) -> HandlerFuture {
        (self.inner)(ctx)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}
