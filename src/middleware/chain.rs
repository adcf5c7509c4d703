//! Ordered middleware composition.

use std::future::Future;
use std::sync::Arc;

use axum::response::IntoResponse;

use crate::error::SetupError;
use crate::http::{Handler, RequestContext};

/// A decorator that wraps the next handler in the chain.
pub trait Middleware: Send + Sync + 'static {
    /// Produce a handler that runs around `next`.
    fn decorate(&self, next: Handler) -> Handler;
}

impl<F> Middleware for F
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    fn decorate(&self, next: Handler) -> Handler {
        self(next)
    }
}

/// Middleware built from an async `(ctx, next) -> response` function.
///
/// Created by [`from_fn`].
pub struct FromFn<F> {
    f: Arc<F>,
}

/// Turn an async function into middleware.
///
/// ```no_run
/// use burrow::middleware::from_fn;
/// use burrow::http::{Handler, RequestContext};
///
/// let timing = from_fn(|ctx: RequestContext, next: Handler| async move {
///     let started = std::time::Instant::now();
///     let response = next.call(ctx).await;
///     tracing::debug!(elapsed = ?started.elapsed(), "inner done");
///     response
/// });
/// ```
pub fn from_fn<F, Fut, R>(f: F) -> FromFn<F>
where
    F: Fn(RequestContext, Handler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    FromFn { f: Arc::new(f) }
}

impl<F, Fut, R> Middleware for FromFn<F>
where
    F: Fn(RequestContext, Handler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn decorate(&self, next: Handler) -> Handler {
        let f = Arc::clone(&self.f);
        Handler::new(move |ctx| f(ctx, next.clone()))
    }
}

/// Ordered list of middleware, composed once around a terminal handler.
#[derive(Default)]
pub struct MiddlewareChain {
    layers: Vec<Arc<dyn Middleware>>,
    sealed: bool,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer. Layers added earlier run further out.
    pub fn add<M: Middleware>(&mut self, layer: M) -> Result<(), SetupError> {
        if self.sealed {
            return Err(SetupError::ChainSealed);
        }
        self.layers.push(Arc::new(layer));
        Ok(())
    }

    /// Compose all layers around `terminal`.
    ///
    /// For layers `[A, B, C]` the result runs A, B, C, terminal, C, B, A.
    /// With no layers the terminal handler is returned unchanged. A chain
    /// can be sealed only once.
    pub fn seal(&mut self, terminal: Handler) -> Result<Handler, SetupError> {
        if self.sealed {
            return Err(SetupError::ChainSealed);
        }
        self.sealed = true;

        Ok(self
            .layers
            .iter()
            .rev()
            .fold(terminal, |next, layer| layer.decorate(next)))
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording(log: &Log, name: &'static str) -> impl Middleware {
        let log = Arc::clone(log);
        from_fn(move |ctx: RequestContext, next: Handler| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(format!("{name}-before"));
                let response = next.call(ctx).await;
                log.lock().unwrap().push(format!("{name}-after"));
                response
            }
        })
    }

    fn terminal(log: &Log) -> Handler {
        let log = Arc::clone(log);
        Handler::new(move |_ctx| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push("T".to_string());
                StatusCode::NO_CONTENT
            }
        })
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Request::builder().uri("/").body(Body::empty()).unwrap())
    }

    #[tokio::test]
    async fn test_onion_ordering() {
        let log: Log = Arc::default();
        let mut chain = MiddlewareChain::new();
        chain.add(recording(&log, "A")).unwrap();
        chain.add(recording(&log, "B")).unwrap();

        let handler = chain.seal(terminal(&log)).unwrap();
        let response = handler.call(ctx()).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["A-before", "B-before", "T", "B-after", "A-after"]
        );
    }

    #[tokio::test]
    async fn test_onion_ordering_many_layers() {
        let log: Log = Arc::default();
        let mut chain = MiddlewareChain::new();
        for name in ["0", "1", "2", "3"] {
            chain.add(recording(&log, name)).unwrap();
        }

        chain.seal(terminal(&log)).unwrap().call(ctx()).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "0-before", "1-before", "2-before", "3-before", "T", "3-after", "2-after",
                "1-after", "0-after"
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_chain_is_terminal() {
        let log: Log = Arc::default();
        let mut chain = MiddlewareChain::new();
        assert!(chain.is_empty());

        chain.seal(terminal(&log)).unwrap().call(ctx()).await;
        assert_eq!(*log.lock().unwrap(), vec!["T"]);
    }

    #[tokio::test]
    async fn test_closure_middleware_can_short_circuit() {
        let log: Log = Arc::default();
        let mut chain = MiddlewareChain::new();
        chain
            .add(|_next: Handler| Handler::new(|_ctx| async { StatusCode::FORBIDDEN }))
            .unwrap();

        let response = chain.seal(terminal(&log)).unwrap().call(ctx()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_mutation_after_seal_rejected() {
        let log: Log = Arc::default();
        let mut chain = MiddlewareChain::new();
        chain.seal(terminal(&log)).unwrap();
        assert!(chain.is_sealed());

        assert!(matches!(
            chain.add(recording(&log, "late")),
            Err(SetupError::ChainSealed)
        ));
        assert!(matches!(
            chain.seal(terminal(&log)),
            Err(SetupError::ChainSealed)
        ));
    }
}
