//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Collect routes and middleware before start
//! - Seal the router and middleware chain into one composed handler
//! - Insert the request deadline, recovery and request logging per
//!   configuration
//! - Bind the configured address and serve until shutdown
//!
//! # Design Decisions
//! - Single writer before start, read-only after: registration after
//!   `start`/`into_router` is a `SetupError`, not a runtime condition
//! - The composed handler is mounted as axum's fallback, so routing is
//!   decided by our router alone
//! - One tokio task per connection (axum::serve); handlers share only
//!   `Arc`'d immutable state

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::{Config, ServerOptions};
use crate::error::SetupError;
use crate::http::{Handler, Reply, RequestContext, X_REQUEST_ID};
use crate::lifecycle::{signals, Shutdown};
use crate::middleware::{Middleware, MiddlewareChain, Recovery, RequestLogging, Timeout};
use crate::routing::{Resolution, Router};

/// Errors surfaced by [`Server::start`] and [`Server::run`].
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Builder and owner of a single HTTP server.
pub struct Server {
    config: Arc<Config>,
    routes: Router<Handler>,
    chain: MiddlewareChain,
    started: bool,
}

impl Server {
    /// Create a server from caller options layered over the defaults.
    pub fn new(options: ServerOptions) -> Self {
        Self::with_config(Config::from_options(options))
    }

    /// Create a server from an already resolved configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            routes: Router::new(),
            chain: MiddlewareChain::new(),
            started: false,
        }
    }

    /// The frozen configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register `handler` for `method` and `pattern`.
    pub fn route<F, Fut, R>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
    ) -> Result<&mut Self, SetupError>
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        if self.started {
            return Err(SetupError::AlreadyStarted);
        }
        self.routes.register(method, pattern, Handler::new(handler))?;
        Ok(self)
    }

    pub fn get<F, Fut, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, SetupError>
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post<F, Fut, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, SetupError>
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.route(Method::POST, pattern, handler)
    }

    pub fn put<F, Fut, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, SetupError>
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.route(Method::PUT, pattern, handler)
    }

    pub fn patch<F, Fut, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, SetupError>
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.route(Method::PATCH, pattern, handler)
    }

    pub fn delete<F, Fut, R>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, SetupError>
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Append a middleware layer. Earlier layers run further out.
    pub fn middleware<M: Middleware>(&mut self, layer: M) -> Result<&mut Self, SetupError> {
        if self.started {
            return Err(SetupError::AlreadyStarted);
        }
        self.chain.add(layer)?;
        Ok(self)
    }

    /// Compose everything into the axum service. Runs at most once.
    fn seal(&mut self) -> Result<axum::Router, SetupError> {
        if self.started {
            return Err(SetupError::AlreadyStarted);
        }
        self.started = true;

        let routes = Arc::new(std::mem::take(&mut self.routes));
        tracing::debug!(routes = routes.len(), layers = self.chain.len(), "Sealing server");

        let mut app = dispatch(routes);
        if let Some(secs) = self.config.request_timeout_secs {
            app = Timeout::new(Duration::from_secs(secs)).decorate(app);
        }
        if self.config.recovery {
            app = Recovery.decorate(app);
        }
        app = self.chain.seal(app)?;
        if self.config.logging {
            app = RequestLogging.decorate(app);
        }

        Ok(axum::Router::new().fallback(move |request: Request<Body>| {
            let app = app.clone();
            async move { serve_request(app, request).await }
        }))
    }

    /// Seal the server without binding, e.g. to drive it in-process with
    /// `tower::ServiceExt::oneshot`.
    pub fn into_router(mut self) -> Result<axum::Router, SetupError> {
        self.seal()
    }

    /// Seal, bind the configured address and start serving in the background.
    pub async fn start(&mut self) -> Result<RunningServer, ServerError> {
        let app = self.seal()?;
        let address = self.config.address();

        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        tracing::info!(
            address = %local_addr,
            logging = self.config.logging,
            recovery = self.config.recovery,
            "Listening for connections"
        );

        let shutdown = Shutdown::new();
        let mut stop = shutdown.subscribe();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop.recv().await;
                })
                .await
        });

        Ok(RunningServer {
            local_addr,
            shutdown,
            task,
        })
    }

    /// Start and serve until Ctrl+C, then drain and return.
    pub async fn run(mut self) -> Result<(), ServerError> {
        let running = self.start().await?;
        signals::ctrl_c().await;
        running.shutdown().await?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Handle to a server started with [`Server::start`].
#[derive(Debug)]
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    /// The bound address (useful with port `0`).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting, drain in-flight requests and wait for the server task.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        self.shutdown.trigger();
        match self.task.await {
            Ok(result) => result.map_err(ServerError::Serve),
            Err(e) => Err(ServerError::Serve(std::io::Error::other(e))),
        }
    }
}

/// Terminal handler: resolve the route and call it, or answer 404/405.
fn dispatch(routes: Arc<Router<Handler>>) -> Handler {
    Handler::new(move |mut ctx: RequestContext| {
        let routes = Arc::clone(&routes);
        async move {
            match routes.resolve(ctx.method(), ctx.path()) {
                Resolution::Matched { handler, params } => {
                    let handler = handler.clone();
                    ctx.set_params(params);
                    handler.call(ctx).await
                }
                Resolution::NotFound => {
                    tracing::debug!(method = %ctx.method(), path = %ctx.path(), "No route matched");
                    Reply::not_found().into_response()
                }
                Resolution::MethodNotAllowed { allowed } => {
                    tracing::debug!(method = %ctx.method(), path = %ctx.path(), "Method not allowed");
                    let allow = allowed
                        .iter()
                        .map(Method::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    let mut response = Reply::method_not_allowed().into_response();
                    if let Ok(value) = HeaderValue::from_str(&allow) {
                        response.headers_mut().insert(header::ALLOW, value);
                    }
                    response
                }
            }
        }
    })
}

/// Transport entry point: wrap the request, run the composed handler and
/// echo the request ID.
async fn serve_request(app: Handler, request: Request<Body>) -> Response {
    let ctx = RequestContext::new(request);
    let request_id = ctx.request_id().clone();

    let mut response = app.call(ctx).await;
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
