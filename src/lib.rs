//! Burrow: a small HTTP service framework.
//!
//! Routes are `/literal/:param/*rest` patterns matched first-registered
//! first. Middleware wraps the dispatcher in onion order, panic recovery
//! and request logging are switched on by configuration, and settings can
//! be bound from environment variables through explicit field tables.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod routing;

pub use config::{Config, EnvBind, EnvBinder, ServerOptions};
pub use error::SetupError;
pub use http::{Handler, Reply, RequestContext, RunningServer, Server, ServerError};
pub use lifecycle::Shutdown;
pub use middleware::{from_fn, Middleware};
