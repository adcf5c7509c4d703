//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum::serve, one task per connection)
//!     → request.rs (wrap request, assign request ID)
//!     → composed middleware chain (see `middleware`)
//!     → server.rs dispatch (router lookup, 404 / 405)
//!     → handler.rs (route handler)
//!     → response.rs ({status, data, message} envelope)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{Handler, HandlerFuture};
pub use request::{BodyError, RequestContext, RequestId, MAX_BODY_BYTES, X_REQUEST_ID};
pub use response::{Envelope, Reply};
pub use server::{RunningServer, Server, ServerError};
