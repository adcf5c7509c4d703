//! Middleware subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (before start):
//!     server.middleware(A); server.middleware(B)
//!     → chain.rs (ordered list, sealed once)
//!
//! Seal (at start):
//!     terminal = router dispatch
//!     → timeout.rs wraps terminal (if a deadline is configured)
//!     → recovery.rs wraps that (if enabled)
//!     → chain.rs folds user layers: A(B(terminal))
//!     → logging.rs wraps everything (if enabled)
//!
//! Per request:
//!     logging → A before → B before → recovery → timeout → dispatch
//!             ← A after  ← B after  ←          ←         ←
//! ```
//!
//! # Design Decisions
//! - First-added layer is outermost (onion ordering)
//! - Composition happens once, eagerly; requests only call the result
//! - Recovery sits inside user layers so they still observe a response
//!   when a handler panics or times out
//! - The chain adds no synchronization between requests

pub mod chain;
pub mod logging;
pub mod recovery;
pub mod timeout;

pub use chain::{from_fn, FromFn, Middleware, MiddlewareChain};
pub use logging::RequestLogging;
pub use recovery::Recovery;
pub use timeout::{RequestTimedOut, Timeout};
