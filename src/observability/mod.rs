//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields, request_id where known)
//!
//! Consumers:
//!     → logging.rs fmt subscriber (stdout)
//! ```
//!
//! # Design Decisions
//! - Structured logging via the tracing crate
//! - Request ID flows through every per-request log line
//! - `RUST_LOG` wins over the configured level

pub mod logging;

pub use logging::init;
