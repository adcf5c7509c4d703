//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     TOML options → env binding (file + process env) → CLI flags
//!     → ServerOptions → Config (frozen)
//!
//! Shutdown (shutdown.rs):
//!     trigger() → server stops accepting → in-flight requests drain
//!
//! Signals (signals.rs):
//!     Ctrl+C → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Configuration loading completes (or fails) before any listener binds
//! - Fail fast: any startup error is fatal
//! - Shutdown is a broadcast so any number of tasks can observe it

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{resolve_options, StartupError, StartupSources};
