//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (before start):
//!     (method, "/users/:id", handler)
//!     → matcher.rs (parse pattern into segments)
//!     → router.rs (reject structural duplicates, append entry)
//!
//! Incoming Request (method, path)
//!     → router.rs (scan entries in registration order)
//!     → matcher.rs (segment-by-segment match, capture params)
//!     → Return: Matched { handler, params } | NotFound | MethodNotAllowed
//! ```
//!
//! # Design Decisions
//! - Routes registered before start, immutable while serving
//! - No regex in hot path (literal segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod matcher;
pub mod params;
pub mod router;

pub use matcher::{match_path, PatternError, RoutePattern, Segment};
pub use params::Params;
pub use router::{Resolution, RouteEntry, Router};
