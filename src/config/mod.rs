//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! options file (TOML)          env file (KEY=VALUE) + process env
//!     → loader.rs                  → env.rs (EnvSource, process env wins)
//!     → validation.rs              → binder.rs (tagged field table)
//!     ↘                           ↙
//!              ServerOptions (overlayed)
//!     → schema.rs Config::from_options (defaults, then overrides)
//!     → frozen Config shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server is built
//! - Options distinguish "unset" (`None` / empty) from explicit values
//! - Validation separates syntactic (serde) from semantic checks
//! - Env binding uses explicit per-type tables, not reflection

pub mod binder;
pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use binder::{
    bind, binding_specs, parse_bool, BindError, BindingSpec, EnvBind, EnvBinder, EnvField,
    FieldBinding, FieldKind,
};
pub use env::{EnvError, EnvSource};
pub use loader::{load_options, parse_options, ConfigError};
pub use schema::{Config, ServerOptions};
pub use validation::{validate_options, ValidationError};
