//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports, timeouts)
//! - Validate the tracing filter directive
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over `ServerOptions`
//! - Runs before options are turned into a frozen `Config`

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::ServerOptions;

/// A single semantic problem in the options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("port `{0}` is not a number between 0 and 65535")]
    InvalidPort(String),

    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("log level `{0}` is not a valid filter directive")]
    InvalidLogLevel(String),
}

/// Check options for values that would only fail later at bind time.
pub fn validate_options(options: &ServerOptions) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !options.port.is_empty() && options.port.trim().parse::<u16>().is_err() {
        errors.push(ValidationError::InvalidPort(options.port.clone()));
    }

    if options.request_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout);
    }

    if let Some(level) = options.log_level.as_deref().filter(|l| !l.trim().is_empty()) {
        if EnvFilter::try_new(level).is_err() {
            errors.push(ValidationError::InvalidLogLevel(level.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
