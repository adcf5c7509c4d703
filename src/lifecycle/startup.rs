//! Startup orchestration.
//!
//! # Responsibilities
//! - Gather server options from every configured source
//! - Apply them in a fixed order of precedence
//! - Validate the result before anything binds
//!
//! # Design Decisions
//! - Precedence, lowest first: options file, env file, process env, CLI flags
//! - Fail fast: any startup error is fatal
//! - Sources are read once; nothing is re-read after the server starts

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{
    load_options, validate_options, BindError, ConfigError, EnvBinder, ServerOptions,
};

/// Errors raised while resolving startup options.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("options file: {0}")]
    Config(#[from] ConfigError),

    #[error("environment: {0}")]
    Env(#[from] BindError),
}

/// Where startup options come from. Unset fields are skipped.
#[derive(Debug, Clone, Default)]
pub struct StartupSources {
    /// TOML options file.
    pub config_file: Option<PathBuf>,
    /// `KEY=VALUE` env file, overridden by the process environment.
    pub env_file: Option<PathBuf>,
    /// Host from the command line.
    pub host: Option<String>,
    /// Port from the command line.
    pub port: Option<String>,
}

/// Resolve the effective [`ServerOptions`] from `sources`.
pub fn resolve_options(sources: &StartupSources) -> Result<ServerOptions, StartupError> {
    let mut options = match &sources.config_file {
        Some(path) => load_options(path)?,
        None => ServerOptions::default(),
    };

    let binder = EnvBinder::from_env(sources.env_file.as_deref())?;
    let from_env: ServerOptions = binder.load()?;
    options = options.overlay(from_env);

    options = options.overlay(ServerOptions {
        host: sources.host.clone().unwrap_or_default(),
        port: sources.port.clone().unwrap_or_default(),
        ..Default::default()
    });

    validate_options(&options).map_err(ConfigError::Validation)?;

    tracing::debug!(
        host = %options.host,
        port = %options.port,
        config_file = ?sources.config_file,
        env_file = ?sources.env_file,
        "Startup options resolved"
    );
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("burrow-startup-{}-{name}", std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_cli_overrides_file() {
        let config_file = temp_file("cli.toml", "host = \"127.0.0.1\"\nport = 3000\nrecovery = true\n");
        let sources = StartupSources {
            config_file: Some(config_file.clone()),
            port: Some("4000".into()),
            ..Default::default()
        };

        let options = resolve_options(&sources).unwrap();
        assert_eq!(options.host, "127.0.0.1");
        assert_eq!(options.port, "4000");
        assert_eq!(options.recovery, Some(true));

        fs::remove_file(config_file).ok();
    }

    #[test]
    fn test_env_file_overrides_options_file() {
        let config_file = temp_file("env.toml", "logging = false\n");
        let env_file = temp_file("env.env", "BURROW_LOGGING=true\n");
        let sources = StartupSources {
            config_file: Some(config_file.clone()),
            env_file: Some(env_file.clone()),
            ..Default::default()
        };

        let options = resolve_options(&sources).unwrap();
        assert_eq!(options.logging, Some(true));

        fs::remove_file(config_file).ok();
        fs::remove_file(env_file).ok();
    }

    #[test]
    fn test_invalid_cli_port_rejected() {
        let sources = StartupSources {
            port: Some("not-a-port".into()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_options(&sources),
            Err(StartupError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn test_missing_options_file() {
        let sources = StartupSources {
            config_file: Some(std::env::temp_dir().join("burrow-startup-missing.toml")),
            ..Default::default()
        };
        assert!(matches!(
            resolve_options(&sources),
            Err(StartupError::Config(ConfigError::Io(_)))
        ));
    }
}
