//! Configuration schema definitions.
//!
//! [`ServerOptions`] is what callers supply (every field optional);
//! [`Config`] is the resolved, frozen view the server runs with.

use serde::{Deserialize, Deserializer, Serialize};

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listening port.
pub const DEFAULT_PORT: &str = "8080";

/// Default tracing filter when neither `RUST_LOG` nor `log_level` is set.
pub const DEFAULT_LOG_LEVEL: &str = "burrow=info";

/// Caller-supplied overrides. Empty strings and `None` keep the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerOptions {
    /// Bind host (default `0.0.0.0`).
    pub host: String,

    /// Listening port (default `8080`). Accepts a number or a string in TOML.
    #[serde(deserialize_with = "string_or_number")]
    pub port: String,

    /// Log every request (default false).
    pub logging: Option<bool>,

    /// Recover handler panics as 500 responses (default false).
    pub recovery: Option<bool>,

    /// Per-request timeout enforced by the transport (default none).
    pub request_timeout_secs: Option<u64>,

    /// Tracing filter directive, e.g. `burrow=debug`.
    pub log_level: Option<String>,
}

crate::env_bindings!(ServerOptions {
    host: String => "key=BURROW_HOST",
    port: String => "key=PORT",
    logging: Option<bool> => "key=BURROW_LOGGING",
    recovery: Option<bool> => "key=BURROW_RECOVERY",
    request_timeout_secs: Option<u64> => "key=BURROW_REQUEST_TIMEOUT_SECS",
    log_level: Option<String> => "key=BURROW_LOG_LEVEL",
});

impl ServerOptions {
    /// Layer `other` on top of `self`; set fields in `other` win.
    pub fn overlay(mut self, other: ServerOptions) -> Self {
        if !other.host.is_empty() {
            self.host = other.host;
        }
        if !other.port.is_empty() {
            self.port = other.port;
        }
        self.logging = other.logging.or(self.logging);
        self.recovery = other.recovery.or(self.recovery);
        self.request_timeout_secs = other.request_timeout_secs.or(self.request_timeout_secs);
        self.log_level = other.log_level.or(self.log_level);
        self
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Text(String),
        Number(u64),
    }

    Ok(match Port::deserialize(deserializer)? {
        Port::Text(s) => s,
        Port::Number(n) => n.to_string(),
    })
}

/// Resolved server configuration. Read-only once the server is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub host: String,
    pub port: String,
    pub logging: bool,
    pub recovery: bool,
    pub request_timeout_secs: Option<u64>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT.to_string(),
            logging: false,
            recovery: false,
            request_timeout_secs: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Defaults, then every set option in `options`.
    pub fn from_options(options: ServerOptions) -> Self {
        let defaults = Self::default();
        Self {
            host: non_empty(options.host).unwrap_or(defaults.host),
            port: non_empty(options.port).unwrap_or(defaults.port),
            logging: options.logging.unwrap_or(defaults.logging),
            recovery: options.recovery.unwrap_or(defaults.recovery),
            request_timeout_secs: options.request_timeout_secs.or(defaults.request_timeout_secs),
            log_level: options
                .log_level
                .and_then(non_empty)
                .unwrap_or(defaults.log_level),
        }
    }

    /// `host:port`, bracketing IPv6 hosts that are not bracketed yet.
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvBinder, EnvSource};

    #[test]
    fn test_defaults() {
        let config = Config::from_options(ServerOptions::default());
        assert_eq!(config.port, "8080");
        assert_eq!(config.host, "0.0.0.0");
        assert!(!config.logging);
        assert!(!config.recovery);
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_explicit_false_and_overrides() {
        let config = Config::from_options(ServerOptions {
            port: "9000".into(),
            logging: Some(true),
            recovery: Some(false),
            ..Default::default()
        });
        assert_eq!(config.port, "9000");
        assert!(config.logging);
        assert!(!config.recovery);
    }

    #[test]
    fn test_blank_strings_keep_defaults() {
        let config = Config::from_options(ServerOptions {
            host: "  ".into(),
            log_level: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_ipv6_address() {
        let config = Config::from_options(ServerOptions {
            host: "::1".into(),
            port: "3000".into(),
            ..Default::default()
        });
        assert_eq!(config.address(), "[::1]:3000");
    }

    #[test]
    fn test_bracketed_ipv6_kept() {
        let config = Config::from_options(ServerOptions {
            host: "[::1]".into(),
            port: "3000".into(),
            ..Default::default()
        });
        assert_eq!(config.address(), "[::1]:3000");
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let config = Config::from_options(ServerOptions {
            host: " 127.0.0.1 ".into(),
            port: " 9000".into(),
            log_level: Some(" burrow=debug ".into()),
            ..Default::default()
        });
        assert_eq!(config.address(), "127.0.0.1:9000");
        assert_eq!(config.log_level, "burrow=debug");
    }

    #[test]
    fn test_overlay() {
        let base = ServerOptions {
            port: "1000".into(),
            logging: Some(true),
            ..Default::default()
        };
        let merged = base.overlay(ServerOptions {
            port: "2000".into(),
            recovery: Some(true),
            ..Default::default()
        });
        assert_eq!(merged.port, "2000");
        assert_eq!(merged.logging, Some(true));
        assert_eq!(merged.recovery, Some(true));
    }

    #[test]
    fn test_port_from_toml_number_or_string() {
        let options: ServerOptions = toml::from_str("port = 9000").unwrap();
        assert_eq!(options.port, "9000");
        let options: ServerOptions = toml::from_str("port = \"9001\"\nrecovery = true").unwrap();
        assert_eq!(options.port, "9001");
        assert_eq!(options.recovery, Some(true));
    }

    #[test]
    fn test_options_bind_from_env_source() {
        let binder = EnvBinder::new(EnvSource::from_pairs([
            ("PORT", "4000"),
            ("BURROW_RECOVERY", "true"),
            ("BURROW_LOGGING", "0"),
        ]));
        let options: ServerOptions = binder.load().unwrap();
        assert_eq!(options.port, "4000");
        assert_eq!(options.recovery, Some(true));
        assert_eq!(options.logging, Some(false));
        assert_eq!(options.host, "");
        assert_eq!(options.request_timeout_secs, None);
    }
}
