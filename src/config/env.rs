//! Key/value environment sources.
//!
//! # Responsibilities
//! - Parse `KEY=VALUE` env files
//! - Snapshot the process environment
//! - Merge both with a fixed precedence
//!
//! # Design Decisions
//! - Process environment overrides file values: the file supplies
//!   defaults, the deployment environment has the final say
//! - Blank lines and `#` comments are skipped; other lines without `=`
//!   are rejected with their line number
//! - An optional `export ` prefix and matching surrounding quotes are
//!   accepted so shell-style env files load unchanged
//! - Non-UTF-8 process variables are ignored

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while building an [`EnvSource`].
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("failed to read env file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: expected KEY=VALUE", .path.display())]
    Malformed { path: PathBuf, line: usize },
}

/// A flat, string-keyed view of configuration variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path` (if given and non-empty), then overlay the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, EnvError> {
        let mut source = match path.filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => Self::from_file(path)?,
            None => Self::new(),
        };
        source.merge(Self::process());
        Ok(source)
    }

    /// Read and parse an env file.
    pub fn from_file(path: &Path) -> Result<Self, EnvError> {
        let content = std::fs::read_to_string(path).map_err(|source| EnvError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let source = Self::parse(&content).map_err(|line| EnvError::Malformed {
            path: path.to_path_buf(),
            line,
        })?;

        tracing::debug!(path = %path.display(), vars = source.len(), "Env file loaded");
        Ok(source)
    }

    /// Parse env file content. On failure returns the 1-based line number.
    pub fn parse(content: &str) -> Result<Self, usize> {
        let mut vars = HashMap::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=').ok_or(index + 1)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(index + 1);
            }

            vars.insert(key.to_string(), unquote(value.trim()).to_string());
        }

        Ok(Self { vars })
    }

    /// Snapshot of the current process environment.
    pub fn process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build a source from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Overlay `other` on top of `self`; `other` wins on key collisions.
    pub fn merge(&mut self, other: EnvSource) {
        self.vars.extend(other.vars);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let content = "\
# service settings
PORT=9000

export NAME = \"my service\"
EMPTY=
URL=postgres://u:p@host/db?sslmode=require
QUOTED='single'
";
        let source = EnvSource::parse(content).unwrap();
        assert_eq!(source.get("PORT"), Some("9000"));
        assert_eq!(source.get("NAME"), Some("my service"));
        assert_eq!(source.get("EMPTY"), Some(""));
        assert_eq!(source.get("URL"), Some("postgres://u:p@host/db?sslmode=require"));
        assert_eq!(source.get("QUOTED"), Some("single"));
        assert_eq!(source.len(), 5);
    }

    #[test]
    fn test_parse_malformed_line() {
        assert_eq!(EnvSource::parse("A=1\n\nnot a pair\n"), Err(3));
        assert_eq!(EnvSource::parse("=value"), Err(1));
    }

    #[test]
    fn test_merge_precedence() {
        let mut file = EnvSource::from_pairs([("PORT", "9000"), ("NAME", "file")]);
        file.merge(EnvSource::from_pairs([("PORT", "7000")]));
        assert_eq!(file.get("PORT"), Some("7000"));
        assert_eq!(file.get("NAME"), Some("file"));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("burrow-env-does-not-exist.env");
        let err = EnvSource::from_file(&path).unwrap_err();
        assert!(matches!(err, EnvError::Io { .. }));
    }

    #[test]
    fn test_load_without_file_sees_process_env() {
        std::env::set_var("BURROW_ENV_TEST_PROCESS_ONLY", "yes");
        let source = EnvSource::load(None).unwrap();
        assert_eq!(source.get("BURROW_ENV_TEST_PROCESS_ONLY"), Some("yes"));

        let source = EnvSource::load(Some(Path::new(""))).unwrap();
        assert_eq!(source.get("BURROW_ENV_TEST_PROCESS_ONLY"), Some("yes"));
    }
}
