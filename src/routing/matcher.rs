//! Route pattern parsing and path matching.
//!
//! # Responsibilities
//! - Parse `/literal/:param/*rest` patterns into segments
//! - Match a request path against a pattern, capturing parameters
//! - Compare patterns by structural shape for duplicate detection
//!
//! # Design Decisions
//! - Literal matching is case-sensitive
//! - Empty path segments (`//`, trailing `/`) never match
//! - Fixed arity unless the pattern ends in a `*wildcard`
//! - No regex to guarantee O(n) matching

use std::fmt;

use thiserror::Error;

use crate::routing::Params;

/// Errors raised while parsing a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern `{0}` must start with `/`")]
    MissingLeadingSlash(String),

    #[error("pattern `{0}` contains an empty segment")]
    EmptySegment(String),

    #[error("pattern `{0}` has a placeholder without a name")]
    UnnamedPlaceholder(String),

    #[error("pattern `{pattern}` binds `{name}` more than once")]
    DuplicateParam { pattern: String, name: String },

    #[error("pattern `{pattern}`: wildcard `*{name}` must be the last segment")]
    WildcardNotLast { pattern: String, name: String },
}

/// One segment of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),
    /// `:name`, matches any single non-empty segment.
    Param(String),
    /// `*name`, matches the remaining segments (at least one).
    Wildcard(String),
}

impl Segment {
    /// Two segments have the same shape when they are equal literals or
    /// placeholders of the same kind. Placeholder names are ignored.
    fn same_shape(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            (Segment::Param(_), Segment::Param(_)) => true,
            (Segment::Wildcard(_), Segment::Wildcard(_)) => true,
            _ => false,
        }
    }
}

/// A parsed route pattern. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern such as `/users/:id/posts`.
    ///
    /// `/` alone is the root pattern with zero segments.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let rest = raw
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(raw.to_string()))?;

        let mut segments: Vec<Segment> = Vec::new();
        if !rest.is_empty() {
            let parts: Vec<&str> = rest.split('/').collect();
            let last = parts.len() - 1;

            for (index, part) in parts.into_iter().enumerate() {
                let segment = if part.is_empty() {
                    return Err(PatternError::EmptySegment(raw.to_string()));
                } else if let Some(name) = part.strip_prefix(':') {
                    Segment::Param(Self::placeholder_name(raw, name)?)
                } else if let Some(name) = part.strip_prefix('*') {
                    let name = Self::placeholder_name(raw, name)?;
                    if index != last {
                        return Err(PatternError::WildcardNotLast {
                            pattern: raw.to_string(),
                            name,
                        });
                    }
                    Segment::Wildcard(name)
                } else {
                    Segment::Literal(part.to_string())
                };

                if let Segment::Param(name) | Segment::Wildcard(name) = &segment {
                    let taken = segments.iter().any(|s| {
                        matches!(s, Segment::Param(n) | Segment::Wildcard(n) if n == name)
                    });
                    if taken {
                        return Err(PatternError::DuplicateParam {
                            pattern: raw.to_string(),
                            name: name.clone(),
                        });
                    }
                }

                segments.push(segment);
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    fn placeholder_name(raw: &str, name: &str) -> Result<String, PatternError> {
        if name.is_empty() {
            return Err(PatternError::UnnamedPlaceholder(raw.to_string()));
        }
        Ok(name.to_string())
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when both patterns accept exactly the same set of paths,
    /// i.e. they differ at most in placeholder names.
    pub fn same_shape(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.same_shape(b))
    }

    /// Match `path` against this pattern. See [`match_path`].
    pub fn matches(&self, path: &str) -> Option<Params> {
        match_path(self, path)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Decide whether `path` matches `pattern`, returning the captured
/// parameters on success.
///
/// Any mismatch short-circuits to `None`; bindings are only produced when
/// every segment matched.
pub fn match_path(pattern: &RoutePattern, path: &str) -> Option<Params> {
    let rest = path.strip_prefix('/')?;
    let parts: Vec<&str> = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split('/').collect()
    };

    if parts.iter().any(|part| part.is_empty()) {
        return None;
    }

    let has_wildcard = matches!(pattern.segments.last(), Some(Segment::Wildcard(_)));
    if !has_wildcard && parts.len() != pattern.segments.len() {
        return None;
    }

    let mut params = Params::new();
    for (index, segment) in pattern.segments.iter().enumerate() {
        match segment {
            Segment::Literal(literal) => {
                if parts.get(index) != Some(&literal.as_str()) {
                    return None;
                }
            }
            Segment::Param(name) => {
                params.push(name.as_str(), *parts.get(index)?);
            }
            Segment::Wildcard(name) => {
                if index >= parts.len() {
                    return None;
                }
                params.push(name.as_str(), parts[index..].join("/"));
            }
        }
    }

    Some(params)
}
