//! Route registration and lookup.
//!
//! # Responsibilities
//! - Store registered routes in registration order
//! - Reject structurally duplicate patterns per method
//! - Resolve (method, path) to a handler plus params, or an explicit miss
//!
//! # Design Decisions
//! - Immutable once the server starts (shared via `Arc` without locks)
//! - O(n) scan over entries (acceptable for typical route counts)
//! - First registered match wins; a literal `/users/active` only beats
//!   `/users/:id` when it was registered first
//! - NotFound and MethodNotAllowed stay distinct so the boundary can
//!   answer 404 vs 405

use axum::http::Method;

use crate::error::SetupError;
use crate::routing::{match_path, Params, RoutePattern};

/// A registered (method, pattern, handler) triple.
#[derive(Debug)]
pub struct RouteEntry<H> {
    pub method: Method,
    pub pattern: RoutePattern,
    pub handler: H,
}

/// Outcome of resolving a request against the router.
#[derive(Debug)]
pub enum Resolution<'a, H> {
    /// A route matched both method and path.
    Matched { handler: &'a H, params: Params },
    /// No route matched the path under any method.
    NotFound,
    /// The path matched, but only under other methods.
    MethodNotAllowed { allowed: Vec<Method> },
}

/// Ordered route table.
#[derive(Debug)]
pub struct Router<H> {
    entries: Vec<RouteEntry<H>>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H> Router<H> {
    /// Create an empty router. An empty router answers NotFound for everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `method` and `pattern`.
    ///
    /// Fails if the pattern is malformed or structurally duplicates an
    /// existing pattern for the same method.
    pub fn register(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), SetupError> {
        let pattern = RoutePattern::parse(pattern)?;

        if let Some(existing) = self
            .entries
            .iter()
            .find(|e| e.method == method && e.pattern.same_shape(&pattern))
        {
            return Err(SetupError::DuplicateRoute {
                method,
                pattern: pattern.as_str().to_string(),
                existing: existing.pattern.as_str().to_string(),
            });
        }

        tracing::debug!(method = %method, pattern = %pattern, "Route registered");
        self.entries.push(RouteEntry {
            method,
            pattern,
            handler,
        });
        Ok(())
    }

    /// Resolve a request. The first entry whose method and pattern both
    /// match wins.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_, H> {
        let mut allowed: Vec<Method> = Vec::new();

        for entry in &self.entries {
            let Some(params) = match_path(&entry.pattern, path) else {
                continue;
            };

            if entry.method == *method {
                return Resolution::Matched {
                    handler: &entry.handler,
                    params,
                };
            }

            if !allowed.contains(&entry.method) {
                allowed.push(entry.method.clone());
            }
        }

        if allowed.is_empty() {
            Resolution::NotFound
        } else {
            Resolution::MethodNotAllowed { allowed }
        }
    }

    /// Registered entries in registration order.
    pub fn entries(&self) -> &[RouteEntry<H>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler_for(resolution: Resolution<'_, &'static str>) -> Option<(&'static str, Params)> {
        match resolution {
            Resolution::Matched { handler, params } => Some((*handler, params)),
            _ => None,
        }
    }

    #[test]
    fn test_literal_registered_first_wins() {
        let mut router = Router::new();
        router.register(Method::GET, "/users/active", "active").unwrap();
        router.register(Method::GET, "/users/:id", "by_id").unwrap();

        let (handler, params) = handler_for(router.resolve(&Method::GET, "/users/active")).unwrap();
        assert_eq!(handler, "active");
        assert!(params.is_empty());

        let (handler, params) = handler_for(router.resolve(&Method::GET, "/users/7")).unwrap();
        assert_eq!(handler, "by_id");
        assert_eq!(params.get("id"), Some("7"));
    }

    #[test]
    fn test_param_registered_first_shadows_literal() {
        let mut router = Router::new();
        router.register(Method::GET, "/users/:id", "by_id").unwrap();
        router.register(Method::GET, "/users/active", "active").unwrap();

        let (handler, params) = handler_for(router.resolve(&Method::GET, "/users/active")).unwrap();
        assert_eq!(handler, "by_id");
        assert_eq!(params.get("id"), Some("active"));
    }

    #[test]
    fn test_not_found_vs_method_not_allowed() {
        let mut router = Router::new();
        router.register(Method::GET, "/items/:id", "get").unwrap();
        router.register(Method::DELETE, "/items/:id", "delete").unwrap();

        assert!(matches!(
            router.resolve(&Method::GET, "/nothing/here"),
            Resolution::NotFound
        ));

        match router.resolve(&Method::POST, "/items/3") {
            Resolution::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, vec![Method::GET, Method::DELETE]);
            }
            other => panic!("expected MethodNotAllowed, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_router_is_not_found() {
        let router: Router<&'static str> = Router::new();
        assert!(router.is_empty());
        assert!(matches!(router.resolve(&Method::GET, "/"), Resolution::NotFound));
    }

    #[test]
    fn test_duplicate_shape_rejected() {
        let mut router = Router::new();
        router.register(Method::GET, "/users/:id", "a").unwrap();

        let err = router.register(Method::GET, "/users/:name", "b").unwrap_err();
        assert!(matches!(
            err,
            SetupError::DuplicateRoute { ref pattern, ref existing, .. }
                if pattern == "/users/:name" && existing == "/users/:id"
        ));

        // Same shape under another method is fine.
        router.register(Method::PUT, "/users/:name", "c").unwrap();
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut router = Router::new();
        let err = router.register(Method::GET, "no-slash", "a").unwrap_err();
        assert!(matches!(err, SetupError::InvalidPattern(_)));
        assert!(router.is_empty());
    }
}
