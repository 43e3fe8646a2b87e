use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating route rules at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("Route rule is empty")]
    Empty,

    #[error("Route rule must start with '/': {0}")]
    NotAbsolute(String),

    #[error("Prefix rule must not end with '/': {0}")]
    TrailingSlash(String),

    #[error("Route scope has no include rules")]
    NoIncludes,
}

/// A single path rule. Prefixes match whole path segments, so
/// `Prefix("/assets")` covers `/assets` and `/assets/app.css` but not `/assetsx`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteRule {
    Exact(String),
    Prefix(String),
}

impl RouteRule {
    fn validate(&self) -> Result<(), ScopeError> {
        let (path, is_prefix) = match self {
            RouteRule::Exact(p) => (p, false),
            RouteRule::Prefix(p) => (p, true),
        };

        if path.is_empty() {
            return Err(ScopeError::Empty);
        }
        if !path.starts_with('/') {
            return Err(ScopeError::NotAbsolute(path.clone()));
        }
        if is_prefix && path.len() > 1 && path.ends_with('/') {
            return Err(ScopeError::TrailingSlash(path.clone()));
        }
        Ok(())
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            RouteRule::Exact(p) => path == p,
            RouteRule::Prefix(p) if p == "/" => path.starts_with('/'),
            RouteRule::Prefix(p) => match path.strip_prefix(p.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

/// Validated set of paths the protected-route guard applies to
#[derive(Debug, Clone)]
pub struct RouteScope {
    include: Vec<RouteRule>,
    exclude: Vec<RouteRule>,
}

impl RouteScope {
    pub fn new(include: Vec<RouteRule>, exclude: Vec<RouteRule>) -> Result<Self, ScopeError> {
        if include.is_empty() {
            return Err(ScopeError::NoIncludes);
        }
        for rule in include.iter().chain(exclude.iter()) {
            rule.validate()?;
        }
        Ok(Self { include, exclude })
    }

    /// Exclusions win over inclusions
    pub fn applies_to(&self, path: &str) -> bool {
        self.include.iter().any(|r| r.matches(path)) && !self.exclude.iter().any(|r| r.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matches_on_segment_boundary() {
        let rule = RouteRule::Prefix("/assets".to_string());
        assert!(rule.matches("/assets"));
        assert!(rule.matches("/assets/app.css"));
        assert!(!rule.matches("/assetsx"));
        assert!(!rule.matches("/static/assets"));
    }

    #[test]
    fn root_prefix_matches_everything() {
        let rule = RouteRule::Prefix("/".to_string());
        assert!(rule.matches("/"));
        assert!(rule.matches("/api/watchlist"));
    }

    #[test]
    fn rejects_invalid_rules() {
        assert_eq!(
            RouteScope::new(vec![RouteRule::Exact(String::new())], vec![]).unwrap_err(),
            ScopeError::Empty
        );
        assert_eq!(
            RouteScope::new(vec![RouteRule::Prefix("/".into())], vec![RouteRule::Prefix("api".into())])
                .unwrap_err(),
            ScopeError::NotAbsolute("api".into())
        );
        assert_eq!(
            RouteScope::new(vec![RouteRule::Prefix("/api/".into())], vec![]).unwrap_err(),
            ScopeError::TrailingSlash("/api/".into())
        );
        assert_eq!(RouteScope::new(vec![], vec![]).unwrap_err(), ScopeError::NoIncludes);
    }

    #[test]
    fn exclusion_overrides_inclusion() {
        let scope = RouteScope::new(
            vec![RouteRule::Prefix("/api".into())],
            vec![RouteRule::Prefix("/api/auth".into())],
        )
        .unwrap();

        assert!(scope.applies_to("/api/watchlist"));
        assert!(!scope.applies_to("/api/auth/callback"));
        assert!(!scope.applies_to("/dashboard"));
    }
}
