//! The static route table.

use serde::{Deserialize, Serialize};

use crate::parser::Method;

/// A servable (method, path) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub method: Method,
    pub path: String,
}

impl RouteEntry {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into() }
    }
}

/// The set of routes a request must match before it reaches a handler.
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteEntry>) -> Self {
        Self { routes }
    }

    /// The routes served out of the box: `GET /` and `GET /socket`.
    pub fn default_routes() -> Vec<RouteEntry> {
        vec![
            RouteEntry::new(Method::GET, "/"),
            RouteEntry::new(Method::GET, "/socket"),
        ]
    }

    /// True iff some entry has exactly this method and path.
    ///
    /// Comparison is case-sensitive with no normalization of trailing
    /// slashes, query strings or wildcards.
    pub fn verify(&self, method: Method, path: &str) -> bool {
        self.routes
            .iter()
            .any(|route| route.method == method && route.path == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(Self::default_routes())
    }
}
