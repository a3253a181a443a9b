//! Request context snapshot.
//!
//! Handlers never touch the HTTP request directly; the middleware captures
//! the pieces authorization needs (route values, query parameters, selected
//! headers) into an immutable snapshot placed in the depot.

use std::collections::HashMap;

use gateway_core::constants::RESOURCE_IDENTIFIER_KEY;

use super::requirement::SubjectLookup;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    route_values: HashMap<String, String>,
    query: HashMap<String, String>,
    /// Header names are stored lowercased.
    headers: HashMap<String, String>,
}

impl RequestContext {
    #[must_use]
    pub fn new(
        route_values: HashMap<String, String>,
        query: HashMap<String, String>,
        headers: HashMap<String, String>,
    ) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        Self {
            route_values,
            query,
            headers,
        }
    }

    /// Resolves the subject identifier for a requirement.
    ///
    /// Route values always win; the query string is consulted only when the
    /// requirement opts into parameter lookup.
    #[must_use]
    pub fn resource_hdid(&self, lookup: SubjectLookup) -> Option<&str> {
        let from_route = self
            .route_values
            .get(RESOURCE_IDENTIFIER_KEY)
            .map(String::as_str);
        match lookup {
            SubjectLookup::RouteValue => from_route,
            SubjectLookup::QueryParameter => from_route.or_else(|| {
                self.query
                    .get(RESOURCE_IDENTIFIER_KEY)
                    .map(String::as_str)
            }),
        }
    }

    #[must_use]
    pub fn route_value(&self, key: &str) -> Option<&str> {
        self.route_values.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Builder used by tests and the middleware.
#[derive(Debug, Default)]
pub struct RequestContextBuilder {
    route_values: HashMap<String, String>,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
}

impl RequestContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn route_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_values.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn query_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn build(self) -> RequestContext {
        RequestContext::new(self.route_values, self.query, self.headers)
    }
}
