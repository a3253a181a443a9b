//! Claims principal.
//!
//! The authenticated identity for one request, built by the authentication
//! middleware from verified bearer-token claims and immutable afterwards.

use super::scope::ScopeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimsPrincipal {
    /// Health Directive ID — the subject's unique identifier.
    pub hdid: Option<String>,
    /// Raw space-delimited OAuth scope claim.
    pub scope: Option<String>,
    pub name: Option<String>,
    pub subject: Option<String>,
}

impl ClaimsPrincipal {
    /// Parses the scope claim. A missing claim parses to the empty set,
    /// which allows nothing.
    #[must_use]
    pub fn scopes(&self) -> ScopeSet {
        ScopeSet::parse(self.scope.as_deref().unwrap_or(""))
    }

    /// Whether this principal is the owner of the given resource.
    #[must_use]
    pub fn is_owner_of(&self, resource_hdid: &str) -> bool {
        self.hdid.as_deref() == Some(resource_hdid)
    }
}
