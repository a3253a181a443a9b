//! Declarative authorization requirements.
//!
//! A requirement is built once when a route is registered and reused across
//! requests; handlers evaluate each requirement against the per-request
//! claims principal and request context.

use super::scope::{FhirAccessType, FhirResource};

/// Where the subject identifier is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubjectLookup {
    /// The `hdid` route value.
    #[default]
    RouteValue,
    /// The `hdid` query parameter (route value still wins when present).
    QueryParameter,
}

/// Access requirement on a FHIR resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FhirRequirement {
    pub resource: FhirResource,
    pub access: FhirAccessType,
    pub lookup: SubjectLookup,
    pub supports_system_delegation: bool,
    pub supports_user_delegation: bool,
}

impl FhirRequirement {
    #[must_use]
    pub const fn new(resource: FhirResource, access: FhirAccessType) -> Self {
        Self {
            resource,
            access,
            lookup: SubjectLookup::RouteValue,
            supports_system_delegation: false,
            supports_user_delegation: false,
        }
    }

    #[must_use]
    pub const fn read(resource: FhirResource) -> Self {
        Self::new(resource, FhirAccessType::Read)
    }

    #[must_use]
    pub const fn write(resource: FhirResource) -> Self {
        Self::new(resource, FhirAccessType::Write)
    }

    #[must_use]
    pub const fn with_lookup(mut self, lookup: SubjectLookup) -> Self {
        self.lookup = lookup;
        self
    }

    #[must_use]
    pub const fn allow_system_delegation(mut self) -> Self {
        self.supports_system_delegation = true;
        self
    }

    #[must_use]
    pub const fn allow_user_delegation(mut self) -> Self {
        self.supports_user_delegation = true;
        self
    }
}

/// The requirement kinds the handler family understands.
///
/// Handlers abstain on kinds they do not recognize, so new kinds can be
/// added without touching existing handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Fhir(FhirRequirement),
    /// The caller must be a patient (carry an hdid claim).
    Patient,
    /// The request must present the configured webhook API key.
    ApiKey,
    /// The caller's own hdid must match the route subject.
    AuthenticatedUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_flags_compose() {
        let req = FhirRequirement::read(FhirResource::Observation)
            .allow_system_delegation()
            .allow_user_delegation()
            .with_lookup(SubjectLookup::QueryParameter);

        assert!(req.supports_system_delegation);
        assert!(req.supports_user_delegation);
        assert_eq!(req.lookup, SubjectLookup::QueryParameter);
        assert_eq!(req.access, FhirAccessType::Read);
    }
}
