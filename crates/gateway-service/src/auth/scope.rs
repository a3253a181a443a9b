//! OAuth scope claim parsing and matching.
//!
//! A scope token has the shape `<audience>/<Resource>.<access>`, e.g.
//! `system/Patient.read` or `user/Observation.write`. The resource and
//! access positions both admit the `*` wildcard. The raw claim is a
//! space-delimited list; malformed tokens are skipped rather than rejected
//! so that one bad grant cannot poison an otherwise valid claim.

use std::fmt;

/// Who the scope was granted to act as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    /// A backend system acting with organization-level delegation.
    System,
    /// An end user acting on their own (or a delegator's) records.
    User,
}

impl Audience {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => gateway_core::constants::scope_prefix::SYSTEM,
            Self::User => gateway_core::constants::scope_prefix::USER,
        }
    }

    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            gateway_core::constants::scope_prefix::SYSTEM => Some(Self::System),
            gateway_core::constants::scope_prefix::USER => Some(Self::User),
            _ => None,
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// FHIR resource kinds the gateway authorizes access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FhirResource {
    Patient,
    Observation,
    Immunization,
    MedicationStatement,
    Encounter,
    ClinicalDocument,
}

impl FhirResource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "Patient",
            Self::Observation => "Observation",
            Self::Immunization => "Immunization",
            Self::MedicationStatement => "MedicationStatement",
            Self::Encounter => "Encounter",
            Self::ClinicalDocument => "ClinicalDocument",
        }
    }

    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "Patient" => Some(Self::Patient),
            "Observation" => Some(Self::Observation),
            "Immunization" => Some(Self::Immunization),
            "MedicationStatement" => Some(Self::MedicationStatement),
            "Encounter" => Some(Self::Encounter),
            "ClinicalDocument" => Some(Self::ClinicalDocument),
            _ => None,
        }
    }
}

impl fmt::Display for FhirResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested access direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FhirAccessType {
    Read,
    Write,
}

impl FhirAccessType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }

    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            _ => None,
        }
    }
}

impl fmt::Display for FhirAccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed scope token. `None` in the resource or access position means
/// the `*` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope {
    pub audience: Audience,
    pub resource: Option<FhirResource>,
    pub access: Option<FhirAccessType>,
}

impl Scope {
    /// Parses a single token. Returns `None` for anything malformed or for
    /// resource names the gateway does not know (those tokens can never
    /// match a requirement, so dropping them is equivalent).
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let (audience, rest) = token.split_once('/')?;
        let audience = Audience::from_str_opt(audience)?;
        let (resource, access) = rest.rsplit_once('.')?;

        let resource = if resource == "*" {
            None
        } else {
            Some(FhirResource::from_str_opt(resource)?)
        };
        let access = if access == "*" {
            None
        } else {
            Some(FhirAccessType::from_str_opt(access)?)
        };

        Some(Self {
            audience,
            resource,
            access,
        })
    }

    /// Whether this grant covers the given resource/access for its audience.
    #[must_use]
    pub fn covers(&self, resource: FhirResource, access: FhirAccessType) -> bool {
        self.resource.is_none_or(|r| r == resource) && self.access.is_none_or(|a| a == access)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resource = self.resource.map_or("*", FhirResource::as_str);
        let access = self.access.map_or("*", FhirAccessType::as_str);
        write!(f, "{}/{resource}.{access}", self.audience)
    }
}

/// The parsed form of a scope claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSet {
    scopes: Vec<Scope>,
}

impl ScopeSet {
    /// Parses a space-delimited scope claim, skipping malformed tokens.
    #[must_use]
    pub fn parse(claim: &str) -> Self {
        let scopes = claim
            .split_whitespace()
            .filter_map(|token| {
                let parsed = Scope::parse(token);
                if parsed.is_none() {
                    tracing::trace!(token, "Skipping unrecognized scope token");
                }
                parsed
            })
            .collect();
        Self { scopes }
    }

    /// Whether any grant for `audience` covers the resource/access pair.
    #[must_use]
    pub fn allows(
        &self,
        audience: Audience,
        resource: FhirResource,
        access: FhirAccessType,
    ) -> bool {
        self.scopes
            .iter()
            .any(|s| s.audience == audience && s.covers(resource, access))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_scope() {
        let scope = Scope::parse("system/Patient.read").expect("should parse");
        assert_eq!(scope.audience, Audience::System);
        assert_eq!(scope.resource, Some(FhirResource::Patient));
        assert_eq!(scope.access, Some(FhirAccessType::Read));
    }

    #[test]
    fn parses_wildcards() {
        let all = Scope::parse("system/*.*").expect("should parse");
        assert!(all.covers(FhirResource::Observation, FhirAccessType::Write));

        let read_any = Scope::parse("user/*.read").expect("should parse");
        assert!(read_any.covers(FhirResource::Patient, FhirAccessType::Read));
        assert!(!read_any.covers(FhirResource::Patient, FhirAccessType::Write));

        let patient_any = Scope::parse("system/Patient.*").expect("should parse");
        assert!(patient_any.covers(FhirResource::Patient, FhirAccessType::Write));
        assert!(!patient_any.covers(FhirResource::Observation, FhirAccessType::Read));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(Scope::parse("").is_none());
        assert!(Scope::parse("system").is_none());
        assert!(Scope::parse("system/Patient").is_none());
        assert!(Scope::parse("admin/Patient.read").is_none());
        assert!(Scope::parse("system/Unknown.read").is_none());
        assert!(Scope::parse("system/Patient.admin").is_none());
    }

    #[test]
    fn claim_parsing_skips_bad_tokens() {
        let set = ScopeSet::parse("openid profile system/Patient.read junk/x.y");
        assert_eq!(set.len(), 1);
        assert!(set.allows(Audience::System, FhirResource::Patient, FhirAccessType::Read));
        assert!(!set.allows(Audience::User, FhirResource::Patient, FhirAccessType::Read));
    }

    #[test]
    fn empty_claim_allows_nothing() {
        let set = ScopeSet::parse("");
        assert!(set.is_empty());
        assert!(!set.allows(Audience::System, FhirResource::Patient, FhirAccessType::Read));
    }

    #[test]
    fn audience_is_not_interchangeable() {
        let set = ScopeSet::parse("user/Observation.read");
        assert!(set.allows(Audience::User, FhirResource::Observation, FhirAccessType::Read));
        assert!(!set.allows(Audience::System, FhirResource::Observation, FhirAccessType::Read));
    }
}
