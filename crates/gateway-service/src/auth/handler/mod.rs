//! The authorization handler family.
//!
//! Each handler understands one requirement kind (or one access mode of the
//! FHIR requirement) and abstains on everything else, so the composite
//! policy can run the whole family against every requirement. Handlers never
//! fail evaluation for unmatched input; errors surface only for genuine
//! infrastructure faults (store lookups).

use async_trait::async_trait;

use crate::error::ServiceResult;

use super::claims::ClaimsPrincipal;
use super::decision::Decision;
use super::requirement::Requirement;
use super::request::RequestContext;
use super::store::{PatientLookup, ResourceDelegateStore};

pub mod api_key;
pub mod fhir_resource;
pub mod patient;
pub mod personal_access;
pub mod system_delegated;
pub mod user_delegated;
pub mod user_profile;

pub use api_key::ApiKeyHandler;
pub use fhir_resource::FhirResourceHandler;
pub use patient::PatientHandler;
pub use personal_access::PersonalAccessHandler;
pub use system_delegated::SystemDelegatedAccessHandler;
pub use user_delegated::UserDelegatedAccessHandler;
pub use user_profile::UserProfileHandler;

#[async_trait]
pub trait AuthorizationHandler: Send + Sync {
    /// Evaluates one requirement against the request.
    ///
    /// ## Errors
    /// Returns an error only for infrastructure faults (store lookups);
    /// unmatched or unresolvable input abstains instead.
    async fn evaluate(
        &self,
        principal: &ClaimsPrincipal,
        requirement: &Requirement,
        request: &RequestContext,
    ) -> ServiceResult<Decision>;

    /// Stable name used in tracing output.
    fn name(&self) -> &'static str;
}

/// Whether a dependent delegation has aged out.
///
/// A delegation expires as soon as the resource owner reaches the configured
/// maximum dependent age: the cutoff birthday itself is already expired
/// (year granularity, wall clock).
#[must_use]
pub(crate) fn dependent_expired(
    birthdate: chrono::NaiveDate,
    max_dependent_age: u32,
    today: chrono::NaiveDate,
) -> bool {
    birthdate
        .checked_add_months(chrono::Months::new(max_dependent_age * 12))
        .is_some_and(|cutoff| cutoff <= today)
}

/// Shared user-delegation check: an active relationship must exist and, when
/// an age cut-off is configured, the resource owner must still be under it.
///
/// A missing birthdate is treated as expired: with no evidence the owner is
/// still a dependent, the handler abstains.
pub(crate) async fn user_delegation_active(
    delegates: &dyn ResourceDelegateStore,
    patients: &dyn PatientLookup,
    max_dependent_age: Option<u32>,
    resource_hdid: &str,
    caller_hdid: &str,
) -> ServiceResult<bool> {
    if !delegates.exists(resource_hdid, caller_hdid).await? {
        tracing::warn!(
            caller = caller_hdid,
            resource = resource_hdid,
            "Delegation validation failed: no relationship on record"
        );
        return Ok(false);
    }

    let Some(max_age) = max_dependent_age else {
        tracing::info!(
            resource = resource_hdid,
            "Delegation expiry check skipped: no maximum dependent age configured"
        );
        return Ok(true);
    };

    let Some(birthdate) = patients.birthdate(resource_hdid).await? else {
        tracing::error!(
            resource = resource_hdid,
            "Delegation expiry check failed: patient registry has no birthdate"
        );
        return Ok(false);
    };

    let today = chrono::Utc::now().date_naive();
    if dependent_expired(birthdate, max_age, today) {
        tracing::error!(
            resource = resource_hdid,
            "Delegation rejected: resource owner has aged out"
        );
        return Ok(false);
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn expiry_is_year_granular() {
        let birthdate = date(2012, 6, 15);

        // Twelfth birthday is 2024-06-15; still a dependent the day before.
        assert!(!dependent_expired(birthdate, 12, date(2024, 6, 14)));
        // The delegation expires on the birthday itself.
        assert!(dependent_expired(birthdate, 12, date(2024, 6, 15)));
        assert!(dependent_expired(birthdate, 12, date(2024, 6, 16)));
    }

    #[test]
    fn newborn_never_expired() {
        let today = date(2026, 8, 23);
        assert!(!dependent_expired(date(2026, 8, 1), 12, today));
    }
}
