//! General-purpose FHIR resource handler.
//!
//! Runs the full access chain for a FHIR requirement: ownership first, then
//! system-delegated scopes, then user delegation. Routes that want only one
//! leg of the chain use the narrower handlers instead.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceResult;

use super::super::claims::ClaimsPrincipal;
use super::super::decision::Decision;
use super::super::requirement::Requirement;
use super::super::request::RequestContext;
use super::super::scope::Audience;
use super::super::store::{PatientLookup, ResourceDelegateStore};
use super::{AuthorizationHandler, user_delegation_active};

pub struct FhirResourceHandler {
    delegates: Arc<dyn ResourceDelegateStore>,
    patients: Arc<dyn PatientLookup>,
    max_dependent_age: Option<u32>,
}

impl FhirResourceHandler {
    #[must_use]
    pub fn new(
        delegates: Arc<dyn ResourceDelegateStore>,
        patients: Arc<dyn PatientLookup>,
        max_dependent_age: Option<u32>,
    ) -> Self {
        Self {
            delegates,
            patients,
            max_dependent_age,
        }
    }
}

#[async_trait]
impl AuthorizationHandler for FhirResourceHandler {
    async fn evaluate(
        &self,
        principal: &ClaimsPrincipal,
        requirement: &Requirement,
        request: &RequestContext,
    ) -> ServiceResult<Decision> {
        let Requirement::Fhir(fhir) = requirement else {
            return Ok(Decision::Abstain);
        };

        let Some(resource_hdid) = request.resource_hdid(fhir.lookup) else {
            tracing::warn!("Fhir resource handler has no subject identifier to evaluate");
            return Ok(Decision::Abstain);
        };

        if principal.is_owner_of(resource_hdid) {
            tracing::debug!(resource = resource_hdid, "Caller owns the resource");
            return Ok(Decision::Allow);
        }

        if fhir.supports_system_delegation
            && principal
                .scopes()
                .allows(Audience::System, fhir.resource, fhir.access)
        {
            tracing::debug!(
                resource = %fhir.resource,
                access = %fhir.access,
                "System-delegated scope grants access"
            );
            return Ok(Decision::Allow);
        }

        if fhir.supports_user_delegation {
            let Some(caller_hdid) = principal.hdid.as_deref() else {
                tracing::warn!("Delegation check skipped: caller has no hdid claim");
                return Ok(Decision::Abstain);
            };
            if user_delegation_active(
                self.delegates.as_ref(),
                self.patients.as_ref(),
                self.max_dependent_age,
                resource_hdid,
                caller_hdid,
            )
            .await?
            {
                tracing::debug!(
                    caller = caller_hdid,
                    resource = resource_hdid,
                    "User delegation grants access"
                );
                return Ok(Decision::Allow);
            }
        }

        Ok(Decision::Abstain)
    }

    fn name(&self) -> &'static str {
        "fhir_resource"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::requirement::FhirRequirement;
    use crate::auth::request::RequestContextBuilder;
    use crate::auth::scope::FhirResource;
    use crate::auth::store::doubles::{FixedDelegates, FixedPatients};
    use chrono::{Datelike, Utc};

    const OWNER: &str = "OWNER_HDID";
    const DELEGATE: &str = "DELEGATE_HDID";

    fn handler_with(
        delegates: FixedDelegates,
        patients: FixedPatients,
        max_age: Option<u32>,
    ) -> FhirResourceHandler {
        FhirResourceHandler::new(Arc::new(delegates), Arc::new(patients), max_age)
    }

    fn principal(hdid: &str, scope: &str) -> ClaimsPrincipal {
        ClaimsPrincipal {
            hdid: Some(hdid.to_string()),
            scope: Some(scope.to_string()),
            ..Default::default()
        }
    }

    fn request_for(hdid: &str) -> RequestContext {
        RequestContextBuilder::new().route_value("hdid", hdid).build()
    }

    fn read_observation() -> Requirement {
        Requirement::Fhir(FhirRequirement::read(FhirResource::Observation))
    }

    fn young_birthdate() -> chrono::NaiveDate {
        let now = Utc::now().date_naive();
        now.with_year(now.year() - 5).expect("valid date")
    }

    #[test_log::test(tokio::test)]
    async fn owner_is_allowed() {
        let handler = handler_with(FixedDelegates::default(), FixedPatients::default(), None);
        let decision = handler
            .evaluate(&principal(OWNER, ""), &read_observation(), &request_for(OWNER))
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Allow);
    }

    #[test_log::test(tokio::test)]
    async fn stranger_abstains() {
        let handler = handler_with(FixedDelegates::default(), FixedPatients::default(), None);
        let decision = handler
            .evaluate(
                &principal("SOMEONE_ELSE", "user/Observation.read"),
                &read_observation(),
                &request_for(OWNER),
            )
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }

    #[test_log::test(tokio::test)]
    async fn missing_subject_abstains() {
        let handler = handler_with(FixedDelegates::default(), FixedPatients::default(), None);
        let decision = handler
            .evaluate(
                &principal(OWNER, ""),
                &read_observation(),
                &RequestContextBuilder::new().build(),
            )
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }

    #[test_log::test(tokio::test)]
    async fn system_scope_requires_opt_in() {
        let handler = handler_with(FixedDelegates::default(), FixedPatients::default(), None);
        let caller = principal("SYSTEM_CLIENT", "system/Observation.read");

        let closed = handler
            .evaluate(&caller, &read_observation(), &request_for(OWNER))
            .await
            .expect("evaluation should succeed");
        assert_eq!(closed, Decision::Abstain);

        let open = Requirement::Fhir(
            FhirRequirement::read(FhirResource::Observation).allow_system_delegation(),
        );
        let allowed = handler
            .evaluate(&caller, &open, &request_for(OWNER))
            .await
            .expect("evaluation should succeed");
        assert_eq!(allowed, Decision::Allow);
    }

    #[test_log::test(tokio::test)]
    async fn system_scope_must_cover_access() {
        let handler = handler_with(FixedDelegates::default(), FixedPatients::default(), None);
        let requirement = Requirement::Fhir(
            FhirRequirement::write(FhirResource::Observation).allow_system_delegation(),
        );
        let decision = handler
            .evaluate(
                &principal("SYSTEM_CLIENT", "system/Observation.read"),
                &requirement,
                &request_for(OWNER),
            )
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }

    #[test_log::test(tokio::test)]
    async fn delegate_is_allowed_when_dependent_is_young() {
        let handler = handler_with(
            FixedDelegates::with(&[(OWNER, DELEGATE)]),
            FixedPatients::with(&[(OWNER, young_birthdate())]),
            Some(12),
        );
        let requirement = Requirement::Fhir(
            FhirRequirement::read(FhirResource::Observation).allow_user_delegation(),
        );
        let decision = handler
            .evaluate(&principal(DELEGATE, ""), &requirement, &request_for(OWNER))
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Allow);
    }

    #[test_log::test(tokio::test)]
    async fn delegate_abstains_once_dependent_ages_out() {
        let now = Utc::now().date_naive();
        let adult = now.with_year(now.year() - 30).expect("valid date");
        let handler = handler_with(
            FixedDelegates::with(&[(OWNER, DELEGATE)]),
            FixedPatients::with(&[(OWNER, adult)]),
            Some(12),
        );
        let requirement = Requirement::Fhir(
            FhirRequirement::read(FhirResource::Observation).allow_user_delegation(),
        );
        let decision = handler
            .evaluate(&principal(DELEGATE, ""), &requirement, &request_for(OWNER))
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }

    #[test_log::test(tokio::test)]
    async fn unknown_birthdate_fails_closed() {
        let handler = handler_with(
            FixedDelegates::with(&[(OWNER, DELEGATE)]),
            FixedPatients::default(),
            Some(12),
        );
        let requirement = Requirement::Fhir(
            FhirRequirement::read(FhirResource::Observation).allow_user_delegation(),
        );
        let decision = handler
            .evaluate(&principal(DELEGATE, ""), &requirement, &request_for(OWNER))
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }

    #[test_log::test(tokio::test)]
    async fn no_max_age_skips_expiry() {
        let handler = handler_with(
            FixedDelegates::with(&[(OWNER, DELEGATE)]),
            FixedPatients::default(),
            None,
        );
        let requirement = Requirement::Fhir(
            FhirRequirement::read(FhirResource::Observation).allow_user_delegation(),
        );
        let decision = handler
            .evaluate(&principal(DELEGATE, ""), &requirement, &request_for(OWNER))
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Allow);
    }

    #[test_log::test(tokio::test)]
    async fn other_requirements_abstain() {
        let handler = handler_with(FixedDelegates::default(), FixedPatients::default(), None);
        let decision = handler
            .evaluate(&principal(OWNER, ""), &Requirement::Patient, &request_for(OWNER))
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }
}
