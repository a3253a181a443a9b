//! User-delegated access handler.
//!
//! Allows a FHIR requirement for a caller acting on another user's records
//! under an explicit delegation: the requirement must opt into user
//! delegation, the caller must hold a covering user-audience scope, an
//! active delegate relationship must exist, and when a maximum dependent
//! age is configured the resource owner must still be under it.

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

pub struct UserDelegatedAccessHandler {
    delegates: Arc<dyn ResourceDelegateStore>,
    patients: Arc<dyn PatientLookup>,
    max_dependent_age: Option<u32>,
}

impl UserDelegatedAccessHandler {
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
impl AuthorizationHandler for UserDelegatedAccessHandler {
    async fn evaluate(
        &self,
        principal: &ClaimsPrincipal,
        requirement: &Requirement,
        request: &RequestContext,
    ) -> ServiceResult<Decision> {
        let Requirement::Fhir(fhir) = requirement else {
            return Ok(Decision::Abstain);
        };
        if !fhir.supports_user_delegation {
            return Ok(Decision::Abstain);
        }

        let Some(resource_hdid) = request.resource_hdid(fhir.lookup) else {
            tracing::warn!("User delegation handler has no subject identifier to evaluate");
            return Ok(Decision::Abstain);
        };
        let Some(caller_hdid) = principal.hdid.as_deref() else {
            tracing::warn!("User delegation handler requires an hdid claim");
            return Ok(Decision::Abstain);
        };

        if !principal
            .scopes()
            .allows(Audience::User, fhir.resource, fhir.access)
        {
            tracing::debug!(
                caller = caller_hdid,
                resource = %fhir.resource,
                access = %fhir.access,
                "Caller lacks a covering user scope for delegated access"
            );
            return Ok(Decision::Abstain);
        }

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
                "Delegated access granted"
            );
            return Ok(Decision::Allow);
        }

        Ok(Decision::Abstain)
    }

    fn name(&self) -> &'static str {
        "user_delegated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::requirement::FhirRequirement;
    use crate::auth::request::{RequestContext, RequestContextBuilder};
    use crate::auth::scope::FhirResource;
    use crate::auth::store::doubles::{FixedDelegates, FixedPatients};
    use chrono::{Datelike, Utc};

    const OWNER: &str = "DEPENDENT_HDID";
    const GUARDIAN: &str = "GUARDIAN_HDID";

    fn requirement() -> Requirement {
        Requirement::Fhir(
            FhirRequirement::read(FhirResource::Immunization).allow_user_delegation(),
        )
    }

    fn guardian(scope: &str) -> ClaimsPrincipal {
        ClaimsPrincipal {
            hdid: Some(GUARDIAN.to_string()),
            scope: Some(scope.to_string()),
            ..Default::default()
        }
    }

    fn request() -> RequestContext {
        RequestContextBuilder::new().route_value("hdid", OWNER).build()
    }

    fn years_ago(years: i32) -> chrono::NaiveDate {
        let now = Utc::now().date_naive();
        now.with_year(now.year() - years).expect("valid date")
    }

    fn handler(delegates: FixedDelegates, patients: FixedPatients) -> UserDelegatedAccessHandler {
        UserDelegatedAccessHandler::new(Arc::new(delegates), Arc::new(patients), Some(12))
    }

    #[test_log::test(tokio::test)]
    async fn active_delegation_is_allowed() {
        let handler = handler(
            FixedDelegates::with(&[(OWNER, GUARDIAN)]),
            FixedPatients::with(&[(OWNER, years_ago(8))]),
        );
        let decision = handler
            .evaluate(&guardian("user/Immunization.read"), &requirement(), &request())
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Allow);
    }

    #[test_log::test(tokio::test)]
    async fn missing_relationship_abstains() {
        let handler = handler(
            FixedDelegates::default(),
            FixedPatients::with(&[(OWNER, years_ago(8))]),
        );
        let decision = handler
            .evaluate(&guardian("user/Immunization.read"), &requirement(), &request())
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }

    #[test_log::test(tokio::test)]
    async fn missing_user_scope_abstains() {
        let handler = handler(
            FixedDelegates::with(&[(OWNER, GUARDIAN)]),
            FixedPatients::with(&[(OWNER, years_ago(8))]),
        );
        let decision = handler
            .evaluate(&guardian("system/Immunization.read"), &requirement(), &request())
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }

    #[test_log::test(tokio::test)]
    async fn aged_out_dependent_abstains() {
        let handler = handler(
            FixedDelegates::with(&[(OWNER, GUARDIAN)]),
            FixedPatients::with(&[(OWNER, years_ago(16))]),
        );
        let decision = handler
            .evaluate(&guardian("user/Immunization.read"), &requirement(), &request())
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }
}
