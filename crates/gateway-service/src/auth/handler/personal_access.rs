//! Personal access handler.
//!
//! Allows a FHIR requirement only when the caller is the resource owner and
//! holds a user-audience scope covering the resource and access mode. Used
//! on routes where no form of delegated access is acceptable.

use async_trait::async_trait;

use crate::error::ServiceResult;

use super::super::claims::ClaimsPrincipal;
use super::super::decision::Decision;
use super::super::requirement::Requirement;
use super::super::request::RequestContext;
use super::super::scope::Audience;
use super::AuthorizationHandler;

#[derive(Debug, Default)]
pub struct PersonalAccessHandler;

#[async_trait]
impl AuthorizationHandler for PersonalAccessHandler {
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
            tracing::warn!("Personal access handler has no subject identifier to evaluate");
            return Ok(Decision::Abstain);
        };

        if !principal.is_owner_of(resource_hdid) {
            tracing::debug!(resource = resource_hdid, "Caller is not the resource owner");
            return Ok(Decision::Abstain);
        }

        if principal
            .scopes()
            .allows(Audience::User, fhir.resource, fhir.access)
        {
            return Ok(Decision::Allow);
        }

        tracing::debug!(
            resource = %fhir.resource,
            access = %fhir.access,
            "Owner lacks a covering user scope"
        );
        Ok(Decision::Abstain)
    }

    fn name(&self) -> &'static str {
        "personal_access"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::requirement::FhirRequirement;
    use crate::auth::request::RequestContextBuilder;
    use crate::auth::scope::FhirResource;

    const OWNER: &str = "OWNER_HDID";

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

    #[test_log::test(tokio::test)]
    async fn owner_with_scope_is_allowed() {
        let requirement = Requirement::Fhir(FhirRequirement::read(FhirResource::Patient));
        let decision = PersonalAccessHandler
            .evaluate(
                &principal(OWNER, "user/Patient.read"),
                &requirement,
                &request_for(OWNER),
            )
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Allow);
    }

    #[test_log::test(tokio::test)]
    async fn owner_without_scope_abstains() {
        let requirement = Requirement::Fhir(FhirRequirement::read(FhirResource::Patient));
        let decision = PersonalAccessHandler
            .evaluate(
                &principal(OWNER, "user/Observation.read"),
                &requirement,
                &request_for(OWNER),
            )
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }

    #[test_log::test(tokio::test)]
    async fn system_scope_does_not_count() {
        let requirement = Requirement::Fhir(FhirRequirement::read(FhirResource::Patient));
        let decision = PersonalAccessHandler
            .evaluate(
                &principal(OWNER, "system/Patient.read"),
                &requirement,
                &request_for(OWNER),
            )
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }

    #[test_log::test(tokio::test)]
    async fn non_owner_abstains_even_with_scope() {
        let requirement = Requirement::Fhir(FhirRequirement::read(FhirResource::Patient));
        let decision = PersonalAccessHandler
            .evaluate(
                &principal("SOMEONE_ELSE", "user/*.*"),
                &requirement,
                &request_for(OWNER),
            )
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }
}
