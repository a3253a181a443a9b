//! System-delegated access handler.
//!
//! Allows a FHIR requirement for backend clients holding a system-audience
//! scope that covers the resource and access mode. Only requirements that
//! opt into system delegation are considered; ownership is irrelevant here.

use async_trait::async_trait;

use crate::error::ServiceResult;

use super::super::claims::ClaimsPrincipal;
use super::super::decision::Decision;
use super::super::requirement::Requirement;
use super::super::request::RequestContext;
use super::super::scope::Audience;
use super::AuthorizationHandler;

#[derive(Debug, Default)]
pub struct SystemDelegatedAccessHandler;

#[async_trait]
impl AuthorizationHandler for SystemDelegatedAccessHandler {
    async fn evaluate(
        &self,
        principal: &ClaimsPrincipal,
        requirement: &Requirement,
        _request: &RequestContext,
    ) -> ServiceResult<Decision> {
        let Requirement::Fhir(fhir) = requirement else {
            return Ok(Decision::Abstain);
        };
        if !fhir.supports_system_delegation {
            return Ok(Decision::Abstain);
        }

        if principal
            .scopes()
            .allows(Audience::System, fhir.resource, fhir.access)
        {
            tracing::debug!(
                resource = %fhir.resource,
                access = %fhir.access,
                "System scope grants delegated access"
            );
            return Ok(Decision::Allow);
        }

        Ok(Decision::Abstain)
    }

    fn name(&self) -> &'static str {
        "system_delegated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::requirement::FhirRequirement;
    use crate::auth::request::RequestContextBuilder;
    use crate::auth::scope::FhirResource;

    fn principal(scope: &str) -> ClaimsPrincipal {
        ClaimsPrincipal {
            scope: Some(scope.to_string()),
            ..Default::default()
        }
    }

    #[test_log::test(tokio::test)]
    async fn covering_system_scope_is_allowed() {
        let requirement = Requirement::Fhir(
            FhirRequirement::read(FhirResource::Immunization).allow_system_delegation(),
        );
        let decision = SystemDelegatedAccessHandler
            .evaluate(
                &principal("system/*.read"),
                &requirement,
                &RequestContextBuilder::new().build(),
            )
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Allow);
    }

    #[test_log::test(tokio::test)]
    async fn requirement_without_opt_in_abstains() {
        let requirement = Requirement::Fhir(FhirRequirement::read(FhirResource::Immunization));
        let decision = SystemDelegatedAccessHandler
            .evaluate(
                &principal("system/*.*"),
                &requirement,
                &RequestContextBuilder::new().build(),
            )
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }

    #[test_log::test(tokio::test)]
    async fn user_scope_does_not_count() {
        let requirement = Requirement::Fhir(
            FhirRequirement::read(FhirResource::Immunization).allow_system_delegation(),
        );
        let decision = SystemDelegatedAccessHandler
            .evaluate(
                &principal("user/Immunization.read"),
                &requirement,
                &RequestContextBuilder::new().build(),
            )
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }
}
