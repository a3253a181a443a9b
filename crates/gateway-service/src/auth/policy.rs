//! Composite authorization policy.
//!
//! Runs every registered handler against each requirement and folds the
//! three-valued decisions: any deny vetoes the requirement, otherwise any
//! allow satisfies it, and a requirement nobody allowed is denied. A request
//! passes only when all of its requirements pass.

use std::sync::Arc;

use gateway_core::config::Settings;

use crate::error::{ServiceError, ServiceResult};

use super::claims::ClaimsPrincipal;
use super::decision::Decision;
use super::handler::{
    ApiKeyHandler, AuthorizationHandler, FhirResourceHandler, PatientHandler,
    PersonalAccessHandler, SystemDelegatedAccessHandler, UserDelegatedAccessHandler,
    UserProfileHandler,
};
use super::requirement::Requirement;
use super::request::RequestContext;
use super::store::{PatientLookup, ResourceDelegateStore};

/// Outcome of evaluating a full requirement set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthzResult {
    Allowed,
    Denied,
}

impl AuthzResult {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Converts a denial into an authorization error.
    ///
    /// ## Errors
    /// Returns `ServiceError::AuthorizationError` when the result is denied.
    pub fn require(self, action: &str) -> ServiceResult<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied => Err(ServiceError::AuthorizationError(format!(
                "not authorized to {action}"
            ))),
        }
    }
}

pub struct AuthorizationService {
    handlers: Vec<Arc<dyn AuthorizationHandler>>,
}

impl AuthorizationService {
    #[must_use]
    pub fn new(handlers: Vec<Arc<dyn AuthorizationHandler>>) -> Self {
        Self { handlers }
    }

    /// Builds the service with the full handler family wired from settings.
    #[must_use]
    pub fn from_settings(
        settings: &Settings,
        delegates: Arc<dyn ResourceDelegateStore>,
        patients: Arc<dyn PatientLookup>,
    ) -> Self {
        let max_age = settings.authorization.max_dependent_age;
        Self::new(vec![
            Arc::new(FhirResourceHandler::new(
                Arc::clone(&delegates),
                Arc::clone(&patients),
                max_age,
            )),
            Arc::new(PersonalAccessHandler),
            Arc::new(SystemDelegatedAccessHandler),
            Arc::new(UserDelegatedAccessHandler::new(delegates, patients, max_age)),
            Arc::new(PatientHandler),
            Arc::new(UserProfileHandler),
            Arc::new(ApiKeyHandler::new(settings.webhook_api.clone())),
        ])
    }

    /// Folds the handler family's decisions for a single requirement.
    ///
    /// ## Errors
    /// Propagates infrastructure faults from handler evaluation.
    pub async fn evaluate(
        &self,
        principal: &ClaimsPrincipal,
        requirement: &Requirement,
        request: &RequestContext,
    ) -> ServiceResult<Decision> {
        let mut outcome = Decision::Abstain;
        for handler in &self.handlers {
            let decision = handler.evaluate(principal, requirement, request).await?;
            tracing::debug!(handler = handler.name(), decision = %decision, "Handler evaluated");
            match decision {
                Decision::Deny => return Ok(Decision::Deny),
                Decision::Allow => outcome = Decision::Allow,
                Decision::Abstain => {}
            }
        }
        Ok(outcome)
    }

    /// Evaluates all requirements; every one must come out allowed.
    ///
    /// ## Errors
    /// Propagates infrastructure faults from handler evaluation.
    pub async fn check(
        &self,
        principal: &ClaimsPrincipal,
        requirements: &[Requirement],
        request: &RequestContext,
    ) -> ServiceResult<AuthzResult> {
        for requirement in requirements {
            match self.evaluate(principal, requirement, request).await? {
                Decision::Allow => {}
                decision => {
                    tracing::info!(
                        requirement = ?requirement,
                        decision = %decision,
                        "Authorization denied"
                    );
                    return Ok(AuthzResult::Denied);
                }
            }
        }
        Ok(AuthzResult::Allowed)
    }

    /// Like [`check`](Self::check) but converts a denial into an error.
    ///
    /// ## Errors
    /// Returns `ServiceError::AuthorizationError` on denial and propagates
    /// infrastructure faults.
    pub async fn require(
        &self,
        principal: &ClaimsPrincipal,
        requirements: &[Requirement],
        request: &RequestContext,
        action: &str,
    ) -> ServiceResult<()> {
        self.check(principal, requirements, request)
            .await?
            .require(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::requirement::FhirRequirement;
    use crate::auth::request::RequestContextBuilder;
    use crate::auth::scope::FhirResource;
    use crate::auth::store::doubles::{FixedDelegates, FixedPatients};
    use gateway_core::config::WebhookApiConfig;

    const OWNER: &str = "OWNER_HDID";

    fn service() -> AuthorizationService {
        AuthorizationService::new(vec![
            Arc::new(FhirResourceHandler::new(
                Arc::new(FixedDelegates::default()),
                Arc::new(FixedPatients::default()),
                None,
            )),
            Arc::new(PersonalAccessHandler),
            Arc::new(SystemDelegatedAccessHandler),
            Arc::new(PatientHandler),
            Arc::new(UserProfileHandler),
            Arc::new(ApiKeyHandler::new(Some(WebhookApiConfig {
                header_name: "x-gateway-api-key".to_string(),
                api_key: "sekrit".to_string(),
            }))),
        ])
    }

    fn owner_principal() -> ClaimsPrincipal {
        ClaimsPrincipal {
            hdid: Some(OWNER.to_string()),
            scope: Some("user/*.*".to_string()),
            ..Default::default()
        }
    }

    #[test_log::test(tokio::test)]
    async fn all_abstain_is_denied() {
        let result = service()
            .check(
                &ClaimsPrincipal::default(),
                &[Requirement::Fhir(FhirRequirement::read(FhirResource::Patient))],
                &RequestContextBuilder::new().route_value("hdid", OWNER).build(),
            )
            .await
            .expect("check should succeed");
        assert_eq!(result, AuthzResult::Denied);
    }

    #[test_log::test(tokio::test)]
    async fn one_allow_passes() {
        let result = service()
            .check(
                &owner_principal(),
                &[Requirement::Fhir(FhirRequirement::read(FhirResource::Patient))],
                &RequestContextBuilder::new().route_value("hdid", OWNER).build(),
            )
            .await
            .expect("check should succeed");
        assert_eq!(result, AuthzResult::Allowed);
    }

    #[test_log::test(tokio::test)]
    async fn deny_vetoes_allow() {
        // The owner would be allowed on the FHIR leg, but a forged API key
        // on the same request denies outright.
        let request = RequestContextBuilder::new()
            .route_value("hdid", OWNER)
            .header("x-gateway-api-key", "forged")
            .build();
        let decision = service()
            .evaluate(&owner_principal(), &Requirement::ApiKey, &request)
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Deny);

        let result = service()
            .check(
                &owner_principal(),
                &[
                    Requirement::Fhir(FhirRequirement::read(FhirResource::Patient)),
                    Requirement::ApiKey,
                ],
                &request,
            )
            .await
            .expect("check should succeed");
        assert_eq!(result, AuthzResult::Denied);
    }

    #[test_log::test(tokio::test)]
    async fn every_requirement_must_pass() {
        // Owner passes the FHIR requirement but the patient requirement
        // fails for a principal without an hdid claim.
        let principal = ClaimsPrincipal {
            hdid: None,
            scope: Some("system/*.*".to_string()),
            ..Default::default()
        };
        let requirement = Requirement::Fhir(
            FhirRequirement::read(FhirResource::Patient).allow_system_delegation(),
        );
        let request = RequestContextBuilder::new().route_value("hdid", OWNER).build();

        let alone = service()
            .check(&principal, &[requirement], &request)
            .await
            .expect("check should succeed");
        assert_eq!(alone, AuthzResult::Allowed);

        let combined = service()
            .check(&principal, &[requirement, Requirement::Patient], &request)
            .await
            .expect("check should succeed");
        assert_eq!(combined, AuthzResult::Denied);
    }

    #[test_log::test(tokio::test)]
    async fn require_surfaces_denial_as_error() {
        let err = service()
            .require(
                &ClaimsPrincipal::default(),
                &[Requirement::Patient],
                &RequestContextBuilder::new().build(),
                "read patient records",
            )
            .await
            .expect_err("denial should surface as an error");
        assert!(matches!(err, ServiceError::AuthorizationError(_)));
    }
}
