//! Patient handler.
//!
//! Allows the patient requirement when the caller carries an hdid claim,
//! i.e. the token belongs to a registered patient rather than a pure
//! service client.

use async_trait::async_trait;

use crate::error::ServiceResult;

use super::super::claims::ClaimsPrincipal;
use super::super::decision::Decision;
use super::super::requirement::Requirement;
use super::super::request::RequestContext;
use super::AuthorizationHandler;

#[derive(Debug, Default)]
pub struct PatientHandler;

#[async_trait]
impl AuthorizationHandler for PatientHandler {
    async fn evaluate(
        &self,
        principal: &ClaimsPrincipal,
        requirement: &Requirement,
        _request: &RequestContext,
    ) -> ServiceResult<Decision> {
        if !matches!(requirement, Requirement::Patient) {
            return Ok(Decision::Abstain);
        }

        if principal.hdid.is_some() {
            return Ok(Decision::Allow);
        }

        tracing::warn!("Patient requirement not met: token carries no hdid claim");
        Ok(Decision::Abstain)
    }

    fn name(&self) -> &'static str {
        "patient"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::request::RequestContextBuilder;

    #[test_log::test(tokio::test)]
    async fn hdid_claim_is_allowed() {
        let principal = ClaimsPrincipal {
            hdid: Some("P123".to_string()),
            ..Default::default()
        };
        let decision = PatientHandler
            .evaluate(
                &principal,
                &Requirement::Patient,
                &RequestContextBuilder::new().build(),
            )
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Allow);
    }

    #[test_log::test(tokio::test)]
    async fn missing_hdid_abstains() {
        let decision = PatientHandler
            .evaluate(
                &ClaimsPrincipal::default(),
                &Requirement::Patient,
                &RequestContextBuilder::new().build(),
            )
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }
}
