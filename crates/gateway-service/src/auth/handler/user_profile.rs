//! Authenticated-user handler.
//!
//! Allows the authenticated-user requirement when the caller's own hdid
//! matches the subject named in the route. Guards profile-style routes that
//! admit no delegation of any kind.

use async_trait::async_trait;

use crate::error::ServiceResult;

use super::super::claims::ClaimsPrincipal;
use super::super::decision::Decision;
use super::super::requirement::{Requirement, SubjectLookup};
use super::super::request::RequestContext;
use super::AuthorizationHandler;

#[derive(Debug, Default)]
pub struct UserProfileHandler;

#[async_trait]
impl AuthorizationHandler for UserProfileHandler {
    async fn evaluate(
        &self,
        principal: &ClaimsPrincipal,
        requirement: &Requirement,
        request: &RequestContext,
    ) -> ServiceResult<Decision> {
        if !matches!(requirement, Requirement::AuthenticatedUser) {
            return Ok(Decision::Abstain);
        }

        let Some(resource_hdid) = request.resource_hdid(SubjectLookup::RouteValue) else {
            tracing::warn!("Authenticated-user requirement has no route subject to compare");
            return Ok(Decision::Abstain);
        };

        if principal.is_owner_of(resource_hdid) {
            return Ok(Decision::Allow);
        }

        tracing::warn!(
            resource = resource_hdid,
            "Caller hdid does not match the route subject"
        );
        Ok(Decision::Abstain)
    }

    fn name(&self) -> &'static str {
        "user_profile"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::request::RequestContextBuilder;

    fn principal(hdid: &str) -> ClaimsPrincipal {
        ClaimsPrincipal {
            hdid: Some(hdid.to_string()),
            ..Default::default()
        }
    }

    #[test_log::test(tokio::test)]
    async fn matching_hdid_is_allowed() {
        let request = RequestContextBuilder::new().route_value("hdid", "P123").build();
        let decision = UserProfileHandler
            .evaluate(&principal("P123"), &Requirement::AuthenticatedUser, &request)
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Allow);
    }

    #[test_log::test(tokio::test)]
    async fn mismatched_hdid_abstains() {
        let request = RequestContextBuilder::new().route_value("hdid", "P123").build();
        let decision = UserProfileHandler
            .evaluate(&principal("P456"), &Requirement::AuthenticatedUser, &request)
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }

    #[test_log::test(tokio::test)]
    async fn missing_route_subject_abstains() {
        let request = RequestContextBuilder::new().build();
        let decision = UserProfileHandler
            .evaluate(&principal("P123"), &Requirement::AuthenticatedUser, &request)
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }
}
