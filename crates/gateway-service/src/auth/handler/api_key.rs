//! Webhook API-key handler.
//!
//! Guards the webhook surface with a shared secret carried in a request
//! header. This is the only handler that ever denies: a request presenting
//! the header with the wrong value is an active forgery attempt and must be
//! rejected even if some other handler would allow it. A missing header
//! merely abstains and falls to the default deny.

use async_trait::async_trait;

use crate::error::ServiceResult;
use gateway_core::config::WebhookApiConfig;

use super::super::claims::ClaimsPrincipal;
use super::super::decision::Decision;
use super::super::requirement::Requirement;
use super::super::request::RequestContext;
use super::AuthorizationHandler;

pub struct ApiKeyHandler {
    config: Option<WebhookApiConfig>,
}

impl ApiKeyHandler {
    #[must_use]
    pub fn new(config: Option<WebhookApiConfig>) -> Self {
        Self { config }
    }
}

/// Byte-for-byte comparison without early exit.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[async_trait]
impl AuthorizationHandler for ApiKeyHandler {
    async fn evaluate(
        &self,
        _principal: &ClaimsPrincipal,
        requirement: &Requirement,
        request: &RequestContext,
    ) -> ServiceResult<Decision> {
        if !matches!(requirement, Requirement::ApiKey) {
            return Ok(Decision::Abstain);
        }

        let Some(config) = &self.config else {
            tracing::error!("Webhook API key requested but none is configured");
            return Ok(Decision::Abstain);
        };

        let Some(presented) = request.header(&config.header_name) else {
            tracing::warn!(header = %config.header_name, "Webhook request without API key header");
            return Ok(Decision::Abstain);
        };

        if constant_time_eq(presented.as_bytes(), config.api_key.as_bytes()) {
            Ok(Decision::Allow)
        } else {
            tracing::warn!(header = %config.header_name, "Webhook request with invalid API key");
            Ok(Decision::Deny)
        }
    }

    fn name(&self) -> &'static str {
        "api_key"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::request::RequestContextBuilder;

    fn handler() -> ApiKeyHandler {
        ApiKeyHandler::new(Some(WebhookApiConfig {
            header_name: "x-gateway-api-key".to_string(),
            api_key: "sekrit".to_string(),
        }))
    }

    #[test_log::test(tokio::test)]
    async fn correct_key_is_allowed() {
        let request = RequestContextBuilder::new()
            .header("X-Gateway-Api-Key", "sekrit")
            .build();
        let decision = handler()
            .evaluate(&ClaimsPrincipal::default(), &Requirement::ApiKey, &request)
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Allow);
    }

    #[test_log::test(tokio::test)]
    async fn wrong_key_is_denied() {
        let request = RequestContextBuilder::new()
            .header("x-gateway-api-key", "wrong")
            .build();
        let decision = handler()
            .evaluate(&ClaimsPrincipal::default(), &Requirement::ApiKey, &request)
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Deny);
    }

    #[test_log::test(tokio::test)]
    async fn missing_header_abstains() {
        let request = RequestContextBuilder::new().build();
        let decision = handler()
            .evaluate(&ClaimsPrincipal::default(), &Requirement::ApiKey, &request)
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }

    #[test_log::test(tokio::test)]
    async fn unconfigured_key_abstains() {
        let request = RequestContextBuilder::new()
            .header("x-gateway-api-key", "sekrit")
            .build();
        let decision = ApiKeyHandler::new(None)
            .evaluate(&ClaimsPrincipal::default(), &Requirement::ApiKey, &request)
            .await
            .expect("evaluation should succeed");
        assert_eq!(decision, Decision::Abstain);
    }
}
