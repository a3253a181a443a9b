//! Patient demographics lookup.
//!
//! Demographics live in an upstream registry, not in the gateway database.
//! Services consume the registry through the [`PatientRegistry`] trait; the
//! REST client is the production implementation and tests substitute fixed
//! data. The registry also backs the authorization engine's
//! [`PatientLookup`] age checks.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::PatientLookup;
use crate::error::{ServiceError, ServiceResult};
use gateway_core::config::PatientRegistryConfig;

/// Demographics subset the gateway consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDetails {
    pub hdid: String,
    pub given_name: String,
    pub surname: String,
    pub birthdate: chrono::NaiveDate,
}

impl PatientDetails {
    /// Short display identifier: given name plus surname initial.
    #[must_use]
    pub fn short_identifier(&self) -> String {
        match self.surname.chars().next() {
            Some(initial) => format!("{} {initial}", self.given_name),
            None => self.given_name.clone(),
        }
    }
}

#[async_trait]
pub trait PatientRegistry: Send + Sync {
    /// Fetches a patient's demographics, or `None` when the registry has no
    /// record for the hdid.
    async fn details(&self, hdid: &str) -> ServiceResult<Option<PatientDetails>>;
}

#[async_trait]
impl<R: PatientRegistry + ?Sized> PatientRegistry for Arc<R> {
    async fn details(&self, hdid: &str) -> ServiceResult<Option<PatientDetails>> {
        self.as_ref().details(hdid).await
    }
}

/// REST client for the upstream registry.
pub struct RestPatientRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl RestPatientRegistry {
    /// ## Summary
    /// Builds the client from configuration.
    ///
    /// ## Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &PatientRegistryConfig) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PatientRegistry for RestPatientRegistry {
    async fn details(&self, hdid: &str) -> ServiceResult<Option<PatientDetails>> {
        let url = format!("{}/patient/{hdid}", self.base_url);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        Ok(Some(response.json::<PatientDetails>().await?))
    }
}

/// Bridges the registry into the authorization engine's age checks.
pub struct RegistryPatientLookup<R> {
    registry: R,
}

impl<R> RegistryPatientLookup<R> {
    #[must_use]
    pub fn new(registry: R) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl<R: PatientRegistry> PatientLookup for RegistryPatientLookup<R> {
    async fn birthdate(&self, hdid: &str) -> ServiceResult<Option<chrono::NaiveDate>> {
        Ok(self.registry.details(hdid).await?.map(|d| d.birthdate))
    }
}

/// ## Summary
/// Fetches details for a patient that must exist.
///
/// ## Errors
/// Returns `NotFound` when the registry has no record.
pub async fn require_details(
    registry: &dyn PatientRegistry,
    hdid: &str,
) -> ServiceResult<PatientDetails> {
    registry
        .details(hdid)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Patient {hdid} not found in registry")))
}

#[cfg(test)]
pub mod doubles {
    //! In-memory registry double shared by the service tests.

    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::{PatientDetails, PatientRegistry};
    use crate::error::ServiceResult;

    #[derive(Debug, Default)]
    pub struct FixedRegistry {
        patients: HashMap<String, PatientDetails>,
    }

    impl FixedRegistry {
        #[must_use]
        pub fn with(patients: Vec<PatientDetails>) -> Self {
            Self {
                patients: patients.into_iter().map(|p| (p.hdid.clone(), p)).collect(),
            }
        }
    }

    #[async_trait]
    impl PatientRegistry for FixedRegistry {
        async fn details(&self, hdid: &str) -> ServiceResult<Option<PatientDetails>> {
            Ok(self.patients.get(hdid).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::doubles::FixedRegistry;
    use super::*;

    fn pat() -> PatientDetails {
        PatientDetails {
            hdid: "P123".to_string(),
            given_name: "Alex".to_string(),
            surname: "Rivera".to_string(),
            birthdate: chrono::NaiveDate::from_ymd_opt(2015, 3, 2).expect("valid date"),
        }
    }

    #[test]
    fn short_identifier_uses_surname_initial() {
        assert_eq!(pat().short_identifier(), "Alex R");
    }

    #[test_log::test(tokio::test)]
    async fn lookup_bridges_birthdate() {
        let lookup = RegistryPatientLookup::new(FixedRegistry::with(vec![pat()]));
        let birthdate = lookup.birthdate("P123").await.expect("lookup should succeed");
        assert_eq!(
            birthdate,
            Some(chrono::NaiveDate::from_ymd_opt(2015, 3, 2).expect("valid date"))
        );
        assert_eq!(lookup.birthdate("missing").await.expect("lookup should succeed"), None);
    }

    #[test_log::test(tokio::test)]
    async fn require_details_maps_missing_to_not_found() {
        let registry = FixedRegistry::default();
        let err = require_details(&registry, "missing")
            .await
            .expect_err("missing patient should error");
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
