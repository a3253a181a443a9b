//! Dependent management.
//!
//! A guardian registers a dependent by proving they know the dependent's
//! identity: the submitted name and birthdate must match the patient
//! registry record, and the dependent must be under the configured maximum
//! age. A successful registration is a delegate relationship with the
//! guardian reason code, which is exactly what the authorization engine's
//! delegation checks consume.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};
use crate::patient::{PatientDetails, PatientRegistry};
use gateway_core::config::Settings;
use gateway_db::db::DbProvider;
use gateway_db::db::query::resource_delegate;
use gateway_db::model::resource_delegate::{NewResourceDelegate, REASON_GUARDIAN, ResourceDelegate};

#[derive(Debug, Clone, Deserialize)]
pub struct AddDependentRequest {
    pub dependent_hdid: String,
    pub given_name: String,
    pub surname: String,
    pub birthdate: chrono::NaiveDate,
}

pub struct DependentService {
    provider: Arc<dyn DbProvider>,
    registry: Arc<dyn PatientRegistry>,
    max_dependent_age: Option<u32>,
}

impl DependentService {
    #[must_use]
    pub fn from_settings(
        settings: &Settings,
        provider: Arc<dyn DbProvider>,
        registry: Arc<dyn PatientRegistry>,
    ) -> Self {
        Self {
            provider,
            registry,
            max_dependent_age: settings.authorization.max_dependent_age,
        }
    }

    /// ## Summary
    /// Registers a dependent under a guardian after verifying the submitted
    /// identity against the patient registry and the age ceiling.
    ///
    /// ## Errors
    /// Returns a validation error when the identity does not match or the
    /// dependent is over the ceiling, `NotFound` when the registry has no
    /// record, and database errors otherwise.
    pub async fn add_dependent(
        &self,
        guardian_hdid: &str,
        request: &AddDependentRequest,
    ) -> ServiceResult<ResourceDelegate> {
        if request.dependent_hdid == guardian_hdid {
            return Err(ServiceError::ValidationError(
                "Cannot register yourself as a dependent".to_string(),
            ));
        }

        let Some(details) = self.registry.details(&request.dependent_hdid).await? else {
            // Do not reveal whether the hdid exists; the caller failed to
            // prove the identity either way.
            return Err(identity_mismatch());
        };
        if !identity_matches(request, &details) {
            tracing::info!(
                guardian = guardian_hdid,
                "Dependent registration refused: identity fields do not match"
            );
            return Err(identity_mismatch());
        }

        if let Some(max_age) = self.max_dependent_age {
            let today = chrono::Utc::now().date_naive();
            if !is_under(details.birthdate, max_age, today) {
                return Err(ServiceError::ValidationError(format!(
                    "Dependent must be under {max_age} years of age"
                )));
            }
        }

        let mut conn = self.provider.get_connection().await?;
        let row = resource_delegate::insert(
            &mut conn,
            &NewResourceDelegate {
                resource_owner_hdid: &request.dependent_hdid,
                profile_hdid: guardian_hdid,
                reason_code: REASON_GUARDIAN,
                expiry_date: None,
            },
        )
        .await?;
        tracing::info!(
            guardian = guardian_hdid,
            dependent = %request.dependent_hdid,
            "Dependent registered"
        );
        Ok(row)
    }

    /// ## Summary
    /// Lists the guardian's dependents.
    ///
    /// ## Errors
    /// Returns database errors.
    pub async fn list_dependents(&self, guardian_hdid: &str) -> ServiceResult<Vec<ResourceDelegate>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(
            resource_delegate::list_for_delegate(&mut conn, guardian_hdid, Some(REASON_GUARDIAN))
                .await?,
        )
    }

    /// ## Summary
    /// Removes a dependent relationship.
    ///
    /// ## Errors
    /// Returns `NotFound` when no relationship exists, or database errors.
    pub async fn remove_dependent(
        &self,
        guardian_hdid: &str,
        dependent_hdid: &str,
    ) -> ServiceResult<()> {
        let mut conn = self.provider.get_connection().await?;
        if resource_delegate::remove(&mut conn, dependent_hdid, guardian_hdid).await? == 0 {
            return Err(ServiceError::NotFound(format!(
                "No dependent relationship with {dependent_hdid}"
            )));
        }
        tracing::info!(
            guardian = guardian_hdid,
            dependent = dependent_hdid,
            "Dependent removed"
        );
        Ok(())
    }
}

fn identity_mismatch() -> ServiceError {
    ServiceError::ValidationError("Dependent identity could not be verified".to_string())
}

fn identity_matches(request: &AddDependentRequest, details: &PatientDetails) -> bool {
    request.given_name.eq_ignore_ascii_case(&details.given_name)
        && request.surname.eq_ignore_ascii_case(&details.surname)
        && request.birthdate == details.birthdate
}

// Someone who turned max_age today is no longer under it.
fn is_under(birthdate: chrono::NaiveDate, max_age: u32, today: chrono::NaiveDate) -> bool {
    birthdate
        .checked_add_months(chrono::Months::new(max_age * 12))
        .is_none_or(|threshold| threshold > today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::doubles::FixedRegistry;
    use chrono::{Datelike, Utc};
    use gateway_db::db::connection::DbConnection;
    use gateway_db::error::DbResult;

    fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn request() -> AddDependentRequest {
        AddDependentRequest {
            dependent_hdid: "DEP".to_string(),
            given_name: "Sam".to_string(),
            surname: "Chen".to_string(),
            birthdate: date(2020, 1, 1),
        }
    }

    fn details() -> PatientDetails {
        PatientDetails {
            hdid: "DEP".to_string(),
            given_name: "Sam".to_string(),
            surname: "Chen".to_string(),
            birthdate: date(2020, 1, 1),
        }
    }

    /// Provider double that fails if the service reaches the database; used
    /// to assert validation short-circuits before any insert.
    struct NoDb;

    impl gateway_db::db::DbProvider for NoDb {
        fn get_connection<'a>(
            &'a self,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = DbResult<DbConnection<'a>>> + Send + 'a>,
        > {
            Box::pin(async {
                Err(gateway_db::error::DbError::NotFound(
                    "this test must not reach the database".to_string(),
                ))
            })
        }
    }

    fn service(registry: FixedRegistry, max_age: Option<u32>) -> DependentService {
        DependentService {
            provider: Arc::new(NoDb),
            registry: Arc::new(registry),
            max_dependent_age: max_age,
        }
    }

    #[test]
    fn identity_matching_is_case_insensitive() {
        let mut req = request();
        req.given_name = "sAm".to_string();
        req.surname = "CHEN".to_string();
        assert!(identity_matches(&req, &details()));

        req.surname = "Wong".to_string();
        assert!(!identity_matches(&req, &details()));

        let mut req = request();
        req.birthdate = date(2020, 1, 2);
        assert!(!identity_matches(&req, &details()));
    }

    #[test]
    fn age_ceiling_boundary() {
        let birthdate = date(2014, 6, 15);
        // Twelfth birthday is 2026-06-15; the birthday itself is over the
        // ceiling.
        assert!(is_under(birthdate, 12, date(2026, 6, 14)));
        assert!(!is_under(birthdate, 12, date(2026, 6, 15)));
        assert!(!is_under(birthdate, 12, date(2026, 6, 16)));
    }

    #[test_log::test(tokio::test)]
    async fn self_registration_is_rejected() {
        let svc = service(FixedRegistry::default(), Some(12));
        let mut req = request();
        req.dependent_hdid = "GUARDIAN".to_string();
        let err = svc
            .add_dependent("GUARDIAN", &req)
            .await
            .expect_err("self registration should be rejected");
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test_log::test(tokio::test)]
    async fn unknown_dependent_is_a_validation_error() {
        let svc = service(FixedRegistry::default(), Some(12));
        let err = svc
            .add_dependent("GUARDIAN", &request())
            .await
            .expect_err("unknown dependent should be rejected");
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test_log::test(tokio::test)]
    async fn over_age_dependent_is_rejected() {
        let now = Utc::now().date_naive();
        let adult = now.with_year(now.year() - 20).expect("valid date");
        let mut det = details();
        det.birthdate = adult;
        let mut req = request();
        req.birthdate = adult;

        let svc = service(FixedRegistry::with(vec![det]), Some(12));
        let err = svc
            .add_dependent("GUARDIAN", &req)
            .await
            .expect_err("over-age dependent should be rejected");
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }
}
