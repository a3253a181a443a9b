//! User profile lifecycle.
//!
//! Registration gates on a minimum patient age, close/recover flip the
//! closed timestamp, and every mutation appends a history record. These
//! endpoints predate the typed-error services and still answer in the
//! tri-state envelope.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};
use crate::patient::PatientRegistry;
use gateway_core::config::Settings;
use gateway_core::types::{RequestError, RequestResult};
use gateway_db::db::DbProvider;
use gateway_db::db::query::user_profile;
use gateway_db::model::user_profile::{
    NewUserProfile, NewUserProfileHistory, UserProfile, UserProfileHistory,
};

const OPERATION_CREATE: &str = "create";
const OPERATION_CLOSE: &str = "close";
const OPERATION_RECOVER: &str = "recover";
const OPERATION_LOGIN: &str = "login";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfileRequest {
    pub email: Option<String>,
    pub sms_number: Option<String>,
    pub accepted_terms_version: Option<String>,
}

pub struct UserProfileService {
    provider: Arc<dyn DbProvider>,
    registry: Arc<dyn PatientRegistry>,
    min_patient_age: u32,
    history_record_limit: i64,
}

impl UserProfileService {
    #[must_use]
    pub fn from_settings(
        settings: &Settings,
        provider: Arc<dyn DbProvider>,
        registry: Arc<dyn PatientRegistry>,
    ) -> Self {
        Self {
            provider,
            registry,
            min_patient_age: settings.web_client.min_patient_age,
            history_record_limit: settings.web_client.user_profile_history_record_limit,
        }
    }

    /// ## Summary
    /// Fetches a profile, recording the login touch.
    ///
    /// ## Errors
    /// Returns database errors; a missing profile is an error envelope, not
    /// a failure.
    pub async fn get_profile(&self, hdid: &str) -> ServiceResult<RequestResult<UserProfile>> {
        let mut conn = self.provider.get_connection().await?;
        let Some(profile) = user_profile::find(&mut conn, hdid).await? else {
            return Ok(RequestResult::error(RequestError::new(
                "profile_not_found",
                "No profile exists for this user",
            )));
        };

        user_profile::touch_login(&mut conn, hdid).await?;
        user_profile::record_history(
            &mut conn,
            &NewUserProfileHistory {
                id: uuid::Uuid::new_v4(),
                hdid,
                operation_code: OPERATION_LOGIN,
            },
        )
        .await?;

        Ok(RequestResult::success(profile))
    }

    /// ## Summary
    /// Registers a profile after checking the minimum patient age against
    /// the registry birthdate.
    ///
    /// ## Errors
    /// Returns database or registry errors; age and duplicate violations are
    /// error envelopes.
    pub async fn create_profile(
        &self,
        hdid: &str,
        request: &CreateProfileRequest,
    ) -> ServiceResult<RequestResult<UserProfile>> {
        let Some(details) = self.registry.details(hdid).await? else {
            return Ok(RequestResult::error(RequestError::new(
                "patient_not_found",
                "No patient record exists for this user",
            )));
        };
        if under_minimum_age(details.birthdate, self.min_patient_age, chrono::Utc::now().date_naive())
        {
            tracing::info!(hdid, "Registration refused: under minimum age");
            return Ok(RequestResult::error(RequestError::new(
                "under_minimum_age",
                "Patient does not meet the minimum age requirement",
            )));
        }

        let mut conn = self.provider.get_connection().await?;
        if user_profile::find(&mut conn, hdid).await?.is_some() {
            return Ok(RequestResult::error(RequestError::new(
                "profile_exists",
                "A profile already exists for this user",
            )));
        }

        let profile = user_profile::insert(
            &mut conn,
            &NewUserProfile {
                hdid,
                email: request.email.as_deref(),
                sms_number: request.sms_number.as_deref(),
                encryption_key: None,
                accepted_terms_version: request.accepted_terms_version.as_deref(),
            },
        )
        .await?;
        user_profile::record_history(
            &mut conn,
            &NewUserProfileHistory {
                id: uuid::Uuid::new_v4(),
                hdid,
                operation_code: OPERATION_CREATE,
            },
        )
        .await?;

        tracing::info!(hdid, "Profile registered");
        Ok(RequestResult::success(profile))
    }

    /// ## Summary
    /// Marks a profile closed.
    ///
    /// ## Errors
    /// Returns `NotFound` when the profile does not exist, or database
    /// errors.
    pub async fn close_profile(&self, hdid: &str) -> ServiceResult<()> {
        let mut conn = self.provider.get_connection().await?;
        if user_profile::close(&mut conn, hdid).await? == 0 {
            return Err(ServiceError::NotFound(format!("Profile {hdid} not found")));
        }
        user_profile::record_history(
            &mut conn,
            &NewUserProfileHistory {
                id: uuid::Uuid::new_v4(),
                hdid,
                operation_code: OPERATION_CLOSE,
            },
        )
        .await?;
        tracing::info!(hdid, "Profile closed");
        Ok(())
    }

    /// ## Summary
    /// Reopens a closed profile.
    ///
    /// ## Errors
    /// Returns `NotFound` when the profile does not exist, or database
    /// errors.
    pub async fn recover_profile(&self, hdid: &str) -> ServiceResult<()> {
        let mut conn = self.provider.get_connection().await?;
        if user_profile::recover(&mut conn, hdid).await? == 0 {
            return Err(ServiceError::NotFound(format!("Profile {hdid} not found")));
        }
        user_profile::record_history(
            &mut conn,
            &NewUserProfileHistory {
                id: uuid::Uuid::new_v4(),
                hdid,
                operation_code: OPERATION_RECOVER,
            },
        )
        .await?;
        tracing::info!(hdid, "Profile recovered");
        Ok(())
    }

    /// ## Summary
    /// Returns the most recent profile history records, bounded by the
    /// configured limit.
    ///
    /// ## Errors
    /// Returns database errors.
    pub async fn recent_history(&self, hdid: &str) -> ServiceResult<Vec<UserProfileHistory>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(user_profile::recent_history(&mut conn, hdid, self.history_record_limit).await?)
    }
}

fn under_minimum_age(
    birthdate: chrono::NaiveDate,
    min_age: u32,
    today: chrono::NaiveDate,
) -> bool {
    birthdate
        .checked_add_months(chrono::Months::new(min_age * 12))
        .is_some_and(|threshold| threshold > today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn minimum_age_boundary() {
        let birthdate = date(2014, 6, 15);
        // Twelfth birthday is 2026-06-15.
        assert!(under_minimum_age(birthdate, 12, date(2026, 6, 14)));
        assert!(!under_minimum_age(birthdate, 12, date(2026, 6, 15)));
        assert!(!under_minimum_age(birthdate, 12, date(2026, 6, 16)));
    }
}
