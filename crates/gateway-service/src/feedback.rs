//! User feedback intake.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};
use gateway_db::db::DbProvider;
use gateway_db::db::query::user_feedback;
use gateway_db::model::user_feedback::{NewUserFeedback, UserFeedback};

const FEEDBACK_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub comment: String,
    pub is_satisfied: bool,
}

pub struct UserFeedbackService {
    provider: Arc<dyn DbProvider>,
}

impl UserFeedbackService {
    #[must_use]
    pub fn new(provider: Arc<dyn DbProvider>) -> Self {
        Self { provider }
    }

    /// ## Summary
    /// Stores a feedback submission. The profile association is optional so
    /// feedback survives profile closure.
    ///
    /// ## Errors
    /// Returns a validation error for an empty or oversized comment, or
    /// database errors.
    pub async fn submit(
        &self,
        hdid: Option<&str>,
        request: &SubmitFeedbackRequest,
    ) -> ServiceResult<UserFeedback> {
        let comment = request.comment.trim();
        if comment.is_empty() {
            return Err(ServiceError::ValidationError(
                "Feedback comment must not be empty".to_string(),
            ));
        }
        if comment.chars().count() > FEEDBACK_MAX_CHARS {
            return Err(ServiceError::ValidationError(format!(
                "Feedback comment must be at most {FEEDBACK_MAX_CHARS} characters"
            )));
        }

        let mut conn = self.provider.get_connection().await?;
        Ok(user_feedback::insert(
            &mut conn,
            &NewUserFeedback {
                id: uuid::Uuid::new_v4(),
                user_profile_hdid: hdid,
                comment,
                is_satisfied: request.is_satisfied,
            },
        )
        .await?)
    }
}
