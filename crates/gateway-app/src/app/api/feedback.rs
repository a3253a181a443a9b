use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use super::require_param;
use crate::error::{AppError, AppResult};
use crate::middleware::policy::PolicyGuard;
use crate::services::get_services_from_depot;
use gateway_db::model::user_feedback::UserFeedback;
use gateway_service::auth::Requirement;
use gateway_service::feedback::SubmitFeedbackRequest;

/// ## Summary
/// POST /feedback/{hdid} — stores a feedback submission.
///
/// ## Errors
/// Returns HTTP 400 for an empty or oversized comment.
#[handler]
async fn submit_feedback(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<UserFeedback>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let body: SubmitFeedbackRequest = req
        .parse_json()
        .await
        .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
    Ok(Json(services.feedback.submit(Some(&hdid), &body).await?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("feedback/{hdid}")
        .hoop(PolicyGuard::single(
            Requirement::AuthenticatedUser,
            "submit feedback",
        ))
        .post(submit_feedback)
}
