use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use crate::error::{AppError, AppResult};
use crate::middleware::policy::PolicyGuard;
use crate::services::get_services_from_depot;
use gateway_db::model::notification::Notification;
use gateway_service::auth::Requirement;

#[derive(Debug, serde::Deserialize)]
struct WebhookNotificationBody {
    hdid: String,
    content: String,
    category: String,
    scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// ## Summary
/// POST /webhook/notification — schedules a notification on behalf of an
/// upstream system. Guarded by the shared API key, not a bearer token.
///
/// ## Errors
/// Returns HTTP 400 for an unparsable body.
#[handler]
async fn push_notification(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<Notification>> {
    let services = get_services_from_depot(depot)?;
    let body: WebhookNotificationBody = req
        .parse_json()
        .await
        .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
    let scheduled_at = body.scheduled_at.unwrap_or_else(chrono::Utc::now);
    Ok(Json(
        services
            .notifications
            .schedule(&body.hdid, &body.content, &body.category, scheduled_at)
            .await?,
    ))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("webhook")
        .hoop(PolicyGuard::single(
            Requirement::ApiKey,
            "call webhook endpoints",
        ))
        .push(Router::with_path("notification").post(push_notification))
}
