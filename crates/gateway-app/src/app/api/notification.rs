use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use super::{require_param, require_uuid_param};
use crate::error::AppResult;
use crate::middleware::policy::PolicyGuard;
use crate::services::get_services_from_depot;
use gateway_db::model::notification::Notification;
use gateway_service::auth::Requirement;

/// ## Summary
/// GET /notification/{hdid} — notifications that have reached their
/// scheduled time, newest first.
///
/// ## Errors
/// Returns HTTP 500 if the lookup fails.
#[handler]
async fn list_notifications(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<Vec<Notification>>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    Ok(Json(services.notifications.list(&hdid).await?))
}

/// ## Summary
/// PUT /notification/{hdid}/{id}/read — marks a notification read.
///
/// ## Errors
/// Returns HTTP 404 when the notification is not the user's.
#[handler]
async fn mark_read(req: &mut Request, depot: &mut Depot) -> AppResult<Json<()>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let id = require_uuid_param(req, "id")?;
    services.notifications.mark_read(&hdid, id).await?;
    Ok(Json(()))
}

/// ## Summary
/// DELETE /notification/{hdid}/{id} — deletes a notification.
///
/// ## Errors
/// Returns HTTP 404 when the notification is not the user's.
#[handler]
async fn remove_notification(req: &mut Request, depot: &mut Depot) -> AppResult<Json<()>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let id = require_uuid_param(req, "id")?;
    services.notifications.remove(&hdid, id).await?;
    Ok(Json(()))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("notification/{hdid}")
        .hoop(PolicyGuard::single(
            Requirement::AuthenticatedUser,
            "manage notifications",
        ))
        .get(list_notifications)
        .push(
            Router::with_path("{id}")
                .delete(remove_notification)
                .push(Router::with_path("read").put(mark_read)),
        )
}
