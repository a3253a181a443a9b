use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use super::require_param;
use crate::error::{AppError, AppResult};
use crate::middleware::policy::PolicyGuard;
use crate::services::get_services_from_depot;
use gateway_core::types::RequestResult;
use gateway_db::model::user_profile::{UserProfile, UserProfileHistory};
use gateway_service::auth::Requirement;
use gateway_service::profile::CreateProfileRequest;

/// ## Summary
/// GET /profile/{hdid} — the caller's profile, recording the login touch.
///
/// ## Errors
/// Returns HTTP 500 if the lookup fails.
#[handler]
async fn get_profile(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<RequestResult<UserProfile>>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    Ok(Json(services.profiles.get_profile(&hdid).await?))
}

/// ## Summary
/// POST /profile/{hdid} — registers a profile.
///
/// ## Errors
/// Returns HTTP 400 for an unparsable body, HTTP 500 on failure.
#[handler]
async fn create_profile(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<RequestResult<UserProfile>>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let body: CreateProfileRequest = req
        .parse_json()
        .await
        .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
    Ok(Json(services.profiles.create_profile(&hdid, &body).await?))
}

/// ## Summary
/// DELETE /profile/{hdid} — closes the profile.
///
/// ## Errors
/// Returns HTTP 404 when no profile exists.
#[handler]
async fn close_profile(req: &mut Request, depot: &mut Depot) -> AppResult<Json<()>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    services.profiles.close_profile(&hdid).await?;
    Ok(Json(()))
}

/// ## Summary
/// GET /profile/{hdid}/recover — reopens a closed profile.
///
/// ## Errors
/// Returns HTTP 404 when no profile exists.
#[handler]
async fn recover_profile(req: &mut Request, depot: &mut Depot) -> AppResult<Json<()>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    services.profiles.recover_profile(&hdid).await?;
    Ok(Json(()))
}

/// ## Summary
/// GET /profile/{hdid}/history — recent profile operations, bounded by
/// configuration.
///
/// ## Errors
/// Returns HTTP 500 if the lookup fails.
#[handler]
async fn history(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<Vec<UserProfileHistory>>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    Ok(Json(services.profiles.recent_history(&hdid).await?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("profile/{hdid}")
        .hoop(PolicyGuard::single(
            Requirement::AuthenticatedUser,
            "manage this profile",
        ))
        .get(get_profile)
        .post(create_profile)
        .delete(close_profile)
        .push(Router::with_path("recover").get(recover_profile))
        .push(Router::with_path("history").get(history))
}
