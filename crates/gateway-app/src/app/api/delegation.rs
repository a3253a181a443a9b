use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use super::require_param;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::principal_from_depot;
use crate::middleware::policy::PolicyGuard;
use crate::services::get_services_from_depot;
use gateway_db::model::delegation::Delegation;
use gateway_service::auth::Requirement;
use gateway_service::delegation::{
    AssociateDelegationRequest, CreateDelegationRequest, CreateDelegationResponse,
};
use gateway_service::error::ServiceError;

/// ## Summary
/// POST /delegation/{hdid} — creates a delegation invitation for the
/// resource owner. The response carries the plaintext sharing code, shown
/// once.
///
/// ## Errors
/// Returns HTTP 400 for an invalid request, HTTP 404 when the owner has no
/// registry record.
#[handler]
async fn create_delegation(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<CreateDelegationResponse>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let body: CreateDelegationRequest = req
        .parse_json()
        .await
        .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
    Ok(Json(services.delegation.create_delegation(&hdid, &body).await?))
}

/// ## Summary
/// GET /delegation/{hdid} — invitations created by the resource owner.
///
/// ## Errors
/// Returns HTTP 500 if the lookup fails.
#[handler]
async fn list_delegations(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<Vec<Delegation>>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    Ok(Json(services.delegation.list_for_owner(&hdid).await?))
}

/// ## Summary
/// PUT /delegation/associate — redeems an invitation for the caller. The
/// delegate is identified by their own hdid claim, not a route value.
///
/// ## Errors
/// Returns HTTP 400 for bad ciphertext, an expired or claimed invite, or a
/// self-delegation attempt; HTTP 404 when the delegation does not exist.
#[handler]
async fn associate_delegation(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<Delegation>> {
    let services = get_services_from_depot(depot)?;
    let principal = principal_from_depot(depot);
    let delegate_hdid = principal.hdid.ok_or(ServiceError::NotAuthenticated)?;
    let body: AssociateDelegationRequest = req
        .parse_json()
        .await
        .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
    Ok(Json(
        services
            .delegation
            .associate_delegation(&delegate_hdid, &body)
            .await?,
    ))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("delegation")
        .push(
            Router::with_path("associate")
                .hoop(PolicyGuard::single(
                    Requirement::Patient,
                    "accept a delegation invitation",
                ))
                .put(associate_delegation),
        )
        .push(
            Router::with_path("{hdid}")
                .hoop(PolicyGuard::single(
                    Requirement::AuthenticatedUser,
                    "manage delegation invitations",
                ))
                .get(list_delegations)
                .post(create_delegation),
        )
}
