use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use super::require_param;
use crate::error::{AppError, AppResult};
use crate::middleware::policy::PolicyGuard;
use crate::services::get_services_from_depot;
use gateway_db::model::resource_delegate::ResourceDelegate;
use gateway_service::auth::{FhirRequirement, FhirResource, Requirement};
use gateway_service::dependent::AddDependentRequest;

/// ## Summary
/// GET /dependent/{hdid} — the guardian's registered dependents.
///
/// ## Errors
/// Returns HTTP 500 if the lookup fails.
#[handler]
async fn list_dependents(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<Vec<ResourceDelegate>>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    Ok(Json(services.dependents.list_dependents(&hdid).await?))
}

/// ## Summary
/// POST /dependent/{hdid} — registers a dependent under the guardian after
/// identity verification.
///
/// ## Errors
/// Returns HTTP 400 when identity verification or the age ceiling fails.
#[handler]
async fn add_dependent(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<ResourceDelegate>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let body: AddDependentRequest = req
        .parse_json()
        .await
        .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
    Ok(Json(services.dependents.add_dependent(&hdid, &body).await?))
}

/// ## Summary
/// DELETE /dependent/{hdid}/{dependent_hdid} — removes a dependent
/// relationship.
///
/// ## Errors
/// Returns HTTP 404 when no relationship exists.
#[handler]
async fn remove_dependent(req: &mut Request, depot: &mut Depot) -> AppResult<Json<()>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let dependent_hdid = require_param(req, "dependent_hdid")?;
    services
        .dependents
        .remove_dependent(&hdid, &dependent_hdid)
        .await?;
    Ok(Json(()))
}

#[must_use]
pub fn routes() -> Router {
    let read = Requirement::Fhir(
        FhirRequirement::read(FhirResource::Patient).allow_user_delegation(),
    );
    let write = Requirement::Fhir(FhirRequirement::write(FhirResource::Patient));

    Router::with_path("dependent/{hdid}")
        .push(
            Router::new()
                .hoop(PolicyGuard::single(read, "view dependents"))
                .get(list_dependents),
        )
        .push(
            Router::new()
                .hoop(PolicyGuard::single(write, "manage dependents"))
                .post(add_dependent)
                .push(Router::with_path("{dependent_hdid}").delete(remove_dependent)),
        )
}
