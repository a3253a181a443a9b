use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use super::{require_param, require_uuid_param};
use crate::error::{AppError, AppResult};
use crate::middleware::policy::PolicyGuard;
use crate::services::get_services_from_depot;
use gateway_core::types::RequestResult;
use gateway_service::auth::{FhirRequirement, FhirResource, Requirement};
use gateway_service::comment::{CommentView, WriteCommentRequest};

/// ## Summary
/// GET /comment/{hdid}?parentEntryId=... — comments for one timeline entry,
/// decrypted.
///
/// ## Errors
/// Returns HTTP 400 when `parentEntryId` is missing.
#[handler]
async fn list_comments(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<RequestResult<Vec<CommentView>>>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let parent_entry_id = req.query::<String>("parentEntryId").ok_or_else(|| {
        AppError::BadRequest("Missing query parameter: parentEntryId".to_string())
    })?;
    Ok(Json(
        services.comments.list_for_entry(&hdid, &parent_entry_id).await?,
    ))
}

/// ## Summary
/// POST /comment/{hdid} — adds a comment, sealed under the profile key.
///
/// ## Errors
/// Returns HTTP 400 for an unparsable body.
#[handler]
async fn add_comment(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<RequestResult<CommentView>>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let body: WriteCommentRequest = req
        .parse_json()
        .await
        .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
    Ok(Json(services.comments.add(&hdid, &body).await?))
}

#[derive(Debug, serde::Deserialize)]
struct UpdateCommentBody {
    text: String,
}

/// ## Summary
/// PUT /comment/{hdid}/{id} — replaces a comment's body.
///
/// ## Errors
/// Returns HTTP 404 when the comment is not the profile's.
#[handler]
async fn update_comment(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<RequestResult<()>>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let id = require_uuid_param(req, "id")?;
    let body: UpdateCommentBody = req
        .parse_json()
        .await
        .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
    Ok(Json(services.comments.update(&hdid, id, &body.text).await?))
}

/// ## Summary
/// DELETE /comment/{hdid}/{id} — deletes a comment.
///
/// ## Errors
/// Returns HTTP 404 when the comment is not the profile's.
#[handler]
async fn remove_comment(req: &mut Request, depot: &mut Depot) -> AppResult<Json<()>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let id = require_uuid_param(req, "id")?;
    services.comments.remove(&hdid, id).await?;
    Ok(Json(()))
}

#[must_use]
pub fn routes() -> Router {
    let read = Requirement::Fhir(
        FhirRequirement::read(FhirResource::Observation).allow_user_delegation(),
    );
    let write = Requirement::Fhir(FhirRequirement::write(FhirResource::Observation));

    Router::with_path("comment/{hdid}")
        .push(
            Router::new()
                .hoop(PolicyGuard::single(read, "read comments"))
                .get(list_comments),
        )
        .push(
            Router::new()
                .hoop(PolicyGuard::single(write, "write comments"))
                .post(add_comment)
                .push(
                    Router::with_path("{id}")
                        .put(update_comment)
                        .delete(remove_comment),
                ),
        )
}
