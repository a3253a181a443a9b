use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use super::{require_param, require_uuid_param};
use crate::error::{AppError, AppResult};
use crate::middleware::policy::PolicyGuard;
use crate::services::get_services_from_depot;
use gateway_core::types::RequestResult;
use gateway_service::auth::{FhirRequirement, FhirResource, Requirement};
use gateway_service::note::{NoteView, WriteNoteRequest};

/// ## Summary
/// GET /note/{hdid} — the profile's notes, decrypted.
///
/// ## Errors
/// Returns HTTP 500 if the lookup or decryption fails.
#[handler]
async fn list_notes(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<RequestResult<Vec<NoteView>>>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    Ok(Json(services.notes.list(&hdid).await?))
}

/// ## Summary
/// POST /note/{hdid} — adds a note, sealed under the profile key.
///
/// ## Errors
/// Returns HTTP 400 for an unparsable body.
#[handler]
async fn add_note(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<RequestResult<NoteView>>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let body: WriteNoteRequest = req
        .parse_json()
        .await
        .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
    Ok(Json(services.notes.add(&hdid, &body).await?))
}

/// ## Summary
/// PUT /note/{hdid}/{id} — replaces a note's fields.
///
/// ## Errors
/// Returns HTTP 404 when the note is not the profile's.
#[handler]
async fn update_note(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<RequestResult<()>>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let id = require_uuid_param(req, "id")?;
    let body: WriteNoteRequest = req
        .parse_json()
        .await
        .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
    Ok(Json(services.notes.update(&hdid, id, &body).await?))
}

/// ## Summary
/// DELETE /note/{hdid}/{id} — deletes a note.
///
/// ## Errors
/// Returns HTTP 404 when the note is not the profile's.
#[handler]
async fn remove_note(req: &mut Request, depot: &mut Depot) -> AppResult<Json<()>> {
    let services = get_services_from_depot(depot)?;
    let hdid = require_param(req, "hdid")?;
    let id = require_uuid_param(req, "id")?;
    services.notes.remove(&hdid, id).await?;
    Ok(Json(()))
}

#[must_use]
pub fn routes() -> Router {
    let read = Requirement::Fhir(FhirRequirement::read(FhirResource::Patient));
    let write = Requirement::Fhir(FhirRequirement::write(FhirResource::Patient));

    Router::with_path("note/{hdid}")
        .push(
            Router::new()
                .hoop(PolicyGuard::single(read, "read notes"))
                .get(list_notes),
        )
        .push(
            Router::new()
                .hoop(PolicyGuard::single(write, "write notes"))
                .post(add_note)
                .push(
                    Router::with_path("{id}")
                        .put(update_note)
                        .delete(remove_note),
                ),
        )
}
