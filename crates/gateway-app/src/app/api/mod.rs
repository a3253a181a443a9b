mod comment;
mod communication;
mod delegation;
mod dependent;
mod feedback;
mod healthcheck;
mod note;
mod notification;
mod profile;
mod webhook;

use salvo::Router;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthMiddleware;
pub use gateway_core::constants::{API_ROUTE_COMPONENT, API_VERSION_COMPONENT};

/// ## Summary
/// Constructs the `/api/v1` router. Bearer authentication runs for every
/// route; authorization policy is declared per route group.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT).push(
        Router::with_path(API_VERSION_COMPONENT)
            .hoop(AuthMiddleware)
            .push(healthcheck::routes())
            .push(communication::routes())
            .push(profile::routes())
            .push(dependent::routes())
            .push(delegation::routes())
            .push(comment::routes())
            .push(note::routes())
            .push(notification::routes())
            .push(feedback::routes())
            .push(webhook::routes()),
    )
}

/// Extracts a required route value.
pub(crate) fn require_param(req: &salvo::Request, name: &str) -> AppResult<String> {
    req.param::<String>(name)
        .ok_or_else(|| AppError::BadRequest(format!("Missing route value: {name}")))
}

/// Extracts a required uuid route value.
pub(crate) fn require_uuid_param(req: &salvo::Request, name: &str) -> AppResult<uuid::Uuid> {
    require_param(req, name)?
        .parse::<uuid::Uuid>()
        .map_err(|_| AppError::BadRequest(format!("Route value {name} is not a valid id")))
}
