use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};

use crate::error::AppResult;
use crate::services::get_services_from_depot;
use gateway_db::db::enums::CommunicationType;
use gateway_db::model::communication::Communication;

/// ## Summary
/// GET /communication/active — the active communication for a placement
/// (`type` query parameter, banner by default). Anonymous.
///
/// ## Errors
/// Returns HTTP 500 if the lookup fails.
#[handler]
async fn active(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Option<Communication>>> {
    let services = get_services_from_depot(depot)?;
    let communication_type = match req.query::<String>("type").as_deref() {
        Some("in_app") => CommunicationType::InApp,
        Some("mobile") => CommunicationType::Mobile,
        _ => CommunicationType::Banner,
    };
    let value = services.communications.active(communication_type).await?;
    Ok(Json(value))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("communication").push(Router::with_path("active").get(active))
}
