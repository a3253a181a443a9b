use salvo::Depot;
use salvo::http::StatusCode;
use salvo::writing::Json;
use serde_json::json;
use tracing::error;

use crate::services::get_services_from_depot;
use gateway_service::auth::ClaimsPrincipal;

/// ## Summary
/// Authentication middleware: verifies the bearer token and stores the
/// claims principal in the depot. Requests without an `Authorization`
/// header proceed anonymously (an empty principal); the per-route policies
/// decide what anonymous callers may do. A present-but-invalid token is
/// rejected outright with 401.
pub struct AuthMiddleware;

#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let services = match get_services_from_depot(depot) {
            Ok(s) => s,
            Err(e) => {
                error!(error = ?e, "Failed to get services from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let Some(token) = bearer_token(req) else {
            tracing::trace!("No bearer token, proceeding anonymously");
            depot.inject(ClaimsPrincipal::default());
            return;
        };

        match services.token_verifier.verify(token) {
            Ok(principal) => {
                tracing::debug!(hdid = ?principal.hdid, "Bearer token verified");
                depot.inject(principal);
            }
            Err(e) => {
                tracing::debug!(error = ?e, "Bearer token rejected");
                res.status_code(StatusCode::UNAUTHORIZED);
                res.render(Json(json!({
                    "type": "about:blank",
                    "title": "Unauthorized",
                    "status": 401,
                    "detail": "Bearer token is invalid or expired",
                })));
                ctrl.skip_rest();
            }
        }
    }
}

fn bearer_token(req: &salvo::Request) -> Option<&str> {
    let header = req
        .headers()
        .get(salvo::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim())
    } else {
        None
    }
}

/// Returns the request's claims principal; anonymous requests carry the
/// empty principal.
#[must_use]
pub fn principal_from_depot(depot: &Depot) -> ClaimsPrincipal {
    depot
        .obtain::<ClaimsPrincipal>()
        .cloned()
        .unwrap_or_default()
}
