//! Per-route policy enforcement.
//!
//! A route declares its requirements once; the guard snapshots the request
//! (route values, query, headers) into a [`RequestContext`], runs the
//! authorization service, and stops the flow on denial. The snapshot is also
//! left in the depot for handlers that need route values.

use salvo::Depot;
use salvo::http::StatusCode;
use salvo::writing::Json;
use serde_json::json;
use tracing::error;

use crate::middleware::auth::principal_from_depot;
use crate::services::get_services_from_depot;
use gateway_service::auth::{AuthzResult, Requirement, RequestContext, RequestContextBuilder};

pub struct PolicyGuard {
    requirements: Vec<Requirement>,
    action: &'static str,
}

impl PolicyGuard {
    #[must_use]
    pub fn new(requirements: Vec<Requirement>, action: &'static str) -> Self {
        Self {
            requirements,
            action,
        }
    }

    #[must_use]
    pub fn single(requirement: Requirement, action: &'static str) -> Self {
        Self::new(vec![requirement], action)
    }
}

#[salvo::async_trait]
impl salvo::Handler for PolicyGuard {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(action = self.action))]
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

        let principal = principal_from_depot(depot);
        let context = capture_request_context(req);

        match services
            .authorization
            .check(&principal, &self.requirements, &context)
            .await
        {
            Ok(AuthzResult::Allowed) => {
                depot.inject(context);
            }
            Ok(AuthzResult::Denied) => {
                // Anonymous callers get a 401 so clients know to obtain a
                // token; authenticated ones are genuinely forbidden.
                let status = if principal == gateway_service::auth::ClaimsPrincipal::default() {
                    StatusCode::UNAUTHORIZED
                } else {
                    StatusCode::FORBIDDEN
                };
                tracing::info!(action = self.action, "Request denied by policy");
                res.status_code(status);
                res.render(Json(json!({
                    "type": "about:blank",
                    "title": if status == StatusCode::UNAUTHORIZED { "Unauthorized" } else { "Forbidden" },
                    "status": status.as_u16(),
                    "detail": format!("Not authorized to {}", self.action),
                })));
                ctrl.skip_rest();
            }
            Err(e) => {
                error!(error = ?e, action = self.action, "Policy evaluation failed");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
            }
        }
    }
}

fn capture_request_context(req: &salvo::Request) -> RequestContext {
    let mut builder = RequestContextBuilder::new();
    for (key, value) in req.params().iter() {
        builder = builder.route_value(key.clone(), value.clone());
    }
    for (key, value) in req.queries().iter() {
        builder = builder.query_value(key.clone(), value.clone());
    }
    for (name, value) in req.headers() {
        if let Ok(value) = value.to_str() {
            builder = builder.header(name.as_str(), value);
        }
    }
    builder.build()
}
