use salvo::{Router, handler};

#[handler]
async fn liveness() -> &'static str {
    "OK"
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("healthcheck").get(liveness)
}
