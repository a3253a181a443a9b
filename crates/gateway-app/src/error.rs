use salvo::http::StatusCode;
use salvo::writing::Json;
use serde_json::json;
use thiserror::Error;

use gateway_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] gateway_service::error::ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] gateway_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] gateway_core::error::CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ServiceError(err) => match err {
                ServiceError::NotAuthenticated => StatusCode::UNAUTHORIZED,
                ServiceError::AuthorizationError(_) => StatusCode::FORBIDDEN,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
                ServiceError::DatabaseError(gateway_db::error::DbError::NotFound(_)) => {
                    StatusCode::NOT_FOUND
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::DatabaseError(gateway_db::error::DbError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseError(_) | Self::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self.status() {
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::BAD_REQUEST => "Bad Request",
            _ => "Internal Server Error",
        }
    }
}

/// Renders errors as RFC 7807 problem-details JSON. Internal errors are
/// logged in full but never leak their detail to the client.
#[salvo::async_trait]
impl salvo::Writer for AppError {
    async fn write(
        self,
        _req: &mut salvo::Request,
        _depot: &mut salvo::Depot,
        res: &mut salvo::Response,
    ) {
        let status = self.status();
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "Request failed");
            "An internal error occurred".to_string()
        } else {
            tracing::debug!(error = ?self, "Request rejected");
            self.to_string()
        };

        res.status_code(status);
        res.render(Json(json!({
            "type": "about:blank",
            "title": self.title(),
            "status": status.as_u16(),
            "detail": detail,
        })));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_expected_statuses() {
        let cases = [
            (
                AppError::ServiceError(ServiceError::NotAuthenticated),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::ServiceError(ServiceError::AuthorizationError("no".to_string())),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::ServiceError(ServiceError::NotFound("x".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::ServiceError(ServiceError::ValidationError("bad".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::ServiceError(ServiceError::CryptoError("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::DatabaseError(gateway_db::error::DbError::NotFound(
                    "no such row".to_string(),
                )),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::ServiceError(ServiceError::DatabaseError(
                    gateway_db::error::DbError::NotFound("no such row".to_string()),
                )),
                StatusCode::NOT_FOUND,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err}");
        }
    }
}
