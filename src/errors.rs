use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("product not found")]
    ProductNotFound,

    #[error("link not found")]
    LinkNotFound,

    #[error("unknown access level: {0}")]
    InvalidAccessLevel(String),

    #[error("invalid field permissions: {0}")]
    InvalidFieldPermissions(String),

    /// Catch-all for failures the caller cannot act on. Store methods
    /// return `anyhow::Result`, so database errors arrive here.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::ProductNotFound => (
                StatusCode::NOT_FOUND,
                "invalid_request_error",
                "product_not_found",
                "product not found".to_string(),
            ),
            AppError::LinkNotFound => (
                StatusCode::NOT_FOUND,
                "invalid_request_error",
                "link_not_found",
                "share link not found".to_string(),
            ),
            AppError::InvalidAccessLevel(level) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "invalid_access_level",
                format!(
                    "unknown access level '{}' (expected public, after_click or after_rfq)",
                    level
                ),
            ),
            AppError::InvalidFieldPermissions(reason) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "invalid_field_permissions",
                reason.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_not_found_variants_map_to_404() {
        assert_eq!(status_of(AppError::ProductNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::LinkNotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_variants_map_to_400() {
        assert_eq!(
            status_of(AppError::InvalidAccessLevel("vip".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::InvalidFieldPermissions("not an object".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_maps_to_500_without_detail() {
        let err = AppError::Internal(anyhow::anyhow!("pool timed out"));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
