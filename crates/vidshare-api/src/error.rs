use axum::{
    Json,
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use vidshare_db::paginate::QueryError;
use vidshare_types::api::ApiResponse;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or empty field, malformed id, bad paging parameters.
    #[error("{0}")]
    InvalidInput(String),
    /// Well-formed request that the current state does not allow.
    #[error("{0}")]
    InvalidOperation(String),
    #[error("{0}")]
    NotFound(String),
    /// Caller is not the owner of the entity.
    #[error("{0}")]
    Forbidden(String),
    #[error("Unauthorized request")]
    Unauthorized,
    #[error("{0}")]
    Conflict(String),
    /// The asset store did not hand back a usable reference.
    #[error("{0}")]
    Upstream(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Store(e) => {
                error!("Store failure: {:#}", e);
                "Internal server error".to_string()
            }
            Self::Upstream(msg) => {
                error!("Asset store failure: {}", msg);
                msg.clone()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ApiResponse::new(status.as_u16(), serde_json::Value::Null, message)),
        )
            .into_response()
    }
}

/// Success envelope with the given status.
pub fn respond<T: serde::Serialize>(
    status: StatusCode,
    data: T,
    message: impl Into<String>,
) -> Response {
    (status, Json(ApiResponse::new(status.as_u16(), data, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(ApiError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidOperation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Upstream("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::from(anyhow::anyhow!("disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn paging_errors_are_invalid_input() {
        let err = ApiError::from(QueryError::InvalidPage);
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }
}
