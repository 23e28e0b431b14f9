//! API error type and its JSON response shape.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use stockpilot_core::InventoryError;
use stockpilot_media::MediaError;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Media(#[from] MediaError),

    /// An extractor refused the request (bad JSON, body too large).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Inventory(e) => match e {
                InventoryError::NotFound { .. } => StatusCode::NOT_FOUND,
                InventoryError::StockUnderflow { .. } => StatusCode::CONFLICT,
                InventoryError::CorruptDocument { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                InventoryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ if e.is_client_error() => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Media(e) => match e {
                MediaError::Config { .. } => StatusCode::SERVICE_UNAVAILABLE,
                MediaError::InvalidMedia { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Rejected { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Inventory(InventoryError::NotFound { .. }) => "not_found",
            Self::Inventory(InventoryError::StockUnderflow { .. }) => "stock_underflow",
            Self::Inventory(InventoryError::CorruptDocument { .. }) => "corrupt_document",
            Self::Inventory(InventoryError::Database(_)) | Self::Internal(_) => "internal",
            Self::Rejected { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                "payload_too_large"
            }
            Self::Inventory(_) | Self::Rejected { .. } => "invalid_input",
            Self::Media(MediaError::Config { .. }) => "media_unconfigured",
            Self::Media(MediaError::InvalidMedia { .. }) => "invalid_input",
            Self::Media(_) => "storage_error",
        }
    }
}

impl ApiError {
    /// Malformed or mistyped input is a plain 400; only body-size and
    /// server-side failures keep the extractor's status.
    fn rejected(status: StatusCode, message: String) -> Self {
        let status = if status == StatusCode::PAYLOAD_TOO_LARGE || status.is_server_error() {
            status
        } else {
            StatusCode::BAD_REQUEST
        };
        Self::Rejected { status, message }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

pub(crate) fn api_error_response(status: StatusCode, code: &str, message: &str) -> Response {
    let body = Json(json!({"error": {"code": code, "message": message}}));
    (status, body).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            if status.is_server_error() {
                error!(error = %self, status = status.as_u16(), "upstream failure");
            } else {
                debug!(error = %self, status = status.as_u16(), "request rejected");
            }
            self.to_string()
        };
        api_error_response(status, self.code(), &message)
    }
}
