use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct ApiResponse<T> {
    pub(crate) success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data: Option<T>,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) fn ok(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.to_owned(),
            error: None,
        }
    }

    /// Success with no `data` field.
    pub(crate) fn message(message: &str) -> Self {
        Self {
            success: true,
            data: None,
            message: message.to_owned(),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub(crate) fn failure(message: String, error: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            message,
            error,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    pub(crate) page: i64,
    pub(crate) limit: i64,
    pub(crate) total: i64,
    pub(crate) total_pages: i64,
}
