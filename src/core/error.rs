use axum::BoxError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::token::TokenError;
use crate::types::response::ApiResponse;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[source] sqlx::Error),
    #[error("Database migration error: {0}")]
    DatabaseMigration(#[from] sqlx::migrate::MigrateError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Reqwest error: {0}")]
    HTTPClient(#[from] reqwest::Error),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("Invalid session secret: {0}")]
    SessionSecret(#[from] hmac::digest::InvalidLength),
    #[error("Invalid push credentials: {0}")]
    PushCredentials(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid JSON payload: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("{message}: {detail}")]
    Declined { message: String, detail: String },
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}: {detail}")]
    Upstream { message: String, detail: String },
    #[error("{0}")]
    Configuration(String),
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("Reqwest error: {0}")]
    HTTPClient(#[from] reqwest::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("URL encoding error: {0}")]
    URLEncode(#[from] serde_urlencoded::ser::Error),
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl Error {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }

    pub(crate) fn forbidden(message: impl Into<String>) -> Self {
        Error::Forbidden(message.into())
    }

    /// A client-side failure reported by a third party, relayed as 400.
    pub(crate) fn declined(message: impl Into<String>, detail: impl ToString) -> Self {
        Error::Declined {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn upstream(message: impl Into<String>, detail: impl ToString) -> Self {
        Error::Upstream {
            message: message.into(),
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            Error::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            Error::JsonRejection(e) => (
                StatusCode::BAD_REQUEST,
                "Invalid JSON payload".to_owned(),
                Some(e.body_text()),
            ),
            Error::Declined { message, detail } => {
                tracing::warn!("{}: {}", message, detail);
                (StatusCode::BAD_REQUEST, message, Some(detail))
            }
            Error::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.to_owned(), None),
            Error::Forbidden(message) => (StatusCode::FORBIDDEN, message, None),
            Error::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
            Error::Upstream { message, detail } => {
                tracing::error!("{}: {}", message, detail);
                (StatusCode::INTERNAL_SERVER_ERROR, message, Some(detail))
            }
            Error::Configuration(message) => {
                tracing::error!("Configuration error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message, None)
            }
            e => {
                tracing::error!("{:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                    Some(e.to_string()),
                )
            }
        };

        (status, ApiResponse::failure(message, detail)).into_response()
    }
}

pub(crate) async fn handle_middleware_errors(err: BoxError) -> (StatusCode, ApiResponse<()>) {
    tracing::error!("Unhandled error: {:?}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ApiResponse::failure("Internal server error".to_owned(), None),
    )
}
