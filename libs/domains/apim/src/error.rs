use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_helpers::ErrorResponse;
use thiserror::Error;

/// Result type for sync operations
pub type ApimResult<T> = Result<T, ApimError>;

/// Errors that can occur while moving API metadata between platforms.
///
/// Per-resource failures (a vendor returning 404 for one API, an unreadable
/// record) are logged and folded into a [`crate::report::Report`]; only the
/// failures that make the rest of a run meaningless surface as `ApimError`.
#[derive(Debug, Error)]
pub enum ApimError {
    /// Local filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Vendor answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Bundle archive could not be read or written
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Archive entry resolves outside the extraction directory
    #[error("Archive entry '{entry}' escapes the target directory")]
    ZipSlip { entry: String },

    /// Credentials could not be obtained
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// AWS SDK failure
    #[error("AWS error: {0}")]
    Aws(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Config(#[from] core_config::ConfigError),
}

impl ApimError {
    /// Build an [`ApimError::Api`] from a non-success response, consuming its body.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ApimError::Api { status, body }
    }
}

impl IntoResponse for ApimError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ApimError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApimError::Http(_) | ApimError::Api { .. } | ApimError::Aws(_) => {
                (StatusCode::BAD_GATEWAY, "BadGateway")
            }
            ApimError::Auth(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError"),
        };

        tracing::error!(error = %self, "Request failed");

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
            details: None,
        });

        (status, body).into_response()
    }
}
