pub mod handlers;
pub mod responses;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every error response.
///
/// ```json
/// {
///   "error": "BadGateway",
///   "message": "API error (503): backend unavailable",
///   "details": null
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
