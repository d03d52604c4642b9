//! Reusable OpenAPI responses for handler documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "error": "InternalServerError",
        "message": "I/O error: permission denied",
        "details": null
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Gateway - an upstream platform failed",
    content_type = "application/json",
    example = json!({
        "error": "BadGateway",
        "message": "API error (503): backend unavailable",
        "details": null
    })
)]
pub struct BadGatewayResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - malformed JSON body",
    content_type = "application/json",
    example = json!({
        "error": "BadRequest",
        "message": "Failed to parse the request body as JSON",
        "details": null
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);
