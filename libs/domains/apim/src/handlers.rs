use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::errors::responses::{
    BadGatewayResponse, BadRequestResponse, InternalServerErrorResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::ApimResult;
use crate::models::PlatformStatus;
use crate::report::Report;
use crate::service::{ApimService, ApimStatus};

const TAG: &str = "apim";

/// OpenAPI documentation for the sync API
#[derive(OpenApi)]
#[openapi(
    paths(status, offramp, onramp, sync),
    components(
        schemas(
            ApimStatus,
            PlatformStatus,
            OfframpRequest,
            OfframpResponse,
            OnrampRequest,
            SyncRequest,
            OperationResponse
        ),
        responses(BadRequestResponse, BadGatewayResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Move API metadata between management platforms")
    )
)]
pub struct ApiDoc;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfframpRequest {
    /// Source platform: `azure` or `aws`
    #[schema(example = "azure")]
    pub offramp: String,
    /// Skip APIs that were already exported
    #[serde(default)]
    pub only_new: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfframpResponse {
    pub result: bool,
    /// General records written
    pub apis: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OnrampRequest {
    /// Target platform: `apihub`
    #[schema(example = "apihub")]
    pub onramp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncRequest {
    #[schema(example = "azure")]
    pub offramp: String,
    #[schema(example = "apihub")]
    pub onramp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OperationResponse {
    pub result: bool,
    pub message: String,
}

impl From<Report> for OperationResponse {
    fn from(report: Report) -> Self {
        Self {
            result: report.is_success(),
            message: report.to_string(),
        }
    }
}

/// Create the router with all `/v1/apim` endpoints
pub fn router(service: ApimService) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/v1/apim/status", get(status))
        .route("/v1/apim/offramp", post(offramp))
        .route("/v1/apim/onramp", post(onramp))
        .route("/v1/apim/sync", post(sync))
        .with_state(shared_service)
}

/// Connectivity of every platform
#[utoipa::path(
    get,
    path = "/v1/apim/status",
    tag = TAG,
    responses(
        (status = 200, description = "Status per platform", body = ApimStatus)
    )
)]
async fn status(State(service): State<Arc<ApimService>>) -> Json<ApimStatus> {
    Json(service.status_all().await)
}

/// Export from a vendor and convert to general records
#[utoipa::path(
    post,
    path = "/v1/apim/offramp",
    tag = TAG,
    request_body = OfframpRequest,
    responses(
        (status = 200, description = "Offramp finished; `result` is false on partial failure", body = OfframpResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn offramp(
    State(service): State<Arc<ApimService>>,
    Json(request): Json<OfframpRequest>,
) -> ApimResult<Json<OfframpResponse>> {
    let report = service.offramp(&request.offramp, request.only_new).await?;
    let result = report.is_success();
    let message = report.to_string();

    Ok(Json(OfframpResponse {
        result,
        apis: report.into_apis(),
        message,
    }))
}

/// Convert general records for a target platform and import them
#[utoipa::path(
    post,
    path = "/v1/apim/onramp",
    tag = TAG,
    request_body = OnrampRequest,
    responses(
        (status = 200, description = "Onramp finished", body = OperationResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn onramp(
    State(service): State<Arc<ApimService>>,
    Json(request): Json<OnrampRequest>,
) -> ApimResult<Json<OperationResponse>> {
    let report = service.onramp(&request.onramp).await?;
    Ok(Json(report.into()))
}

/// Offramp from one platform, then onramp to another
#[utoipa::path(
    post,
    path = "/v1/apim/sync",
    tag = TAG,
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Sync finished", body = OperationResponse),
        (status = 400, response = BadRequestResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn sync(
    State(service): State<Arc<ApimService>>,
    Json(request): Json<SyncRequest>,
) -> ApimResult<Json<OperationResponse>> {
    let report = service.sync(&request.offramp, &request.onramp).await?;
    Ok(Json(report.into()))
}
