//! Handler tests for the `/v1/apim` endpoints
//!
//! Requests go through the real router with `oneshot`; vendors are either
//! unconfigured, a wiremock server, or an in-memory API Gateway.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_apim::auth::GoogleAuth;
use domain_apim::handlers::{self, OfframpResponse, OperationResponse};
use domain_apim::models::AwsApi;
use domain_apim::providers::ApiGateway;
use domain_apim::{
    ApigeeConfig, ApimResult, ApimService, ApimStatus, AwsConfig, AzureConfig, Platform, Store,
};
use http_body_util::BodyExt;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt; // For oneshot()
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Two versions of one HTTP API.
struct PetsGateway;

#[async_trait]
impl ApiGateway for PetsGateway {
    async fn list_apis(&self) -> ApimResult<Vec<AwsApi>> {
        Ok(vec![
            AwsApi {
                api_id: "a1".into(),
                name: "Pets".into(),
                description: "Pet store".into(),
                api_endpoint: "https://a1.execute-api.eu-west-1.amazonaws.com".into(),
                ..Default::default()
            },
            AwsApi {
                api_id: "a2".into(),
                name: "Pets v2".into(),
                version: "2".into(),
                api_endpoint: "https://a2.execute-api.eu-west-1.amazonaws.com".into(),
                ..Default::default()
            },
        ])
    }

    async fn export_openapi(&self, _api_id: &str) -> ApimResult<Vec<u8>> {
        Ok(br#"{"openapi":"3.0.1","info":{"title":"Pets"}}"#.to_vec())
    }
}

fn unconfigured(dir: &TempDir) -> ApimService {
    ApimService::new(
        Store::new(dir.path()),
        ApigeeConfig::default(),
        AzureConfig::default(),
        AwsConfig::default(),
    )
    .unwrap()
    .with_google_auth(GoogleAuth::new(reqwest::Client::new()))
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_status_without_configuration() {
    let dir = TempDir::new().unwrap();
    let app = handlers::router(unconfigured(&dir));

    let request = Request::builder()
        .uri("/v1/apim/status")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let status: ApimStatus = json_body(response.into_body()).await;
    assert!(!status.apigee.connected);
    assert_eq!(status.apigee.message, "No Apigee project given.");
    assert!(!status.apihub.connected);
    assert!(!status.azure.connected);
    assert!(status.azure.message.contains("No subscription given"));
    assert!(!status.aws.connected);
    assert_eq!(status.aws.message, "No AWS region given.");
}

#[tokio::test]
async fn test_status_with_gateway_connected() {
    let dir = TempDir::new().unwrap();
    let aws = AwsConfig {
        region: Some("eu-west-1".into()),
        ..Default::default()
    };
    let service = ApimService::new(
        Store::new(dir.path()),
        ApigeeConfig::default(),
        AzureConfig::default(),
        aws,
    )
    .unwrap()
    .with_google_auth(GoogleAuth::new(reqwest::Client::new()))
    .with_gateway(Arc::new(PetsGateway));

    let request = Request::builder()
        .uri("/v1/apim/status")
        .body(Body::empty())
        .unwrap();
    let response = handlers::router(service).oneshot(request).await.unwrap();

    let status: ApimStatus = json_body(response.into_body()).await;
    assert!(status.aws.connected);
    assert_eq!(status.aws.message, "Connected to AWS, 2 API(s) found.");
}

#[tokio::test]
async fn test_offramp_unknown_platform_is_not_a_result() {
    let dir = TempDir::new().unwrap();
    let app = handlers::router(unconfigured(&dir));

    let response = app
        .oneshot(post("/v1/apim/offramp", json!({"offramp": "apigee"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: OfframpResponse = json_body(response.into_body()).await;
    assert!(!body.result);
    assert!(body.apis.is_empty());
    assert_eq!(
        body.message,
        "Offramp from 'apigee' is not supported, use azure or aws."
    );
}

#[tokio::test]
async fn test_offramp_rejects_malformed_body() {
    let dir = TempDir::new().unwrap();
    let app = handlers::router(unconfigured(&dir));

    let response = app
        .oneshot(post("/v1/apim/offramp", json!({"source": "aws"})))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_sync_aws_to_apihub() {
    let hub = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&hub)
        .await;

    let dir = TempDir::new().unwrap();
    let apigee = ApigeeConfig {
        project: Some("proj".into()),
        region: Some("europe-west1".into()),
        token: Some("tok".into()),
        ..Default::default()
    };
    let aws = AwsConfig {
        region: Some("eu-west-1".into()),
        ..Default::default()
    };
    let service = ApimService::new(Store::new(dir.path()), apigee, AzureConfig::default(), aws)
        .unwrap()
        .with_google_auth(GoogleAuth::new(reqwest::Client::new()))
        .with_apihub_url(hub.uri())
        .with_gateway(Arc::new(PetsGateway));
    let store_root = dir.path().to_path_buf();

    let response = handlers::router(service)
        .oneshot(post(
            "/v1/apim/sync",
            json!({"offramp": "aws", "onramp": "apihub"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: OperationResponse = json_body(response.into_body()).await;
    assert!(body.result, "{}", body.message);
    assert!(body.message.contains("Converted pets-v2."));

    let store = Store::new(store_root);
    let general = store.api_dir(Platform::General, "pets").unwrap();
    assert!(general.join("pets.json").is_file());
    assert!(general.join("pets-v2.json").is_file());
    assert!(general.join("openapi.json").is_file());
    assert!(store.api_dir(Platform::ApiHub, "pets").unwrap().join("pets.json").is_file());
    assert_eq!(hub.received_requests().await.unwrap().len(), 4);
}
