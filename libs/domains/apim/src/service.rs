use std::str::FromStr;
use std::sync::Arc;

use core_config::FromEnv;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::auth::{AzureAuth, GoogleAuth};
use crate::config::{ApigeeConfig, AwsConfig, AzureConfig, AzureServiceRef, StoreConfig};
use crate::error::ApimResult;
use crate::models::{Platform, PlatformStatus};
use crate::naming::HubNames;
use crate::pipeline;
use crate::providers::{ApiGateway, ApigeeClient, AzureClient, HubClient, SdkApiGateway};
use crate::report::Report;
use crate::store::Store;

/// Connectivity of every remote platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApimStatus {
    pub apigee: PlatformStatus,
    pub apihub: PlatformStatus,
    pub azure: PlatformStatus,
    pub aws: PlatformStatus,
}

/// A client that could not be built, and the report saying why.
type Ready<T> = Result<T, Report>;

/// Entry point for every operation of the CLI and the web service.
///
/// Checks that the configuration an operation needs is present, resolves
/// credentials, builds the vendor clients and hands over to
/// [`crate::pipeline`]. Missing configuration or credentials yield a report
/// with a diagnostic rather than an error.
pub struct ApimService {
    store: Store,
    apigee: ApigeeConfig,
    azure: AzureConfig,
    aws: AwsConfig,
    http: Client,
    google_auth: GoogleAuth,
    azure_auth: AzureAuth,
    apigee_url: Option<String>,
    apihub_url: Option<String>,
    azure_url: Option<String>,
    gateway: Option<Arc<dyn ApiGateway>>,
}

impl ApimService {
    pub fn new(
        store: Store,
        apigee: ApigeeConfig,
        azure: AzureConfig,
        aws: AwsConfig,
    ) -> ApimResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("apimsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            store,
            apigee,
            azure,
            aws,
            google_auth: GoogleAuth::from_env(http.clone()),
            azure_auth: AzureAuth::new(http.clone()),
            http,
            apigee_url: None,
            apihub_url: None,
            azure_url: None,
            gateway: None,
        })
    }

    /// Every setting from the environment.
    pub fn from_env() -> ApimResult<Self> {
        Self::new(
            Store::from_config(&StoreConfig::from_env()?),
            ApigeeConfig::from_env()?,
            AzureConfig::from_env()?,
            AwsConfig::from_env()?,
        )
    }

    pub fn with_google_auth(mut self, auth: GoogleAuth) -> Self {
        self.google_auth = auth;
        self
    }

    pub fn with_azure_auth(mut self, auth: AzureAuth) -> Self {
        self.azure_auth = auth;
        self
    }

    pub fn with_apigee_url(mut self, url: impl Into<String>) -> Self {
        self.apigee_url = Some(url.into());
        self
    }

    pub fn with_apihub_url(mut self, url: impl Into<String>) -> Self {
        self.apihub_url = Some(url.into());
        self
    }

    pub fn with_azure_url(mut self, url: impl Into<String>) -> Self {
        self.azure_url = Some(url.into());
        self
    }

    /// Use this gateway instead of connecting through the AWS SDK.
    pub fn with_gateway(mut self, gateway: Arc<dyn ApiGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    async fn google_token(&self) -> Ready<String> {
        match self.google_auth.access_token(self.apigee.token.as_deref()).await {
            Ok(Some(token)) => Ok(token),
            Ok(None) => Err(Report::skipped(
                "No Google credentials found, set APIGEE_TOKEN or GOOGLE_APPLICATION_CREDENTIALS.",
            )),
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn apigee_client(&self) -> Ready<ApigeeClient> {
        let Some(project) = self.apigee.project.as_deref() else {
            return Err(Report::skipped("No Apigee project given."));
        };
        let token = self.google_token().await?;

        let client = ApigeeClient::new(self.http.clone(), project, &token);
        Ok(match &self.apigee_url {
            Some(url) => client.with_base_url(url),
            None => client,
        })
    }

    async fn hub_client(&self) -> Ready<HubClient> {
        let (Some(project), Some(region)) =
            (self.apigee.project.as_deref(), self.apigee.region.as_deref())
        else {
            return Err(Report::skipped("No project or region given for API Hub."));
        };
        let token = self.google_token().await?;

        let client = HubClient::new(self.http.clone(), project, region, &token);
        Ok(match &self.apihub_url {
            Some(url) => client.with_base_url(url),
            None => client,
        })
    }

    async fn azure_client(&self) -> Ready<(AzureClient, AzureServiceRef<'_>)> {
        let service = self
            .azure
            .service()
            .map_err(|reason| Report::skipped(format!("{} for Azure API Management.", reason)))?;

        let token = match self.azure_auth.access_token(&self.azure).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                return Err(Report::skipped(
                    "No Azure credentials found, set AZURE_TOKEN or a client id and secret.",
                ))
            }
            Err(e) => return Err(unavailable(e)),
        };

        let client = AzureClient::new(self.http.clone(), service, &token);
        let client = match &self.azure_url {
            Some(url) => client.with_base_url(url),
            None => client,
        };
        Ok((client, service))
    }

    async fn gateway(&self) -> Ready<(Arc<dyn ApiGateway>, &str)> {
        let Some(region) = self.aws.region.as_deref() else {
            return Err(Report::skipped("No AWS region given."));
        };

        let gateway: Arc<dyn ApiGateway> = match &self.gateway {
            Some(gateway) => gateway.clone(),
            None => Arc::new(SdkApiGateway::connect(&self.aws, region).await),
        };
        Ok((gateway, region))
    }

    pub async fn apigee_export(&self, filter: Option<&str>, only_new: bool) -> ApimResult<Report> {
        let client = match self.apigee_client().await {
            Ok(client) => client,
            Err(report) => return Ok(report),
        };
        let environment = self.apigee.environment.as_deref();
        pipeline::apigee::export(&self.store, &client, filter, environment, only_new).await
    }

    pub async fn apigee_import(&self, filter: Option<&str>) -> ApimResult<Report> {
        let client = match self.apigee_client().await {
            Ok(client) => client,
            Err(report) => return Ok(report),
        };
        pipeline::apigee::import(&self.store, &client, filter).await
    }

    pub async fn apigee_clean(&self, filter: Option<&str>) -> ApimResult<Report> {
        let client = match self.apigee_client().await {
            Ok(client) => client,
            Err(report) => return Ok(report),
        };
        Ok(pipeline::apigee::clean(&client, filter).await)
    }

    pub fn apigee_test_init(&self) -> ApimResult<Report> {
        match self.apigee.environment.as_deref() {
            Some(environment) => pipeline::apigee::init_tests(&self.store, environment),
            None => Ok(Report::skipped("No Apigee environment given.")),
        }
    }

    pub async fn azure_service_export(&self) -> ApimResult<Report> {
        let (client, service) = match self.azure_client().await {
            Ok(ready) => ready,
            Err(report) => return Ok(report),
        };
        pipeline::azure::export_service(&self.store, &client, service).await
    }

    pub async fn azure_export(&self, filter: Option<&str>, only_new: bool) -> ApimResult<Report> {
        let (client, _) = match self.azure_client().await {
            Ok(ready) => ready,
            Err(report) => return Ok(report),
        };
        pipeline::azure::export(&self.store, &client, filter, only_new).await
    }

    /// Works on exported files only; no credentials needed.
    pub fn azure_offramp(&self, filter: Option<&str>) -> ApimResult<Report> {
        match self.azure.service() {
            Ok(service) => pipeline::azure::offramp(&self.store, service, filter),
            Err(reason) => Ok(Report::skipped(format!(
                "{} for Azure API Management.",
                reason
            ))),
        }
    }

    pub async fn aws_export(&self, filter: Option<&str>, only_new: bool) -> ApimResult<Report> {
        let (gateway, _) = match self.gateway().await {
            Ok(ready) => ready,
            Err(report) => return Ok(report),
        };
        pipeline::aws::export(&self.store, gateway.as_ref(), filter, only_new).await
    }

    pub fn aws_offramp(&self, filter: Option<&str>) -> ApimResult<Report> {
        match self.aws.region.as_deref() {
            Some(region) => pipeline::aws::offramp(&self.store, region, filter),
            None => Ok(Report::skipped("No AWS region given.")),
        }
    }

    /// Local only; needs the project and region to name hub resources.
    pub fn apihub_onramp(&self, filter: Option<&str>) -> ApimResult<Report> {
        let (Some(project), Some(region)) =
            (self.apigee.project.as_deref(), self.apigee.region.as_deref())
        else {
            return Ok(Report::skipped("No project or region given for API Hub."));
        };
        let names = HubNames::new(project, region);
        pipeline::apihub::onramp(&self.store, &names, filter)
    }

    pub async fn apihub_import(&self, filter: Option<&str>) -> ApimResult<Report> {
        let client = match self.hub_client().await {
            Ok(client) => client,
            Err(report) => return Ok(report),
        };
        pipeline::apihub::import(&self.store, &client, filter).await
    }

    pub async fn apihub_clean(&self, filter: Option<&str>) -> ApimResult<Report> {
        let client = match self.hub_client().await {
            Ok(client) => client,
            Err(report) => return Ok(report),
        };
        Ok(pipeline::apihub::clean(&client, filter).await)
    }

    pub fn clean_local(&self, platform: Platform) -> ApimResult<Report> {
        pipeline::general::clean_local(&self.store, platform)
    }

    /// Check each platform in turn; missing configuration shows as disconnected.
    pub async fn status_all(&self) -> ApimStatus {
        let apigee = match self.apigee_client().await {
            Ok(client) => pipeline::apigee::status(&client).await,
            Err(report) => PlatformStatus::disconnected(report.to_string()),
        };

        let apihub = match self.hub_client().await {
            Ok(client) => {
                let project = self.apigee.project.as_deref().unwrap_or_default();
                pipeline::apihub::status(&client, project).await
            }
            Err(report) => PlatformStatus::disconnected(report.to_string()),
        };

        let azure = match self.azure_client().await {
            Ok((client, service)) => pipeline::azure::status(&client, service).await,
            Err(report) => PlatformStatus::disconnected(report.to_string()),
        };

        let aws = match self.gateway().await {
            Ok((gateway, _)) => pipeline::aws::status(gateway.as_ref()).await,
            Err(report) => PlatformStatus::disconnected(report.to_string()),
        };

        ApimStatus {
            apigee,
            apihub,
            azure,
            aws,
        }
    }

    /// Export from a vendor and convert to general records.
    pub async fn offramp(&self, platform: &str, only_new: bool) -> ApimResult<Report> {
        info!(platform = %platform, only_new, "Starting offramp");
        match Platform::from_str(platform) {
            Ok(Platform::Azure) => {
                let mut report = self.azure_service_export().await?;
                if report.was_skipped() {
                    return Ok(report);
                }
                report.merge(self.azure_export(None, only_new).await?);
                report.merge(self.azure_offramp(None)?);
                Ok(report)
            }
            Ok(Platform::Aws) => {
                let mut report = self.aws_export(None, only_new).await?;
                if report.was_skipped() {
                    return Ok(report);
                }
                report.merge(self.aws_offramp(None)?);
                Ok(report)
            }
            _ => {
                warn!(platform = %platform, "Unsupported offramp platform");
                Ok(Report::skipped(format!(
                    "Offramp from '{}' is not supported, use azure or aws.",
                    platform
                )))
            }
        }
    }

    /// Convert general records for a target platform and import them.
    pub async fn onramp(&self, platform: &str) -> ApimResult<Report> {
        info!(platform = %platform, "Starting onramp");
        match Platform::from_str(platform) {
            Ok(Platform::ApiHub) => {
                let mut report = self.apihub_onramp(None)?;
                if report.was_skipped() {
                    return Ok(report);
                }
                report.merge(self.apihub_import(None).await?);
                Ok(report)
            }
            _ => {
                warn!(platform = %platform, "Unsupported onramp platform");
                Ok(Report::skipped(format!(
                    "Onramp to '{}' is not supported, use apihub.",
                    platform
                )))
            }
        }
    }

    /// Offramp then onramp; the onramp is skipped when the offramp did not run.
    pub async fn sync(&self, offramp: &str, onramp: &str) -> ApimResult<Report> {
        let mut report = self.offramp(offramp, false).await?;
        if report.was_skipped() {
            return Ok(report);
        }
        report.merge(self.onramp(onramp).await?);
        Ok(report)
    }
}

fn unavailable(e: impl std::fmt::Display) -> Report {
    warn!(error = %e, "Credentials unavailable");
    let mut report = Report::new();
    report.failure(e.to_string());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> ApimService {
        ApimService::new(
            Store::new(dir.path()),
            ApigeeConfig::default(),
            AzureConfig::default(),
            AwsConfig::default(),
        )
        .unwrap()
        .with_google_auth(GoogleAuth::new(Client::new()))
    }

    #[tokio::test]
    async fn test_missing_configuration_is_a_diagnostic() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let report = service.apigee_export(None, false).await.unwrap();
        assert!(report.was_skipped());
        assert_eq!(report.to_string(), "No Apigee project given.");

        let report = service.azure_offramp(None).unwrap();
        assert_eq!(
            report.to_string(),
            "No subscription given for Azure API Management."
        );

        let report = service.aws_export(None, false).await.unwrap();
        assert_eq!(report.to_string(), "No AWS region given.");
    }

    #[tokio::test]
    async fn test_missing_google_credentials_is_a_diagnostic() {
        let dir = TempDir::new().unwrap();
        let service = ApimService {
            apigee: ApigeeConfig {
                project: Some("proj".into()),
                ..Default::default()
            },
            ..service(&dir)
        };

        let report = service.apigee_clean(None).await.unwrap();
        assert!(report.was_skipped());
        assert!(report.to_string().starts_with("No Google credentials found"));
    }

    #[tokio::test]
    async fn test_status_without_configuration_is_disconnected() {
        let dir = TempDir::new().unwrap();
        let status = service(&dir).status_all().await;

        assert!(!status.apigee.connected);
        assert!(!status.apihub.connected);
        assert!(!status.azure.connected);
        assert_eq!(status.aws.message, "No AWS region given.");
    }

    #[tokio::test]
    async fn test_unknown_platform_is_rejected() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let report = service.offramp("kong", false).await.unwrap();
        assert!(!report.is_success());
        assert!(report.to_string().contains("'kong' is not supported"));

        let report = service.sync("azure", "kong").await.unwrap();
        assert!(report.was_skipped());
    }
}
