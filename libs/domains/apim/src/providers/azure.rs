//! Azure Resource Manager, `Microsoft.ApiManagement` provider.

use reqwest::{Client, StatusCode};
use tracing::debug;

use super::check_status;
use crate::config::AzureServiceRef;
use crate::error::ApimResult;
use crate::models::{AzureApi, AzureApiSchema, AzureApis};

const MANAGEMENT_API: &str = "https://management.azure.com";
const API_VERSION: &str = "2022-08-01";

#[derive(Debug, Clone)]
pub struct AzureClient {
    client: Client,
    base_url: String,
    service_path: String,
    token: String,
}

impl AzureClient {
    pub fn new(client: Client, service: AzureServiceRef<'_>, token: &str) -> Self {
        Self {
            client,
            base_url: MANAGEMENT_API.to_string(),
            service_path: service.resource_path(),
            token: token.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn service_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.service_path)
    }

    /// The service resource, kept verbatim.
    pub async fn get_service(&self) -> ApimResult<serde_json::Value> {
        let response = self
            .client
            .get(self.service_url())
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&self.token)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// Every API of the service, following `nextLink` across pages.
    pub async fn list_apis(&self) -> ApimResult<Vec<AzureApi>> {
        let mut apis = Vec::new();

        let first = self
            .client
            .get(format!("{}/apis", self.service_url()))
            .query(&[("api-version", API_VERSION)]);
        let mut page: AzureApis = check_status(first.bearer_auth(&self.token).send().await?)
            .await?
            .json()
            .await?;

        loop {
            apis.append(&mut page.value);
            let Some(next) = page.next_link.take().filter(|link| !link.is_empty()) else {
                break;
            };
            debug!(next = %next, "Fetching next page of Azure APIs");
            let response = self.client.get(next).bearer_auth(&self.token).send().await?;
            page = check_status(response).await?.json().await?;
        }

        Ok(apis)
    }

    /// Schema of one API; `None` when the service has none for it.
    pub async fn get_api_schema(&self, api_name: &str) -> ApimResult<Option<AzureApiSchema>> {
        let response = self
            .client
            .get(format!("{}/schemas/{}", self.service_url(), api_name))
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&self.token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(check_status(response).await?.json().await?))
    }
}
