//! Apigee Management API (`apigee.googleapis.com/v1`).

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

use super::check_status;
use crate::error::ApimResult;
use crate::models::ApigeeProxies;

const APIGEE_API: &str = "https://apigee.googleapis.com/v1";

#[derive(Debug, Clone)]
pub struct ApigeeClient {
    client: Client,
    base_url: String,
    organization: String,
    token: String,
}

impl ApigeeClient {
    pub fn new(client: Client, organization: &str, token: &str) -> Self {
        Self {
            client,
            base_url: APIGEE_API.to_string(),
            organization: organization.to_string(),
            token: token.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    fn apis_url(&self) -> String {
        format!(
            "{}/organizations/{}/apis",
            self.base_url.trim_end_matches('/'),
            self.organization
        )
    }

    /// All proxies with their revision numbers.
    pub async fn list_proxies(&self) -> ApimResult<ApigeeProxies> {
        let response = self
            .client
            .get(self.apis_url())
            .query(&[("includeRevisions", "true")])
            .bearer_auth(&self.token)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// The zip bundle of one revision.
    pub async fn proxy_bundle(&self, name: &str, revision: &str) -> ApimResult<Vec<u8>> {
        let url = format!("{}/{}/revisions/{}", self.apis_url(), name, revision);
        debug!(api = %name, revision = %revision, "Downloading bundle");

        let response = self
            .client
            .get(url)
            .query(&[("format", "bundle")])
            .bearer_auth(&self.token)
            .send()
            .await?;

        Ok(check_status(response).await?.bytes().await?.to_vec())
    }

    /// Upload a bundle as a new proxy (or a new revision of an existing one).
    pub async fn import_proxy(&self, name: &str, archive: &Path) -> ApimResult<()> {
        let bytes = tokio::fs::read(archive).await?;
        let file_name = archive
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.zip", name));

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/zip")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.apis_url())
            .query(&[("name", name), ("action", "import")])
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    pub async fn delete_proxy(&self, name: &str) -> ApimResult<()> {
        let response = self
            .client
            .delete(format!("{}/{}", self.apis_url(), name))
            .bearer_auth(&self.token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}
