//! Apigee API Hub (`apihub.googleapis.com/v1`).

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::check_status;
use crate::error::ApimResult;
use crate::models::{HubApi, HubApiVersion, HubApis, HubDeployment, HubDeployments, HubVersionSpec};
use crate::naming::HubNames;

const APIHUB_API: &str = "https://apihub.googleapis.com/v1";

#[derive(Debug, Clone)]
pub struct HubClient {
    client: Client,
    base_url: String,
    names: HubNames,
    token: String,
}

/// A list response that may continue on another page.
trait Paged: DeserializeOwned {
    type Item;
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

impl Paged for HubApis {
    type Item = HubApi;
    fn into_parts(self) -> (Vec<HubApi>, Option<String>) {
        (self.apis, self.next_page_token)
    }
}

impl Paged for HubDeployments {
    type Item = HubDeployment;
    fn into_parts(self) -> (Vec<HubDeployment>, Option<String>) {
        (self.deployments, self.next_page_token)
    }
}

impl HubClient {
    pub fn new(client: Client, project: &str, region: &str, token: &str) -> Self {
        Self {
            client,
            base_url: APIHUB_API.to_string(),
            names: HubNames::new(project, region),
            token: token.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn names(&self) -> &HubNames {
        &self.names
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), resource)
    }

    async fn list_all<P: Paged>(&self, collection: &str) -> ApimResult<Vec<P::Item>> {
        let url = self.url(&format!("{}/{}", self.names.parent(), collection));
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).bearer_auth(&self.token);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: P = check_status(request.send().await?).await?.json().await?;
            let (mut page_items, next) = page.into_parts();
            items.append(&mut page_items);

            match next.filter(|t| !t.is_empty()) {
                Some(next) => {
                    debug!(collection = %collection, "Fetching next page");
                    page_token = Some(next);
                }
                None => break,
            }
        }

        Ok(items)
    }

    pub async fn list_apis(&self) -> ApimResult<Vec<HubApi>> {
        self.list_all::<HubApis>("apis").await
    }

    pub async fn list_deployments(&self) -> ApimResult<Vec<HubDeployment>> {
        self.list_all::<HubDeployments>("deployments").await
    }

    async fn create<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        id_param: &str,
        id: &str,
        body: &T,
    ) -> ApimResult<()> {
        let response = self
            .client
            .post(self.url(collection))
            .query(&[(id_param, id)])
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    pub async fn create_api(&self, api_id: &str, api: &HubApi) -> ApimResult<()> {
        let collection = format!("{}/apis", self.names.parent());
        self.create(&collection, "apiId", api_id, api).await
    }

    pub async fn create_deployment(
        &self,
        deployment_id: &str,
        deployment: &HubDeployment,
    ) -> ApimResult<()> {
        let collection = format!("{}/deployments", self.names.parent());
        self.create(&collection, "deploymentId", deployment_id, deployment)
            .await
    }

    pub async fn create_version(
        &self,
        api_id: &str,
        version_id: &str,
        version: &HubApiVersion,
    ) -> ApimResult<()> {
        let collection = format!("{}/versions", self.names.api(api_id));
        self.create(&collection, "versionId", version_id, version)
            .await
    }

    pub async fn create_spec(
        &self,
        api_id: &str,
        version_id: &str,
        spec_id: &str,
        spec: &HubVersionSpec,
    ) -> ApimResult<()> {
        let collection = format!("{}/specs", self.names.version(api_id, version_id));
        self.create(&collection, "specId", spec_id, spec).await
    }

    /// Delete an API together with its versions and specs.
    pub async fn delete_api(&self, name: &str) -> ApimResult<()> {
        let response = self
            .client
            .delete(self.url(name))
            .query(&[("force", "true")])
            .bearer_auth(&self.token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    pub async fn delete_deployment(&self, name: &str) -> ApimResult<()> {
        let response = self
            .client
            .delete(self.url(name))
            .bearer_auth(&self.token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PARENT: &str = "/projects/proj/locations/europe-west1";

    fn client(server: &MockServer) -> HubClient {
        HubClient::new(Client::new(), "proj", "europe-west1", "tok").with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_list_apis_reads_every_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/apis", PARENT)))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "apis": [{"name": "projects/proj/locations/europe-west1/apis/orders"}],
                "nextPageToken": "p2"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/apis", PARENT)))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "apis": [{"name": "projects/proj/locations/europe-west1/apis/payments"}]
            })))
            .mount(&server)
            .await;

        let apis = client(&server).list_apis().await.unwrap();
        assert_eq!(apis.len(), 2);
        assert!(apis[1].name.ends_with("/payments"));
    }

    #[tokio::test]
    async fn test_create_version_targets_anchor_api() {
        let server = MockServer::start().await;
        let version = HubApiVersion {
            name: format!("{}/apis/orders/versions/orders-v2", &PARENT[1..]),
            display_name: "Orders".into(),
            ..Default::default()
        };
        Mock::given(method("POST"))
            .and(path(format!("{}/apis/orders/versions", PARENT)))
            .and(query_param("versionId", "orders-v2"))
            .and(body_json(&version))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .create_version("orders", "orders-v2", &version)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_api_forces() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/apis/orders", PARENT)))
            .and(query_param("force", "true"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .delete_api("projects/proj/locations/europe-west1/apis/orders")
            .await
            .unwrap();
    }
}
