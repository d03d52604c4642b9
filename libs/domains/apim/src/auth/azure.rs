use oauth2::{basic::BasicClient, AuthType, ClientId, ClientSecret, Scope, TokenResponse, TokenUrl};
use reqwest::Client;
use tracing::debug;

use super::{auth_error, AZURE_MANAGEMENT_SCOPE};
use crate::config::AzureConfig;
use crate::error::ApimResult;

const LOGIN_URL: &str = "https://login.microsoftonline.com";

/// Azure Resource Manager tokens: an explicit token (`--token` or
/// `AZURE_TOKEN`), else a client-credentials grant against the tenant.
#[derive(Debug, Clone)]
pub struct AzureAuth {
    client: Client,
    login_url: String,
}

impl AzureAuth {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            login_url: LOGIN_URL.to_string(),
        }
    }

    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    /// `None` when neither a token nor a complete client triple is configured.
    pub async fn access_token(&self, config: &AzureConfig) -> ApimResult<Option<String>> {
        if let Some(token) = &config.token {
            return Ok(Some(token.clone()));
        }

        let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
            config.tenant_id.as_deref(),
            config.client_id.as_deref(),
            config.client_secret.as_deref(),
        ) else {
            return Ok(None);
        };

        debug!(tenant = %tenant_id, client = %client_id, "Requesting Azure token");

        let token_url = TokenUrl::new(format!(
            "{}/{}/oauth2/v2.0/token",
            self.login_url.trim_end_matches('/'),
            tenant_id
        ))
        .map_err(|e| auth_error("Invalid Azure token URL", e))?;

        let oauth = BasicClient::new(ClientId::new(client_id.to_string()))
            .set_client_secret(ClientSecret::new(client_secret.to_string()))
            .set_auth_type(AuthType::RequestBody)
            .set_token_uri(token_url);

        let token = oauth
            .exchange_client_credentials()
            .add_scope(Scope::new(AZURE_MANAGEMENT_SCOPE.to_string()))
            .request_async(&self.client)
            .await
            .map_err(|e| auth_error("Azure client credentials grant failed", e))?;

        Ok(Some(token.access_token().secret().clone()))
    }
}
