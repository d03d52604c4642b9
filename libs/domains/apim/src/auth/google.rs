//! Google application default credentials.
//!
//! Resolution order:
//! 1. a token passed explicitly (`--token`, `APIGEE_TOKEN`)
//! 2. `GOOGLE_OAUTH_ACCESS_TOKEN`
//! 3. the credentials file named by `GOOGLE_APPLICATION_CREDENTIALS`, or the
//!    one `gcloud auth application-default login` writes
//! 4. the GCE metadata server

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use core_config::env_optional;
use oauth2::{
    basic::BasicClient, ClientId, ClientSecret, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{auth_error, GOOGLE_CLOUD_SCOPE};
use crate::error::{ApimError, ApimResult};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Contents of an application default credentials file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CredentialsFile {
    AuthorizedUser {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
    ServiceAccount {
        client_email: String,
        private_key: String,
        #[serde(default)]
        token_uri: Option<String>,
    },
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct GoogleAuth {
    client: Client,
    env_token: Option<String>,
    credentials_file: Option<PathBuf>,
    token_url: String,
    metadata_url: Option<String>,
}

impl GoogleAuth {
    /// No ambient sources; only explicit tokens and what the builder adds.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            env_token: None,
            credentials_file: None,
            token_url: TOKEN_URL.to_string(),
            metadata_url: None,
        }
    }

    /// The full chain, reading the process environment once.
    pub fn from_env(client: Client) -> Self {
        let credentials_file = env_optional("GOOGLE_APPLICATION_CREDENTIALS")
            .map(PathBuf::from)
            .or_else(well_known_credentials_file)
            .filter(|path| path.is_file());

        Self {
            env_token: env_optional("GOOGLE_OAUTH_ACCESS_TOKEN"),
            credentials_file,
            metadata_url: Some(METADATA_TOKEN_URL.to_string()),
            ..Self::new(client)
        }
    }

    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = Some(url.into());
        self
    }

    /// Resolve a bearer token; `None` when no source yields one.
    pub async fn access_token(&self, explicit: Option<&str>) -> ApimResult<Option<String>> {
        if let Some(token) = explicit.filter(|t| !t.is_empty()) {
            return Ok(Some(token.to_string()));
        }
        if let Some(token) = &self.env_token {
            return Ok(Some(token.clone()));
        }

        if let Some(path) = &self.credentials_file {
            return self.token_from_file(path).await.map(Some);
        }

        if let Some(url) = &self.metadata_url {
            match self.token_from_metadata(url).await {
                Ok(token) => return Ok(Some(token)),
                Err(e) => debug!(error = %e, "Metadata server unavailable"),
            }
        }

        Ok(None)
    }

    async fn token_from_file(&self, path: &Path) -> ApimResult<String> {
        let bytes = std::fs::read(path)?;
        let credentials: CredentialsFile = serde_json::from_slice(&bytes)
            .map_err(|e| auth_error("Unsupported credentials file", e))?;

        match credentials {
            CredentialsFile::AuthorizedUser {
                client_id,
                client_secret,
                refresh_token,
            } => {
                debug!(path = %path.display(), "Refreshing user credentials");
                self.refresh_user_token(client_id, client_secret, refresh_token)
                    .await
            }
            CredentialsFile::ServiceAccount {
                client_email,
                private_key,
                token_uri,
            } => {
                debug!(account = %client_email, "Signing service account assertion");
                let token_url = token_uri.unwrap_or_else(|| self.token_url.clone());
                self.service_account_token(&client_email, &private_key, &token_url)
                    .await
            }
        }
    }

    async fn refresh_user_token(
        &self,
        client_id: String,
        client_secret: String,
        refresh_token: String,
    ) -> ApimResult<String> {
        let token_url =
            TokenUrl::new(self.token_url.clone()).map_err(|e| auth_error("Invalid token URL", e))?;
        let oauth = BasicClient::new(ClientId::new(client_id))
            .set_client_secret(ClientSecret::new(client_secret))
            .set_token_uri(token_url);

        let token = oauth
            .exchange_refresh_token(&RefreshToken::new(refresh_token))
            .add_scope(Scope::new(GOOGLE_CLOUD_SCOPE.to_string()))
            .request_async(&self.client)
            .await
            .map_err(|e| auth_error("Failed to refresh Google credentials", e))?;

        Ok(token.access_token().secret().clone())
    }

    async fn service_account_token(
        &self,
        client_email: &str,
        private_key: &str,
        token_url: &str,
    ) -> ApimResult<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| auth_error("System clock before epoch", e))?
            .as_secs();

        let claims = AssertionClaims {
            iss: client_email,
            scope: GOOGLE_CLOUD_SCOPE,
            aud: token_url,
            iat: now,
            exp: now + 3600,
        };

        let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
        let key = jsonwebtoken::EncodingKey::from_rsa_pem(private_key.as_bytes())
            .map_err(|e| auth_error("Invalid service account key", e))?;
        let assertion = jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| auth_error("Failed to sign assertion", e))?;

        let response = self
            .client
            .post(token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;

        if !response.status().is_success() {
            let err = ApimError::from_response(response).await;
            warn!(error = %err, "Service account token exchange failed");
            return Err(auth_error("Token exchange failed", err));
        }

        Ok(response.json::<AccessTokenResponse>().await?.access_token)
    }

    async fn token_from_metadata(&self, url: &str) -> ApimResult<String> {
        let response = self
            .client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .timeout(Duration::from_secs(2))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApimError::from_response(response).await);
        }

        Ok(response.json::<AccessTokenResponse>().await?.access_token)
    }
}

fn well_known_credentials_file() -> Option<PathBuf> {
    let base = env_optional("CLOUDSDK_CONFIG").map(PathBuf::from).or_else(|| {
        if cfg!(windows) {
            env_optional("APPDATA").map(|dir| PathBuf::from(dir).join("gcloud"))
        } else {
            env_optional("HOME").map(|dir| PathBuf::from(dir).join(".config").join("gcloud"))
        }
    })?;
    Some(base.join("application_default_credentials.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_explicit_token_wins() {
        let auth = GoogleAuth::new(Client::new());
        let token = auth.access_token(Some("ya29.explicit")).await.unwrap();
        assert_eq!(token.as_deref(), Some("ya29.explicit"));
    }

    #[tokio::test]
    async fn test_no_sources_yield_none() {
        let auth = GoogleAuth::new(Client::new());
        assert_eq!(auth.access_token(None).await.unwrap(), None);
        assert_eq!(auth.access_token(Some("")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_authorized_user_file_refreshes_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=1%2F%2Frefresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.refreshed",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("adc.json");
        std::fs::write(
            &file,
            r#"{"type":"authorized_user","client_id":"cid","client_secret":"secret","refresh_token":"1//refresh"}"#,
        )
        .unwrap();

        let auth = GoogleAuth::new(Client::new())
            .with_credentials_file(&file)
            .with_token_url(format!("{}/token", server.uri()));

        let token = auth.access_token(None).await.unwrap();
        assert_eq!(token.as_deref(), Some("ya29.refreshed"));
    }

    #[tokio::test]
    async fn test_unknown_credentials_type_is_auth_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("adc.json");
        std::fs::write(&file, r#"{"type":"external_account"}"#).unwrap();

        let auth = GoogleAuth::new(Client::new()).with_credentials_file(&file);
        let err = auth.access_token(None).await.unwrap_err();
        assert!(matches!(err, ApimError::Auth(_)));
    }

    #[tokio::test]
    async fn test_metadata_server_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/token"))
            .and(header("Metadata-Flavor", "Google"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.metadata",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let auth =
            GoogleAuth::new(Client::new()).with_metadata_url(format!("{}/token", server.uri()));
        let token = auth.access_token(None).await.unwrap();
        assert_eq!(token.as_deref(), Some("ya29.metadata"));
    }

    #[tokio::test]
    async fn test_metadata_failure_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let auth =
            GoogleAuth::new(Client::new()).with_metadata_url(format!("{}/token", server.uri()));
        assert_eq!(auth.access_token(None).await.unwrap(), None);
    }
}
