//! Per-platform settings, read from the environment and overridden by CLI flags.
//!
//! Every field is optional: operations check what they need and report a
//! diagnostic instead of failing when something is missing.

use std::path::PathBuf;

use core_config::{env_optional, env_or_default, ConfigError, FromEnv};

/// Default location of the local store, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data/src/main";

/// Google project settings, shared by Apigee and API Hub.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApigeeConfig {
    pub project: Option<String>,
    pub region: Option<String>,
    /// Bearer token; resolved from application default credentials when absent
    pub token: Option<String>,
    pub environment: Option<String>,
}

impl FromEnv for ApigeeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            project: env_optional("APIGEE_PROJECT"),
            region: env_optional("APIGEE_REGION"),
            token: env_optional("APIGEE_TOKEN"),
            environment: env_optional("APIGEE_ENVIRONMENT"),
        })
    }
}

impl ApigeeConfig {
    /// Values set in `overrides` win.
    pub fn merge(self, overrides: ApigeeConfig) -> Self {
        Self {
            project: overrides.project.or(self.project),
            region: overrides.region.or(self.region),
            token: overrides.token.or(self.token),
            environment: overrides.environment.or(self.environment),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AzureConfig {
    pub subscription_id: Option<String>,
    pub resource_group: Option<String>,
    pub service_name: Option<String>,
    pub token: Option<String>,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl FromEnv for AzureConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            subscription_id: env_optional("AZURE_SUBSCRIPTION_ID"),
            resource_group: env_optional("AZURE_RESOURCE_GROUP"),
            service_name: env_optional("AZURE_SERVICE_NAME"),
            token: env_optional("AZURE_TOKEN"),
            tenant_id: env_optional("AZURE_TENANT_ID"),
            client_id: env_optional("AZURE_CLIENT_ID"),
            client_secret: env_optional("AZURE_CLIENT_SECRET"),
        })
    }
}

impl AzureConfig {
    pub fn merge(self, overrides: AzureConfig) -> Self {
        Self {
            subscription_id: overrides.subscription_id.or(self.subscription_id),
            resource_group: overrides.resource_group.or(self.resource_group),
            service_name: overrides.service_name.or(self.service_name),
            token: overrides.token.or(self.token),
            tenant_id: overrides.tenant_id.or(self.tenant_id),
            client_id: overrides.client_id.or(self.client_id),
            client_secret: overrides.client_secret.or(self.client_secret),
        }
    }

    /// Subscription, resource group and service name, or the message
    /// explaining which one is missing.
    pub fn service(&self) -> Result<AzureServiceRef<'_>, &'static str> {
        let subscription_id = self
            .subscription_id
            .as_deref()
            .ok_or("No subscription given")?;
        let resource_group = self
            .resource_group
            .as_deref()
            .ok_or("No resource group given")?;
        let service_name = self.service_name.as_deref().ok_or("No service name given")?;

        Ok(AzureServiceRef {
            subscription_id,
            resource_group,
            service_name,
        })
    }
}

/// Coordinates of one API Management service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AzureServiceRef<'a> {
    pub subscription_id: &'a str,
    pub resource_group: &'a str,
    pub service_name: &'a str,
}

impl AzureServiceRef<'_> {
    /// ARM path of the service, without host or api-version.
    pub fn resource_path(&self) -> String {
        format!(
            "subscriptions/{}/resourceGroups/{}/providers/Microsoft.ApiManagement/service/{}",
            self.subscription_id, self.resource_group, self.service_name
        )
    }

    /// Azure portal link to one API of this service.
    pub fn portal_uri(&self, api_name: &str) -> String {
        format!(
            "https://portal.azure.com/#resource/{}/overview?apiName={}",
            self.resource_path(),
            api_name
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsConfig {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl FromEnv for AwsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            region: env_optional("AWS_REGION"),
            access_key_id: env_optional("AWS_ACCESS_KEY_ID"),
            secret_access_key: env_optional("AWS_SECRET_ACCESS_KEY"),
        })
    }
}

impl AwsConfig {
    pub fn merge(self, overrides: AwsConfig) -> Self {
        Self {
            region: overrides.region.or(self.region),
            access_key_id: overrides.access_key_id.or(self.access_key_id),
            secret_access_key: overrides.secret_access_key.or(self.secret_access_key),
        }
    }

    /// Static credentials, only when both halves are present.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(key), Some(secret)) => Some((key.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

/// Where the local store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl FromEnv for StoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            data_dir: PathBuf::from(env_or_default("APIMSYNC_DATA_DIR", DEFAULT_DATA_DIR)),
        })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apigee_config_from_env() {
        temp_env::with_vars(
            [
                ("APIGEE_PROJECT", Some("my-project")),
                ("APIGEE_REGION", Some("europe-west1")),
                ("APIGEE_TOKEN", Some("")),
                ("APIGEE_ENVIRONMENT", None),
            ],
            || {
                let config = ApigeeConfig::from_env().unwrap();
                assert_eq!(config.project.as_deref(), Some("my-project"));
                assert_eq!(config.region.as_deref(), Some("europe-west1"));
                assert_eq!(config.token, None);
                assert_eq!(config.environment, None);
            },
        );
    }

    #[test]
    fn test_flags_override_env_field_by_field() {
        let env = ApigeeConfig {
            project: Some("env-project".into()),
            region: Some("env-region".into()),
            ..Default::default()
        };
        let flags = ApigeeConfig {
            project: Some("flag-project".into()),
            environment: Some("test".into()),
            ..Default::default()
        };

        let merged = env.merge(flags);
        assert_eq!(merged.project.as_deref(), Some("flag-project"));
        assert_eq!(merged.region.as_deref(), Some("env-region"));
        assert_eq!(merged.environment.as_deref(), Some("test"));
    }

    #[test]
    fn test_azure_service_reports_first_missing_field() {
        let mut config = AzureConfig::default();
        assert_eq!(config.service().unwrap_err(), "No subscription given");

        config.subscription_id = Some("sub".into());
        assert_eq!(config.service().unwrap_err(), "No resource group given");

        config.resource_group = Some("rg".into());
        assert_eq!(config.service().unwrap_err(), "No service name given");

        config.service_name = Some("apim".into());
        let service = config.service().unwrap();
        assert_eq!(
            service.resource_path(),
            "subscriptions/sub/resourceGroups/rg/providers/Microsoft.ApiManagement/service/apim"
        );
        assert!(service.portal_uri("orders-api").ends_with("/overview?apiName=orders-api"));
    }

    #[test]
    fn test_aws_static_credentials_need_both_halves() {
        let half = AwsConfig {
            access_key_id: Some("AKIA".into()),
            ..Default::default()
        };
        assert!(half.static_credentials().is_none());

        let full = AwsConfig {
            access_key_id: Some("AKIA".into()),
            secret_access_key: Some("secret".into()),
            ..Default::default()
        };
        assert_eq!(full.static_credentials(), Some(("AKIA", "secret")));
    }

    #[test]
    fn test_store_config_default_dir() {
        temp_env::with_var_unset("APIMSYNC_DATA_DIR", || {
            let config = StoreConfig::from_env().unwrap();
            assert_eq!(config.data_dir, PathBuf::from("data/src/main"));
        });

        temp_env::with_var("APIMSYNC_DATA_DIR", Some("/tmp/apim"), || {
            let config = StoreConfig::from_env().unwrap();
            assert_eq!(config.data_dir, PathBuf::from("/tmp/apim"));
        });
    }
}
