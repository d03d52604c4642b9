//! Records exchanged with vendors and kept in the local store.

pub mod apigee;
pub mod apihub;
pub mod aws;
pub mod azure;
pub mod general;

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

pub use apigee::{
    ApigeeDeveloper, ApigeeDeveloperApp, ApigeeEnvironment, ApigeeEnvironmentProxy,
    ApigeeProduct, ApigeeProxies, ApigeeProxy,
};
pub use apihub::{
    HubApi, HubApiVersion, HubApis, HubAttribute, HubAttributeEnumValues, HubAttributeValue,
    HubContents, HubDeployment, HubDeployments, HubDocumentation, HubOwner, HubVersionRecord,
    HubVersionSpec,
};
pub use aws::{AwsApi, AwsCorsConfiguration};
pub use azure::{
    AzureApi, AzureApiProperties, AzureApiSchema, AzureApiSchemaProperties, AzureApis,
    AzureService, AzureServiceProperties, AzureSubscriptionKeyParameterNames,
};
pub use general::GeneralApi;

/// Platforms that own a subtree of the local store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    Apigee,
    Azure,
    Aws,
    #[strum(serialize = "apihub")]
    #[serde(rename = "apihub")]
    ApiHub,
    General,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Apigee,
        Platform::Azure,
        Platform::Aws,
        Platform::ApiHub,
        Platform::General,
    ];
}

/// Connectivity of one platform as reported by `status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlatformStatus {
    pub connected: bool,
    pub message: String,
}

impl PlatformStatus {
    pub fn connected(message: impl Into<String>) -> Self {
        Self {
            connected: true,
            message: message.into(),
        }
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self {
            connected: false,
            message: message.into(),
        }
    }
}

/// Vendors send `null`, numbers or booleans where a string is documented.
pub(crate) fn de_string_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(v) => v,
        serde_json::Value::Number(v) => v.to_string(),
        serde_json::Value::Bool(v) => v.to_string(),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            String::new()
        }
    })
}

/// `null` lists become empty lists.
pub(crate) fn de_vec_lenient<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
