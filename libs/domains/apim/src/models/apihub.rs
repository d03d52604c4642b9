use serde::{Deserialize, Serialize};

use super::{de_string_lenient, de_vec_lenient};

/// One page of `locations/{region}/apis`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubApis {
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub apis: Vec<HubApi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// One page of `locations/{region}/deployments`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubDeployments {
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub deployments: Vec<HubDeployment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubApi {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub display_name: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub description: String,
    #[serde(default)]
    pub documentation: HubDocumentation,
    #[serde(default)]
    pub owner: HubOwner,
    /// Output only; filled in by the hub
    #[serde(
        default,
        deserialize_with = "de_vec_lenient",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub versions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubDocumentation {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub external_uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubOwner {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub display_name: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubDeployment {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub display_name: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub description: String,
    #[serde(default)]
    pub documentation: HubDocumentation,
    #[serde(default)]
    pub deployment_type: HubAttribute,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub resource_uri: String,
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub endpoints: Vec<String>,
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub api_versions: Vec<String>,
}

/// A version as sent to the hub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubApiVersion {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub display_name: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub description: String,
    #[serde(default)]
    pub documentation: HubDocumentation,
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub deployments: Vec<String>,
}

/// A version as kept on disk: the hub payload plus the id of the API it belongs to.
///
/// `base_api_name` never leaves the local store; import strips it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubVersionRecord {
    #[serde(flatten)]
    pub version: HubApiVersion,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub base_api_name: String,
}

/// An enum-valued system attribute, e.g. `system-deployment-type`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubAttribute {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub attribute: String,
    #[serde(default)]
    pub enum_values: HubAttributeEnumValues,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubAttributeEnumValues {
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub values: Vec<HubAttributeValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubAttributeValue {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub display_name: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub description: String,
    #[serde(default)]
    pub immutable: bool,
}

impl HubAttribute {
    /// Attribute holding a single immutable system value.
    pub fn system(attribute: String, id: &str, display_name: &str) -> Self {
        Self {
            attribute,
            enum_values: HubAttributeEnumValues {
                values: vec![HubAttributeValue {
                    id: id.to_string(),
                    display_name: display_name.to_string(),
                    description: display_name.to_string(),
                    immutable: true,
                }],
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubVersionSpec {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub display_name: String,
    #[serde(default)]
    pub spec_type: HubAttribute,
    #[serde(default)]
    pub contents: HubContents,
    #[serde(default)]
    pub documentation: HubDocumentation,
}

/// Spec payload; `contents` is base64.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubContents {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub mime_type: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub contents: String,
}
