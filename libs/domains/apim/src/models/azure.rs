use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::{de_string_lenient, de_vec_lenient};
use crate::naming::is_safe_name;

/// An API Management service (`Microsoft.ApiManagement/service/{name}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureService {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub location: String,
    #[serde(default)]
    pub properties: AzureServiceProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureServiceProperties {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub developer_portal_url: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub gateway_url: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub gateway_regional_url: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub portal_url: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub publisher_email: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub publisher_name: String,
}

/// One page of `service/{name}/apis`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureApis {
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub value: Vec<AzureApi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AzureApi {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "de_string_lenient")]
    pub kind: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub name: String,
    #[serde(default)]
    pub properties: AzureApiProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureApiProperties {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub display_name: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub api_revision: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub subscription_required: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub service_url: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub path: String,
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub protocols: Vec<String>,
    #[serde(default)]
    pub subscription_key_parameter_names: AzureSubscriptionKeyParameterNames,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub api_revision_description: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub api_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AzureSubscriptionKeyParameterNames {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub header: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub query: String,
}

/// `service/{name}/schemas/{api}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AzureApiSchema {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "de_string_lenient")]
    pub kind: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub name: String,
    #[serde(default)]
    pub properties: AzureApiSchemaProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureApiSchemaProperties {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub schema_type: String,
    /// Either the document text or, for JSON schemas, an embedded object
    /// kept exactly as the service sent it.
    #[serde(default)]
    pub document: Option<Box<RawValue>>,
}

impl AzureApiSchemaProperties {
    /// The schema document as file contents.
    pub fn document_text(&self) -> crate::ApimResult<Option<String>> {
        let Some(raw) = &self.document else {
            return Ok(None);
        };
        let text = raw.get();
        if text.starts_with('"') {
            Ok(Some(serde_json::from_str(text)?))
        } else {
            Ok(Some(text.to_string()))
        }
    }

    /// File extension for the stored document; `schema.json` when unknown
    /// or not usable as part of a file name.
    pub fn file_extension(&self) -> &str {
        if is_safe_name(&self.schema_type) {
            &self.schema_type
        } else {
            "json"
        }
    }
}
