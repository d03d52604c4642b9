use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{de_string_lenient, de_vec_lenient};

/// An API Gateway v2 API as stored under `aws/apiproxies`.
///
/// Built from the SDK's `Api` output, so only the fields the offramp needs
/// plus the descriptive ones worth keeping are modelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsApi {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub api_id: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub version: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub protocol_type: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub route_selection_expression: String,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub api_key_selection_expression: String,
    #[serde(default)]
    pub disable_schema_validation: bool,
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub warnings: Vec<String>,
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub import_info: Vec<String>,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub api_endpoint: String,
    #[serde(default)]
    pub api_gateway_managed: bool,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub created_date: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub disable_execute_api_endpoint: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_configuration: Option<AwsCorsConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCorsConfiguration {
    #[serde(default)]
    pub allow_credentials: bool,
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub allow_headers: Vec<String>,
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub allow_methods: Vec<String>,
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub allow_origins: Vec<String>,
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub expose_headers: Vec<String>,
    #[serde(default)]
    pub max_age: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_sparse_record() {
        let api: AwsApi = serde_json::from_str(
            r#"{"apiId":"a1b2","name":"Pets API","version":null,"apiEndpoint":"https://a1b2.execute-api.eu-west-1.amazonaws.com"}"#,
        )
        .unwrap();

        assert_eq!(api.api_id, "a1b2");
        assert_eq!(api.version, "");
        assert!(api.cors_configuration.is_none());
        assert!(api.tags.is_empty());
    }
}
