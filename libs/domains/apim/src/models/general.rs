use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::naming::strip_version_suffix;

/// The platform-neutral record of one API ("general" format).
///
/// Field order is the on-disk order; keep it stable so rewriting an
/// unchanged record produces identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralApi {
    /// Unique slug, also the directory key in the local store
    pub name: String,
    pub display_name: String,
    pub version: String,
    pub description: String,
    pub owner_email: String,
    pub owner_name: String,
    pub documentation_url: String,
    pub gateway_url: String,
    pub base_path: String,
    pub platform_id: String,
    pub platform_name: String,
    pub platform_resource_uri: String,
}

impl GeneralApi {
    /// A record without a version is the root of its group.
    pub fn is_root(&self) -> bool {
        self.version.is_empty()
    }

    /// Records sharing a key are versions of the same API.
    ///
    /// The base path identifies the API when the platform has one; otherwise
    /// the name with any `-v<digits>` suffix removed.
    pub fn grouping_key(&self) -> String {
        if self.base_path.is_empty() {
            strip_version_suffix(&self.name)
        } else {
            self.base_path.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_in_declaration_order() {
        let api = GeneralApi {
            name: "orders-api".into(),
            base_path: "orders".into(),
            platform_id: "azure".into(),
            ..Default::default()
        };

        let json = serde_json::to_string(&api).unwrap();
        assert!(json.starts_with(r#"{"name":"orders-api","displayName":"""#));
        assert!(json.contains(r#""basePath":"orders""#));
        assert!(json.contains(r#""platformResourceUri":"""#));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let api: GeneralApi = serde_json::from_str(r#"{"name":"orders"}"#).unwrap();
        assert_eq!(api.name, "orders");
        assert!(api.is_root());
    }

    #[test]
    fn test_grouping_key_prefers_base_path() {
        let with_path = GeneralApi {
            name: "orders-v2".into(),
            base_path: "orders".into(),
            ..Default::default()
        };
        assert_eq!(with_path.grouping_key(), "orders");

        let without_path = GeneralApi {
            name: "payments-v3".into(),
            ..Default::default()
        };
        assert_eq!(without_path.grouping_key(), "payments");
    }
}
