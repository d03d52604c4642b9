use serde::{Deserialize, Serialize};

use super::{de_string_lenient, de_vec_lenient};

/// Response of `organizations/{org}/apis?includeRevisions=true`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApigeeProxies {
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub proxies: Vec<ApigeeProxy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApigeeProxy {
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub revision: Vec<String>,
    #[serde(default, deserialize_with = "de_string_lenient")]
    pub api_proxy_type: String,
}

impl ApigeeProxy {
    /// Highest numeric revision; non-numeric revisions are ignored.
    pub fn latest_revision(&self) -> Option<&str> {
        self.revision
            .iter()
            .filter_map(|rev| rev.parse::<u64>().ok().map(|n| (n, rev.as_str())))
            .max_by_key(|(n, _)| *n)
            .map(|(_, rev)| rev)
    }
}

/// `environments/<env>/deployments.json`: which proxies belong to an environment.
///
/// Append-only; entries are unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApigeeEnvironment {
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub proxies: Vec<ApigeeEnvironmentProxy>,
    #[serde(default, deserialize_with = "de_vec_lenient")]
    pub sharedflows: Vec<ApigeeEnvironmentProxy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApigeeEnvironmentProxy {
    pub name: String,
}

impl ApigeeEnvironment {
    pub fn contains_proxy(&self, name: &str) -> bool {
        self.proxies.iter().any(|p| p.name == name)
    }

    /// Returns `false` when the proxy was already listed.
    pub fn add_proxy(&mut self, name: &str) -> bool {
        if self.contains_proxy(name) {
            return false;
        }
        self.proxies.push(ApigeeEnvironmentProxy {
            name: name.to_string(),
        });
        true
    }

    pub fn proxy_names(&self) -> Vec<String> {
        self.proxies.iter().map(|p| p.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApigeeDeveloper {
    pub email: String,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApigeeDeveloperApp {
    pub developer_email: String,
    pub name: String,
    pub display_name: String,
    pub api_products: Vec<String>,
    pub expiry_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApigeeProduct {
    pub name: String,
    pub display_name: String,
    pub scopes: Vec<String>,
    pub environments: Vec<String>,
    pub api_resources: Vec<String>,
    pub proxies: Vec<String>,
}

impl ApigeeDeveloper {
    pub fn test_fixture() -> Self {
        Self {
            email: "test@example.com".to_string(),
            user_name: "testUser".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        }
    }
}

impl ApigeeProduct {
    /// Catch-all product granting access to the given proxies.
    pub fn test_fixture(proxies: Vec<String>) -> Self {
        Self {
            name: "test_product".to_string(),
            display_name: "Test Product".to_string(),
            scopes: Vec::new(),
            environments: Vec::new(),
            api_resources: vec!["/".to_string()],
            proxies,
        }
    }
}

impl ApigeeDeveloperApp {
    pub fn test_fixture(developer: &ApigeeDeveloper, product: &ApigeeProduct) -> Self {
        Self {
            developer_email: developer.email.clone(),
            name: "test_app".to_string(),
            display_name: "Test App".to_string(),
            api_products: vec![product.name.clone()],
            expiry_type: "never".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_revision_is_numeric_max() {
        let proxy = ApigeeProxy {
            name: "orders".into(),
            revision: vec!["2".into(), "10".into(), "9".into(), "draft".into()],
            ..Default::default()
        };
        assert_eq!(proxy.latest_revision(), Some("10"));

        let empty = ApigeeProxy::default();
        assert_eq!(empty.latest_revision(), None);
    }

    #[test]
    fn test_ledger_add_is_unique() {
        let mut ledger: ApigeeEnvironment =
            serde_json::from_str(r#"{"proxies":[{"name":"a"}]}"#).unwrap();

        assert!(!ledger.add_proxy("a"));
        assert!(ledger.add_proxy("b"));
        assert_eq!(ledger.proxy_names(), vec!["a", "b"]);
        assert!(ledger.sharedflows.is_empty());
    }

    #[test]
    fn test_proxies_tolerate_null_lists() {
        let proxies: ApigeeProxies =
            serde_json::from_str(r#"{"proxies":[{"name":"a","revision":null}]}"#).unwrap();
        assert_eq!(proxies.proxies.len(), 1);
        assert!(proxies.proxies[0].revision.is_empty());
    }

    #[test]
    fn test_fixtures_link_product_and_app() {
        let developer = ApigeeDeveloper::test_fixture();
        let product = ApigeeProduct::test_fixture(vec!["orders".into()]);
        let app = ApigeeDeveloperApp::test_fixture(&developer, &product);

        assert_eq!(app.developer_email, "test@example.com");
        assert_eq!(app.api_products, vec!["test_product"]);
        assert_eq!(product.api_resources, vec!["/"]);
    }
}
