//! Name derivation shared by every platform.
//!
//! Canonical names double as directory keys in the local store, so they must
//! be filesystem-safe and stable across runs.

use regex::Regex;
use std::sync::LazyLock;

static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-v\d+$").expect("static regex"));

static DISPLAY_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" v\d+").expect("static regex"));

/// Lowercase and hyphenate a vendor name: `"My API v2"` → `"my-api-v2"`.
pub fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// Drop a trailing `-v<digits>`: `"orders-v2"` → `"orders"`.
///
/// Only used when grouping versions under a root API; stored names keep
/// their suffix.
pub fn strip_version_suffix(name: &str) -> String {
    VERSION_SUFFIX.replace(name, "").into_owned()
}

/// Remove ` v<digits>` tokens from a display name: `"Orders v2"` → `"Orders"`.
pub fn strip_display_version(display_name: &str) -> String {
    DISPLAY_VERSION.replace_all(display_name, "").into_owned()
}

/// Azure keeps every revision as its own API named `<api>;rev=<n>`.
pub fn is_revision_name(name: &str) -> bool {
    name.contains(";rev=")
}

/// Names whose directory would escape the store or collide with dotfiles.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && name != ".."
}

/// Resource names in API Hub, all rooted at `projects/{project}/locations/{region}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubNames {
    parent: String,
}

impl HubNames {
    pub fn new(project: &str, region: &str) -> Self {
        Self {
            parent: format!("projects/{}/locations/{}", project, region),
        }
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn api(&self, api_id: &str) -> String {
        format!("{}/apis/{}", self.parent, api_id)
    }

    pub fn deployment(&self, deployment_id: &str) -> String {
        format!("{}/deployments/{}", self.parent, deployment_id)
    }

    pub fn version(&self, api_id: &str, version_id: &str) -> String {
        format!("{}/versions/{}", self.api(api_id), version_id)
    }

    pub fn spec(&self, api_id: &str, version_id: &str, spec_id: &str) -> String {
        format!("{}/specs/{}", self.version(api_id, version_id), spec_id)
    }

    pub fn attribute(&self, attribute_id: &str) -> String {
        format!("{}/attributes/{}", self.parent, attribute_id)
    }
}
