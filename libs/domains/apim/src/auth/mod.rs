//! Bearer tokens for the Google and Azure management APIs.
//!
//! Both chains return `Ok(None)` when no credential source is configured, so
//! callers can turn that into a diagnostic instead of an error. AWS
//! credentials are handled by the SDK's own provider chain.

pub mod azure;
pub mod google;

pub use azure::AzureAuth;
pub use google::GoogleAuth;

use crate::error::ApimError;

/// Scope requested for every Google Cloud call.
pub const GOOGLE_CLOUD_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Scope requested for Azure Resource Manager.
pub const AZURE_MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

fn auth_error(context: &str, e: impl std::fmt::Display) -> ApimError {
    ApimError::Auth(format!("{}: {}", context, e))
}
