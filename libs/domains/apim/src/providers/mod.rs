//! Vendor API clients.
//!
//! Each client wraps one management API: it only speaks HTTP (or the vendor
//! SDK) and returns typed records. Deciding what to fetch, where to store it
//! and how to report failures is left to [`crate::pipeline`].

pub mod apigee;
pub mod apihub;
pub mod aws;
pub mod azure;

pub use apigee::ApigeeClient;
pub use apihub::HubClient;
pub use aws::{ApiGateway, SdkApiGateway};
pub use azure::AzureClient;

#[cfg(test)]
pub use aws::MockApiGateway;

use reqwest::Response;

use crate::error::{ApimError, ApimResult};

/// Pass successful responses through; turn anything else into [`ApimError::Api`].
pub(crate) async fn check_status(response: Response) -> ApimResult<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ApimError::from_response(response).await)
    }
}
