//! API Management Sync Domain
//!
//! Moves API metadata between Apigee, Azure API Management, AWS API Gateway
//! and Apigee API Hub through a platform-neutral "general" record kept in a
//! local directory tree.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /v1/apim HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Config checks, credentials, client wiring
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Pipeline   │  ← Export, offramp, onramp, import, clean
//! └──┬───────┬──┘
//!    │       │
//! ┌──▼────┐ ┌▼──────────┐
//! │ Store │ │ Providers │  ← Local files / vendor REST APIs and SDKs
//! └───────┘ └───────────┘
//! ```
//!
//! Data flows `export` (vendor → vendor JSON on disk) → `offramp` (vendor
//! JSON → general record) → `onramp` (general record → target payloads) →
//! `import` (payloads → target platform).
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_apim::{handlers, ApimService};
//!
//! # fn main() -> Result<(), domain_apim::ApimError> {
//! let service = ApimService::from_env()?;
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod bundle;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod naming;
pub mod pipeline;
pub mod providers;
pub mod report;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::{ApigeeConfig, AwsConfig, AzureConfig, StoreConfig};
pub use error::{ApimError, ApimResult};
pub use models::{GeneralApi, Platform, PlatformStatus};
pub use report::Report;
pub use service::{ApimService, ApimStatus};
pub use store::Store;
