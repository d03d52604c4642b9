use tracing::{info, warn};

use super::selected;
use crate::config::AzureServiceRef;
use crate::error::ApimResult;
use crate::models::{AzureApi, AzureService, GeneralApi, Platform, PlatformStatus};
use crate::naming::{is_revision_name, slugify};
use crate::providers::AzureClient;
use crate::report::Report;
use crate::store::{Store, OPENAPI_FILE};

pub const PLATFORM_ID: &str = "azure";
pub const PLATFORM_NAME: &str = "Azure API Management";

const SCHEMA_DEFINITION_FILE: &str = "schema-definition.json";
const SCHEMA_JSON_FILE: &str = "schema.json";

pub async fn status(client: &AzureClient, service: AzureServiceRef<'_>) -> PlatformStatus {
    match client.get_service().await {
        Ok(_) => PlatformStatus::connected(format!(
            "Connected to Azure API Management service {}.",
            service.service_name
        )),
        Err(e) => PlatformStatus::disconnected(e.to_string()),
    }
}

/// Persist the service resource as `azure/<service>.json`.
pub async fn export_service(
    store: &Store,
    client: &AzureClient,
    service: AzureServiceRef<'_>,
) -> ApimResult<Report> {
    let mut report = Report::new();
    match client.get_service().await {
        Ok(record) => {
            store.write_json(&store.azure_service_path(service.service_name), &record)?;
            report.line(format!("Exported service {}.", service.service_name));
        }
        Err(e) => {
            warn!(service = %service.service_name, error = %e, "Service export failed");
            report.failure(format!(
                "Error exporting service {}: {}",
                service.service_name, e
            ));
        }
    }
    Ok(report)
}

/// Write every current API with its schema definition and document under
/// `azure/apiproxies/<name>/`. Revisions (`<api>;rev=<n>`) are skipped.
pub async fn export(
    store: &Store,
    client: &AzureClient,
    filter: Option<&str>,
    only_new: bool,
) -> ApimResult<Report> {
    let mut report = Report::new();
    report.line("Exporting Azure APIs...");

    let apis = match client.list_apis().await {
        Ok(apis) => apis,
        Err(e) => {
            warn!(error = %e, "Failed to list Azure APIs");
            report.failure(format!("Could not list Azure APIs: {}", e));
            return Ok(report);
        }
    };

    for api in apis
        .iter()
        .filter(|a| !is_revision_name(&a.name) && selected(filter, &a.name))
    {
        let dir = store.api_dir(Platform::Azure, &api.name)?;
        if only_new && dir.exists() {
            report.line(format!("Skipping {}, already exported.", api.name));
            continue;
        }

        report.line(format!("Exporting {}...", api.name));
        store.write_json(&dir.join(format!("{}.json", api.name)), api)?;

        match client.get_api_schema(&api.name).await {
            Ok(Some(schema)) => {
                store.write_json(&dir.join(SCHEMA_DEFINITION_FILE), &schema)?;
                if let Some(document) = schema.properties.document_text()? {
                    let file = format!("schema.{}", schema.properties.file_extension());
                    store.write_bytes(&dir.join(file), document.as_bytes())?;
                }
            }
            Ok(None) => {
                info!(api = %api.name, "No schema for API");
            }
            Err(e) => {
                warn!(api = %api.name, error = %e, "Schema export failed");
                report.failure(format!("Error exporting schema of {}: {}", api.name, e));
                continue;
            }
        }

        report.api(api.name.clone());
    }

    Ok(report)
}

/// Map every exported API to a canonical record in `general/<slug>/`.
///
/// The general directory is replaced wholesale so stale files from an
/// earlier run do not survive; a `schema.json` document becomes `openapi.json`.
pub fn offramp(
    store: &Store,
    service: AzureServiceRef<'_>,
    filter: Option<&str>,
) -> ApimResult<Report> {
    let mut report = Report::new();
    report.line(format!(
        "Converting Azure APIs of service {}...",
        service.service_name
    ));

    let record: AzureService = store
        .read_json_if_exists(&store.azure_service_path(service.service_name))?
        .unwrap_or_default();

    for name in store.list_api_dirs(Platform::Azure)? {
        if !selected(filter, &name) {
            continue;
        }

        let source_dir = store.api_dir(Platform::Azure, &name)?;
        let record_path = source_dir.join(format!("{}.json", name));
        let Some(api) = store.read_json_if_exists::<AzureApi>(&record_path)? else {
            report.failure(format!("{} has no API record", name));
            continue;
        };

        let general = to_general(&api, &record, service);
        let target_dir = store.api_dir(Platform::General, &general.name)?;
        store.reset_dir(&target_dir)?;
        store.write_json(&target_dir.join(format!("{}.json", general.name)), &general)?;

        if let Some(document) = store.read_bytes_if_exists(&source_dir.join(SCHEMA_JSON_FILE))? {
            store.write_bytes(&target_dir.join(OPENAPI_FILE), &document)?;
        }

        info!(api = %general.name, platform = PLATFORM_ID, "Converted to general format");
        report.line(format!("Converted {}.", general.name));
        report.api(general.name);
    }

    Ok(report)
}

/// Canonical record for one Azure API. The canonical version is the API
/// version; revisions never feed it.
pub fn to_general(
    api: &AzureApi,
    service: &AzureService,
    service_ref: AzureServiceRef<'_>,
) -> GeneralApi {
    let properties = &api.properties;
    let portal = service.properties.developer_portal_url.trim_end_matches('/');
    let gateway = service.properties.gateway_url.trim_end_matches('/');

    let display_name = if properties.api_version.is_empty() {
        properties.display_name.clone()
    } else {
        format!("{} {}", properties.display_name, properties.api_version)
    };

    GeneralApi {
        name: slugify(&api.name),
        display_name,
        version: properties.api_version.clone(),
        description: properties.description.clone(),
        owner_email: service.properties.publisher_email.clone(),
        owner_name: service.properties.publisher_name.clone(),
        documentation_url: if portal.is_empty() {
            String::new()
        } else {
            format!("{}/api-details#api={}", portal, api.name)
        },
        gateway_url: if gateway.is_empty() {
            String::new()
        } else {
            format!("{}/{}", gateway, properties.path)
        },
        base_path: properties.path.clone(),
        platform_id: PLATFORM_ID.to_string(),
        platform_name: PLATFORM_NAME.to_string(),
        platform_resource_uri: service_ref.portal_uri(&api.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AzureConfig;
    use crate::models::{AzureApiProperties, AzureServiceProperties};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SERVICE: &str =
        "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.ApiManagement/service/apim";

    fn config() -> AzureConfig {
        AzureConfig {
            subscription_id: Some("sub".into()),
            resource_group: Some("rg".into()),
            service_name: Some("apim".into()),
            ..Default::default()
        }
    }

    fn service() -> AzureService {
        AzureService {
            name: "apim".into(),
            properties: AzureServiceProperties {
                developer_portal_url: "https://apim.developer.azure-api.net".into(),
                gateway_url: "https://apim.azure-api.net".into(),
                publisher_email: "owner@example.com".into(),
                publisher_name: "Owner".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn api(name: &str, version: &str, revision: &str) -> AzureApi {
        AzureApi {
            name: name.into(),
            properties: AzureApiProperties {
                display_name: "Orders API".into(),
                path: "orders".into(),
                api_version: version.into(),
                api_revision: revision.into(),
                description: "Order management".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_to_general_maps_service_and_api_fields() {
        let config = config();
        let general = to_general(
            &api("Orders API", "", "3"),
            &service(),
            config.service().unwrap(),
        );

        assert_eq!(general.name, "orders-api");
        assert_eq!(general.display_name, "Orders API");
        assert_eq!(general.version, "");
        assert_eq!(general.base_path, "orders");
        assert_eq!(general.gateway_url, "https://apim.azure-api.net/orders");
        assert_eq!(
            general.documentation_url,
            "https://apim.developer.azure-api.net/api-details#api=Orders API"
        );
        assert_eq!(general.owner_email, "owner@example.com");
        assert_eq!(general.platform_id, "azure");
        assert!(general.platform_resource_uri.contains("apiName=Orders API"));
    }

    #[test]
    fn test_to_general_uses_api_version_not_revision() {
        let config = config();
        let general = to_general(
            &api("orders-v2", "v2", "5"),
            &service(),
            config.service().unwrap(),
        );

        assert_eq!(general.version, "v2");
        assert_eq!(general.display_name, "Orders API v2");
    }

    #[test]
    fn test_to_general_without_service_record_leaves_urls_empty() {
        let config = config();
        let general = to_general(
            &api("orders", "", ""),
            &AzureService::default(),
            config.service().unwrap(),
        );

        assert!(general.gateway_url.is_empty());
        assert!(general.documentation_url.is_empty());
    }

    #[tokio::test]
    async fn test_export_skips_revisions_and_writes_schema() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/apis", SERVICE)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [
                    {"name": "orders-api", "properties": {"path": "orders"}},
                    {"name": "orders-api;rev=2", "properties": {"path": "orders"}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/schemas/orders-api", SERVICE)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": {"schemaType": "json", "document": {"openapi": "3.0.1"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());
        let config = config();
        let client = AzureClient::new(reqwest::Client::new(), config.service().unwrap(), "tok")
            .with_base_url(server.uri());

        let report = export(&store, &client, None, false).await.unwrap();

        assert_eq!(report.apis(), ["orders-api"]);
        let api_dir = store.api_dir(Platform::Azure, "orders-api").unwrap();
        assert!(api_dir.join("orders-api.json").is_file());
        assert!(api_dir.join(SCHEMA_DEFINITION_FILE).is_file());
        let document: serde_json::Value = store.read_json(&api_dir.join("schema.json")).unwrap();
        assert_eq!(document["openapi"], "3.0.1");
    }

    #[test]
    fn test_offramp_replaces_general_dir() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());
        let config = config();

        let source = store.api_dir(Platform::Azure, "orders-api").unwrap();
        store
            .write_json(&source.join("orders-api.json"), &api("orders-api", "", ""))
            .unwrap();

        let target = store.api_dir(Platform::General, "orders-api").unwrap();
        store.write_bytes(&target.join("stale.txt"), b"old").unwrap();

        let report = offramp(&store, config.service().unwrap(), None).unwrap();

        assert_eq!(report.apis(), ["orders-api"]);
        assert!(!target.join("stale.txt").exists());
        assert!(target.join("orders-api.json").is_file());
        assert!(!target.join(OPENAPI_FILE).exists());
    }
}
