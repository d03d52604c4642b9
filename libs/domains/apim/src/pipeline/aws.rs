use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::selected;
use crate::error::ApimResult;
use crate::models::{AwsApi, GeneralApi, Platform, PlatformStatus};
use crate::naming::{slugify, strip_version_suffix};
use crate::providers::ApiGateway;
use crate::report::Report;
use crate::store::{Store, OPENAPI_FILE};

pub const PLATFORM_ID: &str = "aws-api-gateway";
pub const PLATFORM_NAME: &str = "AWS API Gateway";

const OAS_SUFFIX: &str = "-oas.json";

pub async fn status(gateway: &dyn ApiGateway) -> PlatformStatus {
    match gateway.list_apis().await {
        Ok(apis) => PlatformStatus::connected(format!(
            "Connected to AWS, {} API(s) found.",
            apis.len()
        )),
        Err(e) => PlatformStatus::disconnected(e.to_string()),
    }
}

/// Write each API and its OpenAPI export under `aws/apiproxies/<root>/`,
/// where `<root>` is the slug without its `-v<digits>` suffix so versions
/// of one API share a directory.
pub async fn export(
    store: &Store,
    gateway: &dyn ApiGateway,
    filter: Option<&str>,
    only_new: bool,
) -> ApimResult<Report> {
    let mut report = Report::new();
    report.line("Exporting AWS APIs...");

    let apis = match gateway.list_apis().await {
        Ok(apis) => apis,
        Err(e) => {
            warn!(error = %e, "Failed to list AWS APIs");
            report.failure(format!("Could not list AWS APIs: {}", e));
            return Ok(report);
        }
    };

    for api in apis.iter().filter(|a| selected(filter, &a.name)) {
        let slug = slugify(&api.name);
        let root = strip_version_suffix(&slug);
        let dir = store.api_dir(Platform::Aws, &root)?;
        let record = dir.join(format!("{}.json", slug));
        if only_new && record.exists() {
            report.line(format!("Skipping {}, already exported.", api.name));
            continue;
        }

        report.line(format!("Exporting {}...", api.name));
        match gateway.export_openapi(&api.api_id).await {
            Ok(document) => {
                store.write_bytes(&dir.join(format!("{}{}", slug, OAS_SUFFIX)), &document)?;
            }
            Err(e) => {
                warn!(api = %api.name, error = %e, "OpenAPI export failed");
                report.line(format!("No OpenAPI export for {}: {}", api.name, e));
            }
        }

        store.write_json(&record, api)?;
        report.api(slug);
    }

    Ok(report)
}

/// Map exported AWS APIs to canonical records.
///
/// Every record is written as `general/<root>/<slug>.json`. The group's root
/// record goes through [`Store::write_general_api`], and whichever variant
/// wins it also provides `openapi.json`.
pub fn offramp(store: &Store, region: &str, filter: Option<&str>) -> ApimResult<Report> {
    let mut report = Report::new();
    report.line("Converting AWS APIs...");

    for root in store.list_api_dirs(Platform::Aws)? {
        if !selected(filter, &root) {
            continue;
        }

        let source_dir = store.api_dir(Platform::Aws, &root)?;
        for path in api_records(&source_dir)? {
            let api: AwsApi = match store.read_json(&path) {
                Ok(api) => api,
                Err(e) => {
                    report.failure(format!("Could not read {}: {}", path.display(), e));
                    continue;
                }
            };

            let general = to_general(&api, region);
            let slug = general.name.clone();
            if slug != root {
                let variant = store
                    .api_dir(Platform::General, &root)?
                    .join(format!("{}.json", slug));
                store.write_json(&variant, &general)?;
            }

            if store.write_general_api(&root, general)? {
                let spec = source_dir.join(format!("{}{}", slug, OAS_SUFFIX));
                if let Some(document) = store.read_bytes_if_exists(&spec)? {
                    let target = store.api_dir(Platform::General, &root)?.join(OPENAPI_FILE);
                    store.write_bytes(&target, &document)?;
                }
            }

            info!(api = %slug, root = %root, platform = PLATFORM_ID, "Converted to general format");
            report.line(format!("Converted {}.", slug));
        }

        report.api(root);
    }

    Ok(report)
}

pub fn to_general(api: &AwsApi, region: &str) -> GeneralApi {
    GeneralApi {
        name: slugify(&api.name),
        display_name: api.name.clone(),
        version: api.version.clone(),
        description: api.description.clone(),
        gateway_url: api.api_endpoint.clone(),
        platform_id: PLATFORM_ID.to_string(),
        platform_name: PLATFORM_NAME.to_string(),
        platform_resource_uri: format!(
            "https://{}.console.aws.amazon.com/apigateway/main/apis?api={}",
            region, api.api_id
        ),
        ..Default::default()
    }
}

/// The API records of one directory, sorted; OpenAPI exports are skipped.
fn api_records(dir: &Path) -> ApimResult<Vec<PathBuf>> {
    let mut records = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_file() && file_name.ends_with(".json") && !file_name.ends_with(OAS_SUFFIX) {
            records.push(path);
        }
    }
    records.sort();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApimError;
    use crate::providers::MockApiGateway;
    use mockall::predicate::eq;
    use tempfile::TempDir;

    fn aws_api(id: &str, name: &str, version: &str) -> AwsApi {
        AwsApi {
            api_id: id.into(),
            name: name.into(),
            version: version.into(),
            api_endpoint: format!("https://{}.execute-api.eu-west-1.amazonaws.com", id),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_status_counts_apis() {
        let mut gateway = MockApiGateway::new();
        gateway
            .expect_list_apis()
            .returning(|| Ok(vec![aws_api("a1", "Pets", "")]));

        let status = status(&gateway).await;
        assert!(status.connected);
        assert_eq!(status.message, "Connected to AWS, 1 API(s) found.");
    }

    #[tokio::test]
    async fn test_status_reports_failure() {
        let mut gateway = MockApiGateway::new();
        gateway
            .expect_list_apis()
            .returning(|| Err(ApimError::Aws("no credentials".into())));

        let status = status(&gateway).await;
        assert!(!status.connected);
        assert!(status.message.contains("no credentials"));
    }

    #[tokio::test]
    async fn test_export_groups_versions_and_keeps_record_without_spec() {
        let mut gateway = MockApiGateway::new();
        gateway.expect_list_apis().returning(|| {
            Ok(vec![aws_api("a1", "Pets", ""), aws_api("a2", "Pets v2", "2")])
        });
        gateway
            .expect_export_openapi()
            .with(eq("a1"))
            .returning(|_| Ok(br#"{"openapi":"3.0.1"}"#.to_vec()));
        gateway
            .expect_export_openapi()
            .with(eq("a2"))
            .returning(|_| Err(ApimError::Aws("export failed".into())));

        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());
        let report = export(&store, &gateway, None, false).await.unwrap();

        assert_eq!(report.apis(), ["pets", "pets-v2"]);
        let pets = store.api_dir(Platform::Aws, "pets").unwrap();
        assert!(pets.join("pets.json").is_file());
        assert!(pets.join("pets-oas.json").is_file());
        assert!(pets.join("pets-v2.json").is_file());
        assert!(!pets.join("pets-v2-oas.json").exists());
    }

    #[test]
    fn test_offramp_writes_variants_and_root() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());
        let source = store.api_dir(Platform::Aws, "pets").unwrap();
        let root = AwsApi {
            description: "Pet store".into(),
            ..aws_api("a1", "Pets", "")
        };
        store.write_json(&source.join("pets.json"), &root).unwrap();
        store
            .write_json(&source.join("pets-v2.json"), &aws_api("a2", "Pets v2", "2"))
            .unwrap();
        store
            .write_bytes(&source.join("pets-oas.json"), b"{\"openapi\":\"3.0.1\"}")
            .unwrap();

        let report = offramp(&store, "eu-west-1", None).unwrap();
        assert_eq!(report.apis(), ["pets"]);

        let target = store.api_dir(Platform::General, "pets").unwrap();
        let variant: GeneralApi = store.read_json(&target.join("pets-v2.json")).unwrap();
        assert_eq!(variant.version, "2");
        assert_eq!(
            variant.platform_resource_uri,
            "https://eu-west-1.console.aws.amazon.com/apigateway/main/apis?api=a2"
        );

        // The described root outweighs the earlier v2 variant.
        let root: GeneralApi = store.read_json(&target.join("pets.json")).unwrap();
        assert_eq!(root.name, "pets");
        assert_eq!(root.version, "");
        assert_eq!(root.description, "Pet store");
        assert_eq!(root.platform_id, "aws-api-gateway");
        assert!(target.join(OPENAPI_FILE).is_file());
    }

    #[test]
    fn test_to_general_leaves_base_path_empty() {
        let general = to_general(&aws_api("a1", "My API v2", "2"), "us-east-1");
        assert_eq!(general.name, "my-api-v2");
        assert!(general.base_path.is_empty());
        assert_eq!(general.grouping_key(), "my-api");
    }
}
