use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, info, warn};

use super::selected;
use crate::error::ApimResult;
use crate::models::{
    GeneralApi, HubApi, HubApiVersion, HubAttribute, HubContents, HubDeployment,
    HubDocumentation, HubOwner, HubVersionRecord, HubVersionSpec, Platform, PlatformStatus,
};
use crate::naming::HubNames;
use crate::providers::HubClient;
use crate::report::Report;
use crate::store::{Store, OPENAPI_FILE};

const DEPLOYMENT_TYPE_ATTRIBUTE: &str = "system-deployment-type";
const SPEC_TYPE_ATTRIBUTE: &str = "system-spec-type";

pub async fn status(client: &HubClient, project: &str) -> PlatformStatus {
    match client.list_apis().await {
        Ok(apis) => PlatformStatus::connected(format!(
            "Connected to API Hub, {} APIs found in project {}.",
            apis.len(),
            project
        )),
        Err(e) => PlatformStatus::disconnected(e.to_string()),
    }
}

/// Files of one onramped API under `apihub/apiproxies/<name>/`.
struct HubFiles {
    api: String,
    deployment: String,
    version: String,
    spec: String,
}

impl HubFiles {
    fn new(name: &str) -> Self {
        Self {
            api: format!("{}.json", name),
            deployment: format!("{}-deployment.json", name),
            version: format!("{}-version.json", name),
            spec: format!("{}-version-spec.json", name),
        }
    }
}

/// Convert every canonical record into API Hub payloads.
///
/// Runs in two passes. The first loads all records and indexes the roots
/// (records without a version) by grouping key, first root winning. The
/// second writes, per record: the API itself when it is a root or nothing
/// else anchors its group, then a deployment, a version under the anchor API
/// and, when `openapi.json` exists, a spec. Resource ids derive only from
/// record names, so re-running on the same input writes the same bytes.
pub fn onramp(store: &Store, names: &HubNames, filter: Option<&str>) -> ApimResult<Report> {
    let mut report = Report::new();
    report.line("Converting general APIs to API Hub...");

    let mut records = Vec::new();
    for dir in store.list_api_dirs(Platform::General)? {
        let path = store.record_path(Platform::General, &dir)?;
        match store.read_json_if_exists::<GeneralApi>(&path) {
            Ok(Some(record)) => records.push((dir, record)),
            Ok(None) => debug!(dir = %dir, "No general record"),
            Err(e) => report.failure(format!("Could not read {}: {}", path.display(), e)),
        }
    }

    let mut roots: HashMap<String, String> = HashMap::new();
    for (dir, record) in &records {
        if record.is_root() {
            roots.entry(record.grouping_key()).or_insert_with(|| dir.clone());
        }
    }

    for (dir, record) in &records {
        if !selected(filter, dir) {
            continue;
        }

        let key = record.grouping_key();
        let anchor = roots.get(&key).unwrap_or(dir);
        let target = store.api_dir(Platform::ApiHub, dir)?;
        let files = HubFiles::new(dir);
        store.reset_dir(&target)?;

        if record.is_root() || !roots.contains_key(&key) {
            store.write_json(&target.join(&files.api), &hub_api(names, dir, record))?;
        }

        let deployment = hub_deployment(names, dir, record);
        store.write_json(&target.join(&files.deployment), &deployment)?;

        let version = HubVersionRecord {
            version: HubApiVersion {
                name: names.version(anchor, dir),
                display_name: record.display_name.clone(),
                description: record.description.clone(),
                documentation: documentation(record),
                deployments: vec![deployment.name],
            },
            base_api_name: anchor.clone(),
        };
        store.write_json(&target.join(&files.version), &version)?;

        let openapi = store.api_dir(Platform::General, dir)?.join(OPENAPI_FILE);
        if let Some(document) = store.read_bytes_if_exists(&openapi)? {
            let spec = HubVersionSpec {
                name: names.spec(anchor, dir, dir),
                display_name: record.display_name.clone(),
                spec_type: HubAttribute::system(
                    names.attribute(SPEC_TYPE_ATTRIBUTE),
                    "openapi",
                    "OpenAPI Spec",
                ),
                contents: HubContents {
                    mime_type: "application/json".to_string(),
                    contents: STANDARD.encode(&document),
                },
                documentation: documentation(record),
            };
            store.write_json(&target.join(&files.spec), &spec)?;
        }

        info!(api = %dir, anchor = %anchor, "Prepared API Hub records");
        report.line(format!("Converted {} (API {}).", dir, anchor));
        report.api(dir.clone());
    }

    Ok(report)
}

fn documentation(record: &GeneralApi) -> HubDocumentation {
    HubDocumentation {
        external_uri: record.documentation_url.clone(),
    }
}

fn hub_api(names: &HubNames, id: &str, record: &GeneralApi) -> HubApi {
    HubApi {
        name: names.api(id),
        display_name: record.display_name.clone(),
        description: record.description.clone(),
        documentation: documentation(record),
        owner: HubOwner {
            display_name: record.owner_name.clone(),
            email: record.owner_email.clone(),
        },
        versions: Vec::new(),
    }
}

fn hub_deployment(names: &HubNames, id: &str, record: &GeneralApi) -> HubDeployment {
    let (type_id, type_name) = match record.platform_id.as_str() {
        "apigee" => ("apigee", "Apigee"),
        _ => ("others", "Others"),
    };

    HubDeployment {
        name: names.deployment(id),
        display_name: record.display_name.clone(),
        description: record.description.clone(),
        documentation: documentation(record),
        deployment_type: HubAttribute::system(
            names.attribute(DEPLOYMENT_TYPE_ATTRIBUTE),
            type_id,
            type_name,
        ),
        resource_uri: record.platform_resource_uri.clone(),
        endpoints: non_empty(&record.gateway_url),
        api_versions: non_empty(&record.version),
    }
}

fn non_empty(value: &str) -> Vec<String> {
    if value.is_empty() {
        Vec::new()
    } else {
        vec![value.to_string()]
    }
}

/// Create the onramped records in the hub, in dependency order: API,
/// deployment, version, spec.
///
/// A failed artifact is reported and its siblings are still attempted; an
/// API only counts as imported when all of its artifacts went through.
pub async fn import(
    store: &Store,
    client: &HubClient,
    filter: Option<&str>,
) -> ApimResult<Report> {
    let mut report = Report::new();
    report.line("Importing APIs to API Hub...");

    for name in store.list_api_dirs(Platform::ApiHub)? {
        if !selected(filter, &name) {
            continue;
        }

        let dir = store.api_dir(Platform::ApiHub, &name)?;
        let files = HubFiles::new(&name);
        let failures_before = report.failures();
        report.line(format!("Importing {}...", name));

        if let Some(api) = store.read_json_if_exists::<HubApi>(&dir.join(&files.api))? {
            if let Err(e) = client.create_api(&name, &api).await {
                warn!(api = %name, error = %e, "API creation failed");
                report.failure(format!("Error creating API {}: {}", name, e));
            }
        }

        if let Some(deployment) =
            store.read_json_if_exists::<HubDeployment>(&dir.join(&files.deployment))?
        {
            if let Err(e) = client.create_deployment(&name, &deployment).await {
                warn!(api = %name, error = %e, "Deployment creation failed");
                report.failure(format!("Error creating deployment {}: {}", name, e));
            }
        }

        let record = store.read_json_if_exists::<HubVersionRecord>(&dir.join(&files.version))?;
        let anchor = match &record {
            Some(record) if !record.base_api_name.is_empty() => record.base_api_name.clone(),
            _ => name.clone(),
        };

        if let Some(record) = &record {
            if let Err(e) = client.create_version(&anchor, &name, &record.version).await {
                warn!(api = %name, error = %e, "Version creation failed");
                report.failure(format!("Error creating version {}: {}", name, e));
            }
        }

        if let Some(spec) = store.read_json_if_exists::<HubVersionSpec>(&dir.join(&files.spec))? {
            if let Err(e) = client.create_spec(&anchor, &name, &name, &spec).await {
                warn!(api = %name, error = %e, "Spec creation failed");
                report.failure(format!("Error creating spec {}: {}", name, e));
            }
        }

        if report.failures() == failures_before {
            info!(api = %name, anchor = %anchor, "Imported to API Hub");
            report.api(name);
        }
    }

    Ok(report)
}

/// Delete matching APIs (with their versions) and deployments from the hub.
/// The filter is compared with the last segment of each resource name.
pub async fn clean(client: &HubClient, filter: Option<&str>) -> Report {
    let mut report = Report::new();
    report.line("Removing API Hub APIs and deployments...");

    match client.list_apis().await {
        Ok(apis) => {
            for api in apis.iter().filter(|a| selected(filter, resource_id(&a.name))) {
                report.line(format!("Deleting {}...", api.name));
                match client.delete_api(&api.name).await {
                    Ok(()) => report.api(resource_id(&api.name)),
                    Err(e) => report.failure(format!("Error deleting {}: {}", api.name, e)),
                }
            }
        }
        Err(e) => report.failure(format!("Could not list API Hub APIs: {}", e)),
    }

    match client.list_deployments().await {
        Ok(deployments) => {
            for deployment in deployments
                .iter()
                .filter(|d| selected(filter, resource_id(&d.name)))
            {
                report.line(format!("Deleting {}...", deployment.name));
                if let Err(e) = client.delete_deployment(&deployment.name).await {
                    report.failure(format!("Error deleting {}: {}", deployment.name, e));
                }
            }
        }
        Err(e) => report.failure(format!("Could not list API Hub deployments: {}", e)),
    }

    report
}

fn resource_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
