use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tempfile::Builder;
use tracing::{info, warn};

use super::selected;
use crate::bundle;
use crate::error::{ApimError, ApimResult};
use crate::models::{ApigeeDeveloper, ApigeeDeveloperApp, ApigeeProduct, Platform, PlatformStatus};
use crate::providers::ApigeeClient;
use crate::report::Report;
use crate::store::Store;

pub async fn status(client: &ApigeeClient) -> PlatformStatus {
    match client.list_proxies().await {
        Ok(proxies) => PlatformStatus::connected(format!(
            "Connected to Apigee, {} APIs found in project {}.",
            proxies.proxies.len(),
            client.organization()
        )),
        Err(e) => PlatformStatus::disconnected(e.to_string()),
    }
}

/// Download the latest revision bundle of every selected proxy and unpack it
/// under `apigee/apiproxies/<name>/`.
///
/// With an environment, exported proxies are appended to that environment's
/// ledger, which is saved once at the end.
pub async fn export(
    store: &Store,
    client: &ApigeeClient,
    filter: Option<&str>,
    environment: Option<&str>,
    only_new: bool,
) -> ApimResult<Report> {
    let mut report = Report::new();
    report.line(format!(
        "Exporting Apigee APIs for project {}...",
        client.organization()
    ));

    let proxies = match client.list_proxies().await {
        Ok(proxies) => proxies,
        Err(e) => {
            warn!(error = %e, "Failed to list Apigee proxies");
            report.failure(format!("Could not list Apigee APIs: {}", e));
            return Ok(report);
        }
    };

    let mut ledger = match environment {
        Some(env) => Some(store.load_ledger(env)?),
        None => None,
    };

    let apis_dir = store.apis_dir(Platform::Apigee);
    for proxy in proxies.proxies.iter().filter(|p| selected(filter, &p.name)) {
        let target = store.api_dir(Platform::Apigee, &proxy.name)?;
        if only_new && target.exists() {
            report.line(format!("Skipping {}, already exported.", proxy.name));
            continue;
        }

        let Some(revision) = proxy.latest_revision() else {
            report.failure(format!("{} has no deployable revision", proxy.name));
            continue;
        };

        report.line(format!("Exporting {}...", proxy.name));
        let bytes = match client.proxy_bundle(&proxy.name, revision).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(api = %proxy.name, error = %e, "Bundle download failed");
                report.failure(format!("Error exporting {}: {}", proxy.name, e));
                continue;
            }
        };

        let archive = apis_dir.join(format!("{}.zip", proxy.name));
        store.write_bytes(&archive, &bytes)?;

        // A rejected bundle leaves the previous export untouched.
        let staging = Builder::new().prefix(".staging-").tempdir_in(&apis_dir)?;
        let extracted = bundle::extract(&archive, staging.path());
        remove_file_if_exists(&archive)?;

        match extracted {
            Ok(files) => {
                store.replace_dir(&staging.keep(), &target)?;
                info!(api = %proxy.name, revision = %revision, files, "Exported Apigee proxy");
            }
            Err(e @ (ApimError::ZipSlip { .. } | ApimError::Zip(_))) => {
                warn!(api = %proxy.name, error = %e, "Rejected bundle");
                report.failure(format!("Invalid bundle for {}: {}", proxy.name, e));
                continue;
            }
            Err(e) => return Err(e),
        }

        if let Some(ledger) = ledger.as_mut() {
            ledger.add_proxy(&proxy.name);
        }
        report.api(proxy.name.clone());
    }

    if let (Some(env), Some(ledger)) = (environment, &ledger) {
        store.save_ledger(env, ledger)?;
    }

    Ok(report)
}

/// Zip each local proxy and upload it as a new revision.
///
/// The temporary archive is removed whatever the upload outcome.
pub async fn import(
    store: &Store,
    client: &ApigeeClient,
    filter: Option<&str>,
) -> ApimResult<Report> {
    let mut report = Report::new();
    report.line(format!(
        "Importing Apigee APIs to project {}...",
        client.organization()
    ));

    for name in store.list_api_dirs(Platform::Apigee)? {
        if !selected(filter, &name) {
            continue;
        }

        report.line(format!("Importing {}...", name));
        let proxy_dir = store.api_dir(Platform::Apigee, &name)?;
        let archive = proxy_dir.join(format!("{}.zip", name));

        match bundle::create(&proxy_dir, &archive) {
            Ok(_) => {}
            Err(ApimError::InvalidInput(message)) => {
                report.failure(message);
                continue;
            }
            Err(e) => {
                remove_file_if_exists(&archive)?;
                return Err(e);
            }
        }

        let uploaded = client.import_proxy(&name, &archive).await;
        remove_file_if_exists(&archive)?;

        match uploaded {
            Ok(()) => {
                info!(api = %name, "Imported Apigee proxy");
                report.api(name);
            }
            Err(e) => {
                warn!(api = %name, error = %e, "Import failed");
                report.failure(format!("Error importing {}: {}", name, e));
            }
        }
    }

    Ok(report)
}

/// Delete every selected proxy from the organization.
pub async fn clean(client: &ApigeeClient, filter: Option<&str>) -> Report {
    let mut report = Report::new();
    report.line(format!(
        "Removing Apigee APIs from project {}...",
        client.organization()
    ));

    let proxies = match client.list_proxies().await {
        Ok(proxies) => proxies,
        Err(e) => {
            report.failure(format!("Could not list Apigee APIs: {}", e));
            return report;
        }
    };

    for proxy in proxies.proxies.iter().filter(|p| selected(filter, &p.name)) {
        report.line(format!("Deleting {}...", proxy.name));
        match client.delete_proxy(&proxy.name).await {
            Ok(()) => report.api(proxy.name.clone()),
            Err(e) => {
                warn!(api = %proxy.name, error = %e, "Delete failed");
                report.failure(format!("Error deleting {}: {}", proxy.name, e));
            }
        }
    }

    report
}

/// Write developer, product and app fixtures for an environment under
/// `apigee/tests/<env>/`. The product grants access to every proxy in the
/// environment ledger.
pub fn init_tests(store: &Store, environment: &str) -> ApimResult<Report> {
    let ledger = store.load_ledger(environment)?;

    let developer = ApigeeDeveloper::test_fixture();
    let product = ApigeeProduct::test_fixture(ledger.proxy_names());
    let app = ApigeeDeveloperApp::test_fixture(&developer, &product);

    let dir = store.tests_dir(environment);
    store.write_json(&dir.join("developers.json"), &[&developer])?;
    store.write_json(&dir.join("products.json"), &[&product])?;
    store.write_json(&dir.join("developerapps.json"), &[&app])?;

    let mut report = Report::new();
    report.line(format!(
        "Test data for environment {} written ({} proxies).",
        environment,
        product.proxies.len()
    ));
    Ok(report)
}

fn remove_file_if_exists(path: &Path) -> ApimResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
