//! The local store: a directory tree under one root, one subtree per platform.
//!
//! ```text
//! <root>/<platform>/apiproxies/<name>/<name>.json
//! <root>/apigee/environments/<env>/deployments.json
//! <root>/azure/<service>.json
//! ```
//!
//! Paths are always derived from the root passed in; nothing here depends on
//! the process working directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{ApimError, ApimResult};
use crate::models::{ApigeeEnvironment, GeneralApi, Platform};
use crate::naming::{is_safe_name, strip_display_version};

const APIS_DIR: &str = "apiproxies";
const LEDGER_FILE: &str = "deployments.json";

/// Spec document kept next to a canonical record.
pub const OPENAPI_FILE: &str = "openapi.json";

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.data_dir.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn platform_dir(&self, platform: Platform) -> PathBuf {
        self.root.join(platform.to_string())
    }

    pub fn apis_dir(&self, platform: Platform) -> PathBuf {
        self.platform_dir(platform).join(APIS_DIR)
    }

    /// Directory of one API. Names that would escape the store are rejected.
    pub fn api_dir(&self, platform: Platform, name: &str) -> ApimResult<PathBuf> {
        if !is_safe_name(name) {
            return Err(ApimError::InvalidInput(format!(
                "'{}' is not a valid API name",
                name
            )));
        }
        Ok(self.apis_dir(platform).join(name))
    }

    /// `<dir>/<name>.json`, the main record of an API directory.
    pub fn record_path(&self, platform: Platform, name: &str) -> ApimResult<PathBuf> {
        Ok(self.api_dir(platform, name)?.join(format!("{}.json", name)))
    }

    /// Names of the API directories of a platform, sorted. Hidden entries
    /// are skipped; a missing platform directory yields an empty list.
    pub fn list_api_dirs(&self, platform: Platform) -> ApimResult<Vec<String>> {
        let dir = self.apis_dir(platform);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) if is_safe_name(name) => names.push(name.to_string()),
                _ => {}
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> ApimResult<T> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Like [`Store::read_json`], but a missing file is `None`.
    pub fn read_json_if_exists<T: DeserializeOwned>(&self, path: &Path) -> ApimResult<Option<T>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn read_bytes_if_exists(&self, path: &Path) -> ApimResult<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Pretty-printed JSON; parent directories are created as needed.
    pub fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> ApimResult<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(path, &bytes)
    }

    pub fn write_bytes(&self, path: &Path, bytes: &[u8]) -> ApimResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Wrote file");
        Ok(())
    }

    /// Remove a directory and recreate it empty.
    pub fn reset_dir(&self, dir: &Path) -> ApimResult<()> {
        remove_dir_if_exists(dir)?;
        fs::create_dir_all(dir)?;
        Ok(())
    }

    /// Move a fully prepared directory into place, replacing `dir`.
    pub fn replace_dir(&self, staged: &Path, dir: &Path) -> ApimResult<()> {
        remove_dir_if_exists(dir)?;
        fs::rename(staged, dir)?;
        Ok(())
    }

    /// Write the canonical record `general/<name>/<name>.json`.
    ///
    /// The record is renamed to `name` and ` v<digits>` tokens are dropped
    /// from its display name. An existing record is only replaced when the new
    /// one serializes to more bytes, so the most complete variant of a group
    /// survives. Returns whether the file was written.
    pub fn write_general_api(&self, name: &str, mut api: GeneralApi) -> ApimResult<bool> {
        api.name = name.to_string();
        api.display_name = strip_display_version(&api.display_name);

        let path = self.record_path(Platform::General, name)?;
        let new_bytes = serde_json::to_vec_pretty(&api)?;

        if let Some(existing) = self.read_bytes_if_exists(&path)? {
            if new_bytes.len() <= existing.len() {
                debug!(api = %name, "Keeping existing general record");
                return Ok(false);
            }
        }

        self.write_bytes(&path, &new_bytes)?;
        Ok(true)
    }

    pub fn ledger_path(&self, environment: &str) -> PathBuf {
        self.platform_dir(Platform::Apigee)
            .join("environments")
            .join(environment)
            .join(LEDGER_FILE)
    }

    /// The environment ledger; empty when none was saved yet.
    pub fn load_ledger(&self, environment: &str) -> ApimResult<ApigeeEnvironment> {
        Ok(self
            .read_json_if_exists(&self.ledger_path(environment))?
            .unwrap_or_default())
    }

    pub fn save_ledger(&self, environment: &str, ledger: &ApigeeEnvironment) -> ApimResult<()> {
        self.write_json(&self.ledger_path(environment), ledger)
    }

    pub fn tests_dir(&self, environment: &str) -> PathBuf {
        self.platform_dir(Platform::Apigee)
            .join("tests")
            .join(environment)
    }

    pub fn azure_service_path(&self, service_name: &str) -> PathBuf {
        self.platform_dir(Platform::Azure)
            .join(format!("{}.json", service_name))
    }

    /// Delete a platform subtree. Returns `false` when there was nothing to delete.
    pub fn clean_platform(&self, platform: Platform) -> ApimResult<bool> {
        let dir = self.platform_dir(platform);
        let removed = remove_dir_if_exists(&dir)?;
        if removed {
            info!(platform = %platform, path = %dir.display(), "Removed local data");
        }
        Ok(removed)
    }
}

fn remove_dir_if_exists(dir: &Path) -> ApimResult<bool> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
