//! Apigee proxy bundles: zip archives rooted at `apiproxy/`.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{ApimError, ApimResult};

/// Directory inside a proxy folder that holds the bundle contents.
pub const BUNDLE_ROOT: &str = "apiproxy";

/// Extract `archive` into `target`, returning the number of files written.
///
/// Every entry is checked before anything touches the disk: one entry that
/// would land outside `target` (absolute paths, `..` components) rejects the
/// whole archive.
pub fn extract(archive: &Path, target: &Path) -> ApimResult<usize> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file)?;

    let mut paths: Vec<PathBuf> = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let entry = zip.by_index(i)?;
        match entry.enclosed_name() {
            Some(path) => paths.push(path),
            None => {
                return Err(ApimError::ZipSlip {
                    entry: entry.name().to_string(),
                });
            }
        }
    }

    fs::create_dir_all(target)?;

    let mut written = 0;
    for (i, relative) in paths.iter().enumerate() {
        let mut entry = zip.by_index(i)?;
        let out_path = target.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        written += 1;
    }

    debug!(archive = %archive.display(), files = written, "Extracted bundle");
    Ok(written)
}

/// Zip `<proxy_dir>/apiproxy` into `archive`.
///
/// Entry names are relative to `proxy_dir`, so the archive always starts
/// with `apiproxy/`. Returns the number of files added.
pub fn create(proxy_dir: &Path, archive: &Path) -> ApimResult<usize> {
    let source = proxy_dir.join(BUNDLE_ROOT);
    if !source.is_dir() {
        return Err(ApimError::InvalidInput(format!(
            "{} has no {} directory",
            proxy_dir.display(),
            BUNDLE_ROOT
        )));
    }

    let file = File::create(archive)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let mut added = 0;
    for entry in WalkDir::new(&source).sort_by_file_name().follow_links(false) {
        let entry = entry.map_err(|e| ApimError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(proxy_dir).map_err(|_| {
            ApimError::InvalidInput(format!("{} is outside the proxy", entry.path().display()))
        })?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(name, options)?;
        zip.write_all(&fs::read(entry.path())?)?;
        added += 1;
    }

    zip.finish()?;
    debug!(archive = %archive.display(), files = added, "Created bundle");
    Ok(added)
}
