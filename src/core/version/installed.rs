// ─── Installed Versions ───
// Walks `versions/` and turns every complete `<id>/<id>.json` + `<id>/<id>.jar`
// pair into a record.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::record::VersionRecord;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::layout::{version_file, ARTIFACT_EXTENSION, METADATA_EXTENSION};

/// A version directory that had both files but could not be decoded.
#[derive(Debug)]
pub struct ScanFailure {
    pub metadata_path: PathBuf,
    pub error: LauncherError,
}

#[derive(Debug, Default)]
pub struct InstalledScan {
    /// Sorted by release time, newest first. Ties keep directory-name order.
    pub records: Vec<VersionRecord>,
    pub failures: Vec<ScanFailure>,
}

/// Scan `versions_dir` for installed versions.
///
/// A missing directory is an empty installation. Only a directory that
/// exists but cannot be listed is an error; per-version problems are
/// collected in [`InstalledScan::failures`] and never abort the scan.
pub async fn scan_installed(versions_dir: &Path) -> LauncherResult<InstalledScan> {
    let mut scan = InstalledScan::default();

    if !versions_dir.exists() {
        debug!("No versions directory at {:?}", versions_dir);
        return Ok(scan);
    }

    let mut entries = tokio::fs::read_dir(versions_dir)
        .await
        .map_err(|e| LauncherError::io(versions_dir, e))?;

    let mut candidates = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LauncherError::io(versions_dir, e))?
    {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(id) => candidates.push((id, path)),
            Err(name) => debug!("Ignoring non UTF-8 version directory {:?}", name),
        }
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    for (id, dir) in candidates {
        let metadata_path = version_file(&dir, &id, METADATA_EXTENSION);
        let artifact_path = version_file(&dir, &id, ARTIFACT_EXTENSION);
        if !metadata_path.is_file() || !artifact_path.is_file() {
            continue;
        }

        match read_installed_record(&metadata_path, &id).await {
            Ok(record) => scan.records.push(record),
            Err(error) => {
                warn!("Cannot decode {:?}: {}", metadata_path, error);
                scan.failures.push(ScanFailure {
                    metadata_path,
                    error,
                });
            }
        }
    }

    // `sort_by` is stable, so equal release times keep directory order.
    scan.records.sort_by(|a, b| b.release_time.cmp(&a.release_time));
    Ok(scan)
}

async fn read_installed_record(
    metadata_path: &Path,
    dir_id: &str,
) -> LauncherResult<VersionRecord> {
    let document = tokio::fs::read_to_string(metadata_path)
        .await
        .map_err(|e| LauncherError::io(metadata_path, e))?;
    VersionRecord::from_installed_metadata(&document, dir_id)
}
