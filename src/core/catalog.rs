// ─── Version Catalog ───
// Available (remote) and installed (local) versions plus the selection,
// published as immutable snapshots. A refresh builds a new snapshot; a
// failed refresh publishes nothing, so the last good data stays visible.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::core::downloader::Transport;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::{EventSink, LauncherEvent};
use crate::core::version::{fetch_manifest, scan_installed, VersionRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionCatalog {
    /// Remote versions in manifest order, at most 50.
    pub available: Vec<VersionRecord>,
    /// Local versions, newest release first.
    pub installed: Vec<VersionRecord>,
    pub selected: Option<VersionRecord>,
}

impl VersionCatalog {
    pub fn find_available(&self, id: &str) -> Option<&VersionRecord> {
        self.available.iter().find(|v| v.id == id)
    }

    pub fn find_installed(&self, id: &str) -> Option<&VersionRecord> {
        self.installed.iter().find(|v| v.id == id)
    }

    pub fn is_installed(&self, id: &str) -> bool {
        self.find_installed(id).is_some()
    }

    /// Keep the current selection if it still refers to a known version,
    /// otherwise fall back to the newest available one.
    fn reconcile_selection(&mut self) {
        let kept = self.selected.as_ref().and_then(|current| {
            self.find_available(&current.id)
                .or_else(|| self.find_installed(&current.id))
                .cloned()
        });
        self.selected = kept.or_else(|| self.available.first().cloned());
    }
}

/// Owner of the current [`VersionCatalog`] snapshot.
pub struct VersionRegistry {
    snapshot: watch::Sender<Arc<VersionCatalog>>,
    sink: EventSink,
}

impl VersionRegistry {
    pub fn new(sink: EventSink) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(VersionCatalog::default()));
        Self { snapshot, sink }
    }

    pub fn snapshot(&self) -> Arc<VersionCatalog> {
        self.snapshot.borrow().clone()
    }

    /// Receive every future snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<VersionCatalog>> {
        self.snapshot.subscribe()
    }

    pub fn selected(&self) -> Option<VersionRecord> {
        self.snapshot().selected.clone()
    }

    /// Replace the available list from the manifest at `url`.
    ///
    /// Returns `false` when the fetch failed; the previous list is kept.
    pub async fn refresh_available(&self, transport: &dyn Transport, url: &str) -> bool {
        self.sink.info("Fetching version list...");

        match fetch_manifest(transport, url).await {
            Ok(decoded) => {
                let count = decoded.records.len();
                if decoded.skipped > 0 {
                    self.sink.warn(format!(
                        "Skipped {} malformed manifest entries",
                        decoded.skipped
                    ));
                }
                self.publish(|catalog| {
                    catalog.available = decoded.records;
                    catalog.reconcile_selection();
                });
                self.sink.info(format!("Fetched {count} available versions"));
                true
            }
            Err(err) => {
                self.sink.error(format!("Failed to fetch version list: {err}"));
                false
            }
        }
    }

    /// Rebuild the installed list from `versions_dir`.
    ///
    /// Returns `false` when the directory could not be listed; the previous
    /// list is kept.
    pub async fn rescan_installed(&self, versions_dir: &Path) -> bool {
        match scan_installed(versions_dir).await {
            Ok(scan) => {
                for failure in &scan.failures {
                    self.sink.warn(format!(
                        "Failed to parse version file {}: {}",
                        failure.metadata_path.display(),
                        failure.error
                    ));
                }
                let count = scan.records.len();
                self.publish(|catalog| {
                    catalog.installed = scan.records;
                    catalog.reconcile_selection();
                });
                if count > 0 {
                    self.sink.info(format!("Loaded {count} installed versions"));
                }
                true
            }
            Err(err) => {
                self.sink.error(format!("Failed to load installed versions: {err}"));
                false
            }
        }
    }

    /// Select a version by id, looking at available versions first and then
    /// at installed ones.
    pub fn select(&self, id: &str) -> LauncherResult<VersionRecord> {
        let current = self.snapshot();
        let record = current
            .find_available(id)
            .or_else(|| current.find_installed(id))
            .cloned()
            .ok_or_else(|| LauncherError::Precondition(format!("Unknown version: {id}")))?;

        let selected = record.clone();
        self.publish(move |catalog| catalog.selected = Some(selected));
        self.sink.info(format!("Selected version: {}", record.id));
        Ok(record)
    }

    fn publish(&self, change: impl FnOnce(&mut VersionCatalog)) {
        self.snapshot.send_modify(|current| {
            let mut next = (**current).clone();
            change(&mut next);
            *current = Arc::new(next);
        });
        self.sink.post(LauncherEvent::CatalogUpdated(self.snapshot()));
    }
}
