// ─── Acquisition Pipeline ───
// metadata -> client artifact -> libraries, each stage with its own failure
// boundary. A failed stage ends the job and leaves earlier files in place;
// re-running the pipeline starts over from the first stage.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use super::artifact::{artifact_sha1, artifact_url};
use super::in_flight::InFlightRegistry;
use super::job::{AcquisitionJob, Stage};
use super::libraries::{EnsureLibrariesDir, LibraryContext, LibraryStage};
use crate::core::catalog::VersionRegistry;
use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::{EventSink, LauncherEvent, ProgressEvent};
use crate::core::layout::GameLayout;
use crate::core::version::VersionRecord;

pub struct AcquisitionPipeline {
    layout: GameLayout,
    downloader: Downloader,
    libraries: Arc<dyn LibraryStage>,
    registry: Arc<VersionRegistry>,
    in_flight: InFlightRegistry,
    sink: EventSink,
}

impl AcquisitionPipeline {
    pub fn new(
        layout: GameLayout,
        downloader: Downloader,
        registry: Arc<VersionRegistry>,
        sink: EventSink,
    ) -> Self {
        Self {
            layout,
            downloader,
            libraries: Arc::new(EnsureLibrariesDir),
            registry,
            in_flight: InFlightRegistry::new(),
            sink,
        }
    }

    pub fn with_library_stage(mut self, stage: Arc<dyn LibraryStage>) -> Self {
        self.libraries = stage;
        self
    }

    /// Download everything needed to install `version` and rescan the
    /// installed versions on success.
    ///
    /// Never returns an error: the outcome is the returned job, and every
    /// failure has already been reported through the event sink.
    pub async fn run(&self, version: &VersionRecord) -> AcquisitionJob {
        let mut job = AcquisitionJob::new(&version.id);

        if version.metadata_url.is_empty() {
            let reason = format!("Version {} has no metadata URL", version.id);
            self.sink.error(reason.as_str());
            job.reject(reason);
            return job;
        }

        let Some(_guard) = self.in_flight.try_acquire(&version.id) else {
            let reason = LauncherError::JobInFlight(version.id.clone()).to_string();
            self.sink.warn(reason.as_str());
            job.reject(reason);
            return job;
        };

        self.sink.info(format!("Starting download of version {}", version.id));

        self.enter(&mut job, Stage::MetadataFetch);
        let metadata = match self.fetch_metadata(&mut job, version).await {
            Ok(metadata) => metadata,
            Err(err) => return self.abort(job, err),
        };
        self.sink.info("Downloaded version metadata");

        self.enter(&mut job, Stage::ArtifactFetch);
        if let Err(err) = self.fetch_artifact(&mut job, &metadata).await {
            return self.abort(job, err);
        }
        self.sink.info("Downloaded client artifact");

        self.enter(&mut job, Stage::LibraryFetch);
        self.fetch_libraries(&version.id, &metadata).await;

        self.enter(&mut job, Stage::Done);
        self.sink.info(format!("Version {} downloaded", version.id));
        info!("Acquisition of {} complete", version.id);

        self.registry.rescan_installed(&self.layout.versions_dir()).await;
        job
    }

    async fn fetch_metadata(
        &self,
        job: &mut AcquisitionJob,
        version: &VersionRecord,
    ) -> LauncherResult<String> {
        let version_dir = self.layout.version_dir(&version.id);
        tokio::fs::create_dir_all(&version_dir)
            .await
            .map_err(|e| LauncherError::io(&version_dir, e))?;

        let dest = self.layout.metadata_path(&version.id);
        self.download(job, &version.metadata_url, &dest).await?;

        tokio::fs::read_to_string(&dest)
            .await
            .map_err(|e| LauncherError::io(&dest, e))
    }

    async fn fetch_artifact(
        &self,
        job: &mut AcquisitionJob,
        metadata: &str,
    ) -> LauncherResult<()> {
        let url = artifact_url(metadata)?;
        let dest = self.layout.artifact_path(&job.version_id);
        self.download(job, url, &dest).await?;

        if let Some(expected) = artifact_sha1(metadata) {
            if let Err(err) = Downloader::validate_sha1(&dest, expected).await {
                // A corrupt artifact must not be picked up as installed.
                let _ = tokio::fs::remove_file(&dest).await;
                return Err(err);
            }
        }
        Ok(())
    }

    async fn fetch_libraries(&self, version_id: &str, metadata: &str) {
        self.sink.info("Downloading libraries...");
        let libraries_dir = self.layout.libraries_dir();
        let ctx = LibraryContext {
            version_id,
            metadata,
            libraries_dir: &libraries_dir,
            downloader: &self.downloader,
        };

        match self.libraries.acquire(ctx).await {
            Ok(()) => self.sink.info("Libraries ready"),
            Err(err) => self.sink.warn(format!("Library download failed: {err}")),
        }
    }

    async fn download(
        &self,
        job: &mut AcquisitionJob,
        url: &str,
        dest: &Path,
    ) -> LauncherResult<u64> {
        let sink = self.sink.clone();
        let version_id = job.version_id.clone();
        let stage = job.stage;

        self.downloader
            .download_file(url, dest, |progress| {
                job.record(progress);
                sink.post(LauncherEvent::Progress(ProgressEvent {
                    version_id: version_id.clone(),
                    stage,
                    progress,
                }));
            })
            .await
    }

    fn enter(&self, job: &mut AcquisitionJob, stage: Stage) {
        job.enter(stage);
        self.sink.post(LauncherEvent::Stage {
            version_id: job.version_id.clone(),
            stage,
        });
    }

    fn abort(&self, mut job: AcquisitionJob, err: LauncherError) -> AcquisitionJob {
        self.sink.error(format!(
            "Failed to download version {} during {}: {}",
            job.version_id, job.stage, err
        ));
        job.fail(err.to_string());
        self.sink.post(LauncherEvent::Stage {
            version_id: job.version_id.clone(),
            stage: Stage::Failed,
        });
        job
    }
}
