use std::fmt;

use serde::Serialize;

use crate::core::downloader::TransferProgress;

/// Step of an acquisition job. Stages run strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    MetadataFetch,
    ArtifactFetch,
    LibraryFetch,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::MetadataFetch => write!(f, "metadata download"),
            Stage::ArtifactFetch => write!(f, "client download"),
            Stage::LibraryFetch => write!(f, "library download"),
            Stage::Done => write!(f, "done"),
            Stage::Failed => write!(f, "failed"),
        }
    }
}

/// One end-to-end download of a version. Owned by the pipeline run that
/// created it and handed back to the caller when the run ends.
#[derive(Debug, Clone, Serialize)]
pub struct AcquisitionJob {
    pub version_id: String,
    pub stage: Stage,
    /// Counters of the current stage; reset at every stage boundary.
    pub bytes_total: u64,
    pub bytes_transferred: u64,
    /// Stage that was running when the job failed. `None` for jobs rejected
    /// before any stage started.
    pub failed_at: Option<Stage>,
    pub failure: Option<String>,
}

impl AcquisitionJob {
    pub fn new(version_id: impl Into<String>) -> Self {
        Self {
            version_id: version_id.into(),
            stage: Stage::MetadataFetch,
            bytes_total: 0,
            bytes_transferred: 0,
            failed_at: None,
            failure: None,
        }
    }

    pub(crate) fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        self.bytes_total = 0;
        self.bytes_transferred = 0;
    }

    pub(crate) fn record(&mut self, progress: TransferProgress) {
        self.bytes_total = progress.bytes_total;
        self.bytes_transferred = progress.bytes_transferred;
    }

    pub(crate) fn reject(&mut self, reason: impl Into<String>) {
        self.stage = Stage::Failed;
        self.failure = Some(reason.into());
    }

    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.failed_at = Some(self.stage);
        self.reject(reason);
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    pub fn is_failed(&self) -> bool {
        self.stage == Stage::Failed
    }
}
