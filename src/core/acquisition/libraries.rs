use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};

/// Everything a library stage may need about the version being acquired.
pub struct LibraryContext<'a> {
    pub version_id: &'a str,
    /// The metadata document downloaded by the first stage.
    pub metadata: &'a str,
    /// Shared directory for auxiliary files of all versions.
    pub libraries_dir: &'a Path,
    pub downloader: &'a Downloader,
}

/// Third acquisition stage. Failures are logged by the pipeline and never
/// fail the job.
#[async_trait]
pub trait LibraryStage: Send + Sync {
    async fn acquire(&self, ctx: LibraryContext<'_>) -> LauncherResult<()>;
}

/// Makes sure the shared libraries directory exists. Per-library resolution
/// is not performed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsureLibrariesDir;

#[async_trait]
impl LibraryStage for EnsureLibrariesDir {
    async fn acquire(&self, ctx: LibraryContext<'_>) -> LauncherResult<()> {
        tokio::fs::create_dir_all(ctx.libraries_dir)
            .await
            .map_err(|e| LauncherError::io(ctx.libraries_dir, e))?;
        debug!(
            "Libraries directory ready for {} at {:?}",
            ctx.version_id, ctx.libraries_dir
        );
        Ok(())
    }
}
