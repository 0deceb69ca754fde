use std::path::Path;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use serde::Serialize;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::transport::Transport;
use crate::core::error::{LauncherError, LauncherResult};

/// Bytes written (and reported) per progress step.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Cumulative progress of one file transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    /// `0` when the server did not announce a length.
    pub bytes_total: u64,
}

impl TransferProgress {
    /// Completed share in `0.0..=1.0`, or `None` while progress is
    /// indeterminate.
    pub fn fraction(&self) -> Option<f64> {
        if self.bytes_total == 0 {
            return None;
        }
        Some((self.bytes_transferred as f64 / self.bytes_total as f64).min(1.0))
    }
}

/// Streams single files from a [`Transport`] to disk.
#[derive(Clone)]
pub struct Downloader {
    transport: Arc<dyn Transport>,
}

impl Downloader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// GET `url` into `dest`, reporting progress after every
    /// [`CHUNK_SIZE`] bytes and once more for a trailing partial chunk.
    ///
    /// Parent directories are created as needed. On failure the partially
    /// written file is left on disk. Returns the number of bytes written.
    pub async fn download_file<F>(
        &self,
        url: &str,
        dest: &Path,
        on_progress: F,
    ) -> LauncherResult<u64>
    where
        F: FnMut(TransferProgress) + Send,
    {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let body = self.transport.open(url).await?;
        let written =
            write_stream(body.stream, body.total_bytes.unwrap_or(0), dest, on_progress).await?;

        debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, written);
        Ok(written)
    }

    /// Check an existing file against an expected SHA-1 (hex, any case).
    pub async fn validate_sha1(path: &Path, expected: &str) -> LauncherResult<()> {
        let actual = file_sha1(path).await?;
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(LauncherError::Sha1Mismatch {
                path: path.to_path_buf(),
                expected: expected.to_string(),
                actual,
            });
        }
        debug!("Verified SHA-1 of {:?}", path);
        Ok(())
    }
}

async fn file_sha1(path: &Path) -> LauncherResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| LauncherError::io(path, e))?;
    let mut hasher = Sha1::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Write a byte stream to `dest` in fixed [`CHUNK_SIZE`] steps regardless of
/// how the source slices its pieces.
pub async fn write_stream<S, B, E, F>(
    mut stream: S,
    bytes_total: u64,
    dest: &Path,
    mut on_progress: F,
) -> LauncherResult<u64>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    LauncherError: From<E>,
    F: FnMut(TransferProgress),
{
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| LauncherError::io(dest, e))?;

    let copied = copy_chunks(&mut stream, &mut file, bytes_total, dest, &mut on_progress).await;

    // Flush even after a broken stream so the partial file really is on disk.
    let flushed = file.flush().await.map_err(|e| LauncherError::io(dest, e));
    let transferred = copied?;
    flushed?;
    Ok(transferred)
}

async fn copy_chunks<S, B, E, F>(
    stream: &mut S,
    file: &mut tokio::fs::File,
    bytes_total: u64,
    dest: &Path,
    on_progress: &mut F,
) -> LauncherResult<u64>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    LauncherError: From<E>,
    F: FnMut(TransferProgress),
{
    let mut pending: Vec<u8> = Vec::with_capacity(CHUNK_SIZE);
    let mut transferred = 0u64;

    while let Some(piece) = stream.next().await {
        let piece = piece?;
        let mut data = piece.as_ref();

        while !data.is_empty() {
            let take = (CHUNK_SIZE - pending.len()).min(data.len());
            pending.extend_from_slice(&data[..take]);
            data = &data[take..];

            if pending.len() == CHUNK_SIZE {
                transferred += write_chunk(file, &mut pending, dest).await?;
                on_progress(TransferProgress {
                    bytes_transferred: transferred,
                    bytes_total,
                });
            }
        }
    }

    if !pending.is_empty() {
        transferred += write_chunk(file, &mut pending, dest).await?;
        on_progress(TransferProgress {
            bytes_transferred: transferred,
            bytes_total,
        });
    }

    Ok(transferred)
}

async fn write_chunk(
    file: &mut tokio::fs::File,
    pending: &mut Vec<u8>,
    dest: &Path,
) -> LauncherResult<u64> {
    file.write_all(&pending[..])
        .await
        .map_err(|e| LauncherError::io(dest, e))?;
    let written = pending.len() as u64;
    pending.clear();
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::memory::MemoryTransport;
    use futures_util::stream;

    fn downloader(transport: MemoryTransport) -> Downloader {
        Downloader::new(Arc::new(transport))
    }

    #[tokio::test]
    async fn two_full_chunks_report_twice() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("client.jar");
        let pieces: Vec<Result<Vec<u8>, std::io::Error>> =
            vec![Ok(vec![1u8; 8192]), Ok(vec![2u8; 8192])];

        let mut seen = Vec::new();
        let written = write_stream(stream::iter(pieces), 16384, &dest, |p| seen.push(p))
            .await
            .unwrap();

        assert_eq!(written, 16384);
        assert_eq!(
            seen.iter().map(|p| p.bytes_transferred).collect::<Vec<_>>(),
            [8192, 16384]
        );
        assert!(seen.iter().all(|p| p.bytes_total == 16384));
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 16384);
    }

    #[tokio::test]
    async fn small_pieces_are_regrouped_into_chunks() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("file.bin");
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let transport = MemoryTransport::new().with_pieces("http://x/file", data.clone(), 1000);

        let mut seen = Vec::new();
        downloader(transport)
            .download_file("http://x/file", &dest, |p| seen.push(p.bytes_transferred))
            .await
            .unwrap();

        assert_eq!(seen, [8192, 16384, 20000]);
        assert_eq!(std::fs::read(&dest).unwrap(), data);
    }

    #[tokio::test]
    async fn unknown_length_is_indeterminate() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("meta.json");
        let transport = MemoryTransport::new().with_unknown_length("http://x/m", vec![b'a'; 100]);

        let mut seen = Vec::new();
        downloader(transport)
            .download_file("http://x/m", &dest, |p| seen.push(p))
            .await
            .unwrap();

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].bytes_total, 0);
        assert_eq!(seen[0].fraction(), None);
    }

    #[test]
    fn fraction_is_clamped() {
        let p = TransferProgress {
            bytes_transferred: 150,
            bytes_total: 100,
        };
        assert_eq!(p.fraction(), Some(1.0));
        let half = TransferProgress {
            bytes_transferred: 50,
            bytes_total: 100,
        };
        assert_eq!(half.fraction(), Some(0.5));
    }

    #[tokio::test]
    async fn error_status_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("missing.jar");
        let transport = MemoryTransport::new().with_status("http://x/missing", 404);

        let err = downloader(transport)
            .download_file("http://x/missing", &dest, |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, LauncherError::DownloadFailed { status: 404, .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn broken_stream_leaves_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("partial.jar");
        let transport = MemoryTransport::new().with_truncated("http://x/p", vec![7u8; 10_000]);

        let err = downloader(transport)
            .download_file("http://x/p", &dest, |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, LauncherError::Other(_)));
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 8192);
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("a").join("b").join("c.txt");
        let transport = MemoryTransport::new().with_body("http://x/c", b"hello".to_vec());

        let written = downloader(transport)
            .download_file("http://x/c", &dest, |_| {})
            .await
            .unwrap();

        assert_eq!(written, 5);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "hello");
    }

    #[tokio::test]
    async fn sha1_of_written_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("hello.txt");
        std::fs::write(&path, b"hello").unwrap();

        assert_eq!(
            file_sha1(&path).await.unwrap(),
            "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        );
        Downloader::validate_sha1(&path, "AAF4C61DDCC5E8A2DABEDE0F3B482CD9AEA9434D")
            .await
            .unwrap();

        let err = Downloader::validate_sha1(&path, "abc").await.unwrap_err();
        assert!(matches!(
            err,
            LauncherError::Sha1Mismatch { ref expected, ref actual, .. }
                if expected == "abc" && actual == "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        ));
    }
}
