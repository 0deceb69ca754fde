use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt};
use reqwest::Client;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

/// Response body as a stream of byte pieces of arbitrary size.
pub type ByteStream = BoxStream<'static, LauncherResult<Bytes>>;

/// An opened GET response whose status was already checked.
pub struct RemoteBody {
    /// `Content-Length`, when the server sent one.
    pub total_bytes: Option<u64>,
    pub stream: ByteStream,
}

/// Source of remote documents and files.
///
/// Everything network-bound in the launcher goes through this seam so the
/// manifest refresh and the acquisition pipeline can run against any source.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `url`. Non-success statuses are
    /// [`LauncherError::DownloadFailed`].
    async fn open(&self, url: &str) -> LauncherResult<RemoteBody>;

    /// GET `url` and collect the whole body as UTF-8 text.
    async fn fetch_text(&self, url: &str) -> LauncherResult<String> {
        let mut body = self.open(url).await?;
        let capacity = body.total_bytes.unwrap_or(0).min(16 * 1024 * 1024) as usize;
        let mut buf = Vec::with_capacity(capacity);
        while let Some(piece) = body.stream.next().await {
            buf.extend_from_slice(&piece?);
        }
        String::from_utf8(buf).map_err(|_| LauncherError::InvalidText {
            url: url.to_string(),
        })
    }
}

/// [`Transport`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, url: &str) -> LauncherResult<RemoteBody> {
        let response = self.client.get(url).timeout(self.timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total_bytes = response.content_length();
        debug!("GET {} -> {} ({:?} bytes)", url, status, total_bytes);

        let stream = response
            .bytes_stream()
            .map(|piece| piece.map_err(LauncherError::from))
            .boxed();

        Ok(RemoteBody {
            total_bytes,
            stream,
        })
    }
}
