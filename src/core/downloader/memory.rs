//! In-memory [`Transport`] for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, StreamExt};

use super::transport::{RemoteBody, Transport};
use crate::core::error::{LauncherError, LauncherResult};

enum Route {
    Body {
        data: Vec<u8>,
        piece: usize,
        known_length: bool,
    },
    Status(u16),
    /// Sends the data, then fails the stream.
    Truncated(Vec<u8>),
}

#[derive(Default)]
pub(crate) struct MemoryTransport {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: &str, data: impl Into<Vec<u8>>) -> Self {
        self.with_pieces(url, data, 8 * 1024)
    }

    pub fn with_pieces(mut self, url: &str, data: impl Into<Vec<u8>>, piece: usize) -> Self {
        self.routes.insert(
            url.to_string(),
            Route::Body {
                data: data.into(),
                piece,
                known_length: true,
            },
        );
        self
    }

    pub fn with_unknown_length(mut self, url: &str, data: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(
            url.to_string(),
            Route::Body {
                data: data.into(),
                piece: 8 * 1024,
                known_length: false,
            },
        );
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.routes.insert(url.to_string(), Route::Status(status));
        self
    }

    pub fn with_truncated(mut self, url: &str, data: impl Into<Vec<u8>>) -> Self {
        self.routes
            .insert(url.to_string(), Route::Truncated(data.into()));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn open(&self, url: &str) -> LauncherResult<RemoteBody> {
        self.requests.lock().unwrap().push(url.to_string());

        match self.routes.get(url) {
            None => Err(LauncherError::Other(format!("connection refused: {url}"))),
            Some(Route::Status(status)) => Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: *status,
            }),
            Some(Route::Body {
                data,
                piece,
                known_length,
            }) => {
                let pieces: Vec<LauncherResult<Bytes>> = data
                    .chunks((*piece).max(1))
                    .map(|c| Ok(Bytes::copy_from_slice(c)))
                    .collect();
                Ok(RemoteBody {
                    total_bytes: known_length.then_some(data.len() as u64),
                    stream: stream::iter(pieces).boxed(),
                })
            }
            Some(Route::Truncated(data)) => {
                let pieces: Vec<LauncherResult<Bytes>> = vec![
                    Ok(Bytes::copy_from_slice(data)),
                    Err(LauncherError::Other("connection reset".into())),
                ];
                Ok(RemoteBody {
                    total_bytes: Some(data.len() as u64 * 2),
                    stream: stream::iter(pieces).boxed(),
                })
            }
        }
    }
}
