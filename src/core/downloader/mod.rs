pub mod client;
pub mod transport;

#[cfg(test)]
pub(crate) mod memory;

pub use client::{write_stream, Downloader, TransferProgress, CHUNK_SIZE};
pub use transport::{ByteStream, HttpTransport, RemoteBody, Transport};
