// ─── Version Manifest ───
// Fetches the remote version manifest and decodes it by scanning, not by
// schema: find the versions array, split it into balanced top-level
// objects, and run the field extractor over each one.

use tracing::{debug, info};

use super::record::VersionRecord;
use crate::core::downloader::Transport;
use crate::core::error::LauncherResult;

pub const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

/// At most this many records are decoded from one manifest.
pub const MANIFEST_RECORD_CAP: usize = 50;

const VERSIONS_MARKER: &str = "\"versions\"";

/// Outcome of decoding one manifest document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedManifest {
    /// Records in source order (newest first for Mojang manifests).
    pub records: Vec<VersionRecord>,
    /// Objects that were found but could not be turned into a record.
    pub skipped: usize,
}

/// Download the manifest at `url` and decode it.
///
/// Transport failures are returned to the caller; decoding never fails.
pub async fn fetch_manifest(
    transport: &dyn Transport,
    url: &str,
) -> LauncherResult<DecodedManifest> {
    info!("Fetching version manifest from {url}");
    let document = transport.fetch_text(url).await?;
    let decoded = decode_manifest(&document);
    info!(
        "Decoded {} versions from manifest ({} skipped)",
        decoded.records.len(),
        decoded.skipped
    );
    Ok(decoded)
}

/// Decode a manifest document into at most [`MANIFEST_RECORD_CAP`] records.
///
/// A document without a versions array decodes to nothing. Objects that lack
/// a required field or carry an unparseable `releaseTime` are skipped one by
/// one without affecting their neighbours.
pub fn decode_manifest(document: &str) -> DecodedManifest {
    let mut decoded = DecodedManifest::default();

    let Some(body) = versions_array_body(document) else {
        debug!("Manifest has no versions array");
        return decoded;
    };

    for object in split_top_level_objects(body) {
        match VersionRecord::from_manifest_object(object) {
            Ok(record) => {
                decoded.records.push(record);
                if decoded.records.len() >= MANIFEST_RECORD_CAP {
                    break;
                }
            }
            Err(err) => {
                debug!("Skipping manifest entry: {err}");
                decoded.skipped += 1;
            }
        }
    }

    decoded
}

/// Text between the first `[` after the versions marker and the LAST `]` of
/// the whole document.
///
/// Using the last bracket assumes the versions array is the final array in
/// the document, which holds for Mojang's manifests. A trailing array after
/// it widens the body, and its objects become fragments like any other:
/// incomplete ones are skipped, while ones carrying `id`, `url` and a
/// parseable `releaseTime` decode as versions.
fn versions_array_body(document: &str) -> Option<&str> {
    let marker = document.find(VERSIONS_MARKER)?;
    let open = marker + document[marker..].find('[')?;
    let close = document.rfind(']')?;
    if close <= open {
        return None;
    }
    Some(&document[open + 1..close])
}

/// Split an array body into its depth-zero `{...}` runs.
///
/// Braces inside string values are counted like any other brace. Stray
/// closing braces at depth zero are ignored.
fn split_top_level_objects(body: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (idx, ch) in body.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = idx;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let object = body[start..=idx].trim();
                    if !object.is_empty() {
                        objects.push(object);
                    }
                }
            }
            _ => {}
        }
    }

    objects
}
