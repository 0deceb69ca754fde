use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::extract::{extract_field, require_field};
use crate::core::error::{LauncherError, LauncherResult};

/// Structured descriptor of one game version, either announced by the remote
/// manifest or found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: String,
    /// Category tag, e.g. `release` or `snapshot`.
    pub kind: String,
    /// Where the version's metadata document lives. Empty for records that
    /// were only found locally.
    pub metadata_url: String,
    /// Opaque `time` string, kept for display.
    pub raw_timestamp: String,
    pub release_time: DateTime<Utc>,
}

impl VersionRecord {
    /// Build a record from one raw object of the remote manifest.
    ///
    /// `id`, `url` and a parseable `releaseTime` are required.
    pub fn from_manifest_object(fragment: &str) -> LauncherResult<Self> {
        let id = require_field(fragment, "id")?;
        let metadata_url = require_field(fragment, "url")?;
        let release_time = parse_release_time(require_field(fragment, "releaseTime")?)?;

        Ok(Self {
            id: id.to_string(),
            kind: extract_field(fragment, "type").to_string(),
            metadata_url: metadata_url.to_string(),
            raw_timestamp: extract_field(fragment, "time").to_string(),
            release_time,
        })
    }

    /// Build a record from an installed version's metadata document stored
    /// under the directory `dir_id`.
    ///
    /// Full metadata documents carry nested `id`s (the asset index) ahead of
    /// the version's own, so `dir_id` is used when the document declares it
    /// anywhere; otherwise the first `id` wins.
    pub fn from_installed_metadata(document: &str, dir_id: &str) -> LauncherResult<Self> {
        let declared = format!("\"id\":\"{dir_id}\"");
        let id = if !dir_id.is_empty() && document.contains(&declared) {
            dir_id
        } else {
            require_field(document, "id")?
        };
        let release_time = parse_release_time(require_field(document, "releaseTime")?)?;

        Ok(Self {
            id: id.to_string(),
            kind: extract_field(document, "type").to_string(),
            metadata_url: String::new(),
            raw_timestamp: extract_field(document, "time").to_string(),
            release_time,
        })
    }
}

/// Parse an ISO-8601 / RFC 3339 timestamp such as `2024-01-01T00:00:00Z`
/// or `2023-12-07T08:00:00+00:00`.
pub fn parse_release_time(value: &str) -> LauncherResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| LauncherError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}
