pub mod extract;
pub mod installed;
pub mod manifest;
pub mod record;

pub use extract::{extract_field, require_field};
pub use installed::{scan_installed, InstalledScan, ScanFailure};
pub use manifest::{
    decode_manifest, fetch_manifest, DecodedManifest, MANIFEST_RECORD_CAP, VERSION_MANIFEST_URL,
};
pub use record::{parse_release_time, VersionRecord};
