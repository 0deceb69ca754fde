use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::{DOWNLOAD_TIMEOUT, MANIFEST_TIMEOUT};
use crate::core::version::VERSION_MANIFEST_URL;

const APP_DIR_NAME: &str = "PureLauncher";
const SETTINGS_FILE: &str = "launcher_settings.json";

pub const DEFAULT_MEMORY_MB: u32 = 4096;
pub const DEFAULT_JVM_ARGS: &str = "-Xmx4G -XX:+UseG1GC";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LauncherSettings {
    pub game_dir: PathBuf,
    /// Runtime chosen by the user; detection is used when unset or invalid.
    pub java_path: Option<PathBuf>,
    pub memory_mb: u32,
    pub jvm_args: String,
    /// Offline name; a `Player<NNNNN>` name is generated when unset.
    pub username: Option<String>,
    pub manifest_url: String,
    pub http_timeout_secs: u64,
    pub download_timeout_secs: u64,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            game_dir: default_game_dir(),
            java_path: None,
            memory_mb: DEFAULT_MEMORY_MB,
            jvm_args: DEFAULT_JVM_ARGS.to_string(),
            username: None,
            manifest_url: VERSION_MANIFEST_URL.to_string(),
            http_timeout_secs: MANIFEST_TIMEOUT.as_secs(),
            download_timeout_secs: DOWNLOAD_TIMEOUT.as_secs(),
        }
    }
}

impl LauncherSettings {
    /// Settings stored at `path`, or defaults when the file is missing or
    /// unreadable.
    pub fn load_from(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!("No settings at {:?} ({}), using defaults", path, err);
                return Self::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("Ignoring malformed settings file {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> LauncherResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| LauncherError::io(path, e))
    }

    pub fn load() -> Self {
        Self::load_from(&settings_path())
    }

    pub fn save(&self) -> LauncherResult<()> {
        self.save_to(&settings_path())
    }

    pub fn manifest_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `<platform data dir>/.minecraft`
pub fn default_game_dir() -> PathBuf {
    default_base_dir().join(".minecraft")
}

pub fn settings_path() -> PathBuf {
    default_base_dir().join(APP_DIR_NAME).join(SETTINGS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = LauncherSettings::default();
        assert_eq!(settings.memory_mb, 4096);
        assert_eq!(settings.jvm_args, "-Xmx4G -XX:+UseG1GC");
        assert_eq!(settings.manifest_timeout(), Duration::from_secs(30));
        assert_eq!(settings.download_timeout(), Duration::from_secs(600));
        assert!(settings.game_dir.ends_with(".minecraft"));
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join(SETTINGS_FILE);
        let settings = LauncherSettings {
            game_dir: tmp.path().join("game"),
            java_path: Some(PathBuf::from("/opt/java/bin/java")),
            memory_mb: 2048,
            username: Some("Steve".into()),
            ..LauncherSettings::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(LauncherSettings::load_from(&path), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{"memory_mb": 1024}"#).unwrap();

        let settings = LauncherSettings::load_from(&path);
        assert_eq!(settings.memory_mb, 1024);
        assert_eq!(settings.jvm_args, DEFAULT_JVM_ARGS);
    }

    #[test]
    fn malformed_or_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SETTINGS_FILE);
        assert_eq!(LauncherSettings::load_from(&path), LauncherSettings::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(LauncherSettings::load_from(&path), LauncherSettings::default());
    }
}
