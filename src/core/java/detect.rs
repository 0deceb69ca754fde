// ─── Java Detection ───
// JAVA_HOME first, then well-known install locations, then PATH.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

/// Where a runtime was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeSource {
    Configured,
    JavaHome,
    CommonLocation,
    SearchPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedRuntime {
    pub path: PathBuf,
    pub source: RuntimeSource,
}

pub fn java_binary_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "java.exe"
    } else {
        "java"
    }
}

/// A runtime path is usable when it points at an existing file.
pub fn is_valid_runtime(path: &Path) -> bool {
    path.is_file()
}

/// Detect a runtime from the process environment.
pub fn detect_runtime() -> Option<DetectedRuntime> {
    detect_runtime_in(
        std::env::var_os("JAVA_HOME"),
        &common_locations(),
        std::env::var_os("PATH"),
    )
}

/// Detection against explicit inputs, in priority order.
pub fn detect_runtime_in(
    java_home: Option<OsString>,
    common: &[PathBuf],
    search_path: Option<OsString>,
) -> Option<DetectedRuntime> {
    let binary = java_binary_name();

    if let Some(home) = java_home.filter(|h| !h.is_empty()) {
        let candidate = PathBuf::from(home).join("bin").join(binary);
        if is_valid_runtime(&candidate) {
            return Some(DetectedRuntime {
                path: candidate,
                source: RuntimeSource::JavaHome,
            });
        }
        debug!("JAVA_HOME set but {:?} does not exist", candidate);
    }

    if let Some(path) = common.iter().find(|p| is_valid_runtime(p)) {
        return Some(DetectedRuntime {
            path: path.clone(),
            source: RuntimeSource::CommonLocation,
        });
    }

    search_path.and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(binary))
            .find(|candidate| is_valid_runtime(candidate))
            .map(|path| DetectedRuntime {
                path,
                source: RuntimeSource::SearchPath,
            })
    })
}

/// Well-known install locations for the current platform, newest runtimes
/// first where the directory names allow ordering.
pub fn common_locations() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        [
            r"C:\Program Files\Java\jdk21\bin\java.exe",
            r"C:\Program Files\Java\jre21\bin\java.exe",
            r"C:\Program Files\Java\jdk17\bin\java.exe",
            r"C:\Program Files\Java\jre17\bin\java.exe",
            r"C:\Program Files\Java\jdk11\bin\java.exe",
            r"C:\Program Files\Java\jre11\bin\java.exe",
            r"C:\Program Files\Java\jre1.8.0_311\bin\java.exe",
            r"C:\Program Files\Java\jre1.8.0_301\bin\java.exe",
            r"C:\Program Files\Java\jre1.8.0_291\bin\java.exe",
            r"C:\Program Files\Java\jdk1.8.0_311\bin\java.exe",
            r"C:\Program Files\Java\jdk1.8.0_301\bin\java.exe",
            r"C:\Program Files\Java\jdk1.8.0_291\bin\java.exe",
        ]
        .into_iter()
        .map(PathBuf::from)
        .collect()
    } else if cfg!(target_os = "macos") {
        runtimes_under(
            Path::new("/Library/Java/JavaVirtualMachines"),
            &["Contents", "Home", "bin", "java"],
        )
    } else {
        let mut found = runtimes_under(Path::new("/usr/lib/jvm"), &["bin", "java"]);
        found.push(PathBuf::from("/usr/bin/java"));
        found
    }
}

/// `<root>/<each subdir>/<suffix...>`, subdirectories in descending name order.
fn runtimes_under(root: &Path, suffix: &[&str]) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort_by(|a, b| b.cmp(a));

    dirs.into_iter()
        .map(|dir| suffix.iter().fold(dir, |acc, part| acc.join(part)))
        .collect()
}
