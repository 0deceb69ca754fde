use std::path::{Path, PathBuf};

/// Extension of a version's metadata document.
pub const METADATA_EXTENSION: &str = "json";
/// Extension of a version's client artifact.
pub const ARTIFACT_EXTENSION: &str = "jar";

/// On-disk layout of a game directory:
///
/// ```text
/// <root>/
///   versions/<id>/<id>.json   metadata
///   versions/<id>/<id>.jar    client artifact
///   libraries/                auxiliary files shared by all versions
///   assets/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLayout {
    root: PathBuf,
}

impl GameLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn version_dir(&self, id: &str) -> PathBuf {
        self.versions_dir().join(id)
    }

    pub fn metadata_path(&self, id: &str) -> PathBuf {
        version_file(&self.version_dir(id), id, METADATA_EXTENSION)
    }

    pub fn artifact_path(&self, id: &str) -> PathBuf {
        version_file(&self.version_dir(id), id, ARTIFACT_EXTENSION)
    }
}

/// `<dir>/<id>.<extension>`. Built by string so ids containing dots
/// (`1.20.4`) keep their full name.
pub fn version_file(dir: &Path, id: &str, extension: &str) -> PathBuf {
    dir.join(format!("{id}.{extension}"))
}
