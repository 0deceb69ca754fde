// ─── Launch Command ───
// Assembles the runtime invocation for an installed version.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::auth::OfflineAccount;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::java::is_valid_runtime;
use crate::core::layout::GameLayout;

/// Memory flag in the configured JVM arguments that gets replaced by the
/// configured memory size.
pub const DEFAULT_MEMORY_FLAG: &str = "-Xmx4G";

pub struct LaunchRequest<'a> {
    pub java_path: &'a Path,
    pub layout: &'a GameLayout,
    pub version_id: &'a str,
    pub jvm_args: &'a str,
    pub memory_mb: u32,
    pub account: &'a OfflineAccount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub working_dir: PathBuf,
    pub args: Vec<String>,
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_escape(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", shell_escape(arg))?;
        }
        Ok(())
    }
}

/// Build the command, checking that the runtime and the client artifact
/// exist first.
pub fn build_launch_command(request: &LaunchRequest<'_>) -> LauncherResult<LaunchCommand> {
    if !is_valid_runtime(request.java_path) {
        return Err(LauncherError::Precondition(
            "Java path is invalid, set it manually".into(),
        ));
    }

    let artifact = request.layout.artifact_path(request.version_id);
    if !artifact.is_file() {
        return Err(LauncherError::Precondition(format!(
            "Version file {} not found, download the version first",
            artifact.display()
        )));
    }

    let root = request.layout.root();
    let mut args = jvm_args(request.jvm_args, request.memory_mb);
    args.extend([
        "-jar".to_string(),
        path_arg(&artifact),
        "--username".to_string(),
        request.account.username.clone(),
        "--version".to_string(),
        request.version_id.to_string(),
        "--gameDir".to_string(),
        path_arg(root),
        "--assetsDir".to_string(),
        path_arg(&request.layout.assets_dir()),
        "--uuid".to_string(),
        request.account.uuid.clone(),
    ]);

    Ok(LaunchCommand {
        program: request.java_path.to_path_buf(),
        working_dir: root.to_path_buf(),
        args,
    })
}

/// Whitespace-split JVM flags with [`DEFAULT_MEMORY_FLAG`] swapped for the
/// configured size.
pub fn jvm_args(raw: &str, memory_mb: u32) -> Vec<String> {
    let memory_flag = format!("-Xmx{memory_mb}M");
    raw.replace(DEFAULT_MEMORY_FLAG, &memory_flag)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }
    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=' | '+')
    }) {
        return raw.to_string();
    }
    format!("\"{}\"", raw.replace('"', "\\\""))
}
