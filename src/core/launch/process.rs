// ─── Game Process ───
// Spawns the runtime and relays its output into the log sink line by line.

use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::{EventSink, LogLevel};

use super::command::LaunchCommand;

/// A spawned game. `exit` resolves once the process has ended and both
/// output streams are fully relayed.
pub struct RunningGame {
    pub pid: Option<u32>,
    pub exit: JoinHandle<LauncherResult<ExitStatus>>,
}

pub fn spawn_game(command: &LaunchCommand, sink: &EventSink) -> LauncherResult<RunningGame> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .current_dir(&command.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("Command (copy/paste): {}", command);

    let mut child = cmd
        .spawn()
        .map_err(|e| LauncherError::JavaExecution(e.to_string()))?;
    let pid = child.id();

    let stdout = child
        .stdout
        .take()
        .map(|out| tokio::spawn(relay_lines(out, sink.clone(), LogLevel::Info)));
    let stderr = child
        .stderr
        .take()
        .map(|err| tokio::spawn(relay_lines(err, sink.clone(), LogLevel::Warn)));

    let exit_sink = sink.clone();
    let exit = tokio::spawn(async move {
        let status = child
            .wait()
            .await
            .map_err(|e| LauncherError::JavaExecution(e.to_string()));

        for relay in [stdout, stderr].into_iter().flatten() {
            let _ = relay.await;
        }

        match &status {
            Ok(status) if status.success() => exit_sink.info("Game exited normally"),
            Ok(status) => exit_sink.warn(format!("Game exited with {status}")),
            Err(err) => exit_sink.error(format!("Failed to wait for game process: {err}")),
        }
        status
    });

    Ok(RunningGame { pid, exit })
}

async fn relay_lines<R>(stream: R, sink: EventSink, level: LogLevel)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if !line.is_empty() {
            sink.log(level, line);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::events::{channel, drain, LauncherEvent};

    fn shell(script: &str, dir: PathBuf) -> LaunchCommand {
        LaunchCommand {
            program: PathBuf::from("/bin/sh"),
            working_dir: dir,
            args: vec!["-c".into(), script.into()],
        }
    }

    #[tokio::test]
    async fn relays_stdout_and_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let (sink, mut rx) = channel();

        let game = spawn_game(
            &shell("echo hello; echo; echo oops 1>&2", tmp.path().to_path_buf()),
            &sink,
        )
        .unwrap();
        assert!(game.pid.is_some());
        let status = game.exit.await.unwrap().unwrap();
        assert!(status.success());

        let lines: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|event| match event {
                LauncherEvent::Log(line) => Some((line.level, line.message)),
                _ => None,
            })
            .collect();
        assert!(lines.contains(&(LogLevel::Info, "hello".to_string())));
        assert!(lines.contains(&(LogLevel::Warn, "oops".to_string())));
        assert!(!lines.iter().any(|(_, message)| message.is_empty()));
        assert_eq!(
            lines.last().map(|(_, message)| message.as_str()),
            Some("Game exited normally")
        );
    }

    #[tokio::test]
    async fn runs_in_the_working_directory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("marker.txt"), b"").unwrap();
        let (sink, mut rx) = channel();

        let game = spawn_game(&shell("ls", tmp.path().to_path_buf()), &sink).unwrap();
        game.exit.await.unwrap().unwrap();

        let events = drain(&mut rx);
        assert!(crate::core::events::log_messages(&events).contains(&"marker.txt"));
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let (sink, mut rx) = channel();

        let game = spawn_game(&shell("exit 3", tmp.path().to_path_buf()), &sink).unwrap();
        let status = game.exit.await.unwrap().unwrap();
        assert_eq!(status.code(), Some(3));

        let events = drain(&mut rx);
        let messages = crate::core::events::log_messages(&events);
        assert!(messages.iter().any(|m| m.starts_with("Game exited with")));
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        let command = LaunchCommand {
            program: PathBuf::from("/definitely/not/java"),
            working_dir: std::env::temp_dir(),
            args: Vec::new(),
        };
        let result = spawn_game(&command, &EventSink::detached());
        assert!(matches!(result, Err(LauncherError::JavaExecution(_))));
    }
}
