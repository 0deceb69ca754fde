//! pure-launcher - command-line front end for the launcher core.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use pure_launcher_lib::core::events::{LauncherEvent, LogLevel};
use pure_launcher_lib::core::version::VersionRecord;
use pure_launcher_lib::{channel, init_logging, Launcher, LauncherResult, LauncherSettings};

#[derive(Parser, Debug)]
#[command(name = "pure-launcher")]
#[command(version, about = "A minimal game launcher")]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the stored settings.
#[derive(Args, Debug)]
struct GlobalArgs {
    /// Game directory (defaults to the platform `.minecraft`)
    #[arg(long, global = true)]
    game_dir: Option<PathBuf>,

    /// Path to the java executable
    #[arg(long, global = true)]
    java: Option<PathBuf>,

    /// Memory for the game, in MB
    #[arg(long, global = true)]
    memory: Option<u32>,

    /// Offline username
    #[arg(long, global = true)]
    username: Option<String>,

    /// Write the overrides back to the settings file
    #[arg(long, global = true)]
    save: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List game versions
    Versions {
        /// Only list installed versions
        #[arg(long)]
        installed: bool,
    },

    /// Download a version
    Install {
        /// Version id, e.g. 1.21
        id: String,
    },

    /// Start an installed version
    Launch {
        /// Version id, e.g. 1.21
        id: String,
    },

    /// Show the detected Java runtime
    Java,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> LauncherResult<bool> {
    let settings = settings_with_overrides(&cli.global)?;
    let (sink, rx) = channel();
    let printer = spawn_printer(rx);

    let mut launcher = Launcher::new(settings, sink)?;
    let ok = match cli.command {
        Commands::Versions { installed } => list_versions(&launcher, installed).await,
        Commands::Install { id } => {
            launcher.load_installed().await;
            launcher.refresh_available().await;
            match launcher.download(&id).await {
                Some(job) => job.is_done(),
                None => false,
            }
        }
        Commands::Launch { id } => {
            launcher.detect_java();
            launcher.load_installed().await;
            if launcher.select(&id).is_err() {
                false
            } else {
                match launcher.launch_selected() {
                    Ok(game) => matches!(game.exit.await, Ok(Ok(status)) if status.success()),
                    Err(_) => false,
                }
            }
        }
        Commands::Java => launcher.detect_java().is_some(),
    };

    // Dropping the controller closes the channel and lets the printer finish.
    drop(launcher);
    let _ = printer.await;
    Ok(ok)
}

fn settings_with_overrides(global: &GlobalArgs) -> LauncherResult<LauncherSettings> {
    let mut settings = LauncherSettings::load();
    if let Some(dir) = &global.game_dir {
        settings.game_dir = dir.clone();
    }
    if let Some(java) = &global.java {
        settings.java_path = Some(java.clone());
    }
    if let Some(memory) = global.memory {
        settings.memory_mb = memory;
    }
    if let Some(username) = &global.username {
        settings.username = Some(username.clone());
    }
    if global.save {
        settings.save()?;
    }
    Ok(settings)
}

async fn list_versions(launcher: &Launcher, installed_only: bool) -> bool {
    let ok = if installed_only {
        launcher.load_installed().await
    } else {
        launcher.refresh().await
    };

    let catalog = launcher.snapshot();
    if !installed_only {
        println!("Available:");
        for version in &catalog.available {
            print_version(version, catalog.is_installed(&version.id));
        }
    }
    println!("Installed:");
    for version in &catalog.installed {
        print_version(version, true);
    }
    ok
}

fn print_version(version: &VersionRecord, installed: bool) {
    println!(
        "  {:<24} {:<10} {}{}",
        version.id,
        version.kind,
        version.release_time.format("%Y-%m-%d"),
        if installed { "  [installed]" } else { "" }
    );
}

fn spawn_printer(mut rx: UnboundedReceiver<LauncherEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_percent = None;
        while let Some(event) = rx.recv().await {
            match event {
                LauncherEvent::Log(line) => match line.level {
                    LogLevel::Info => println!("{line}"),
                    LogLevel::Warn | LogLevel::Error => eprintln!("{line}"),
                },
                LauncherEvent::Stage { version_id, stage } => {
                    last_percent = None;
                    println!("{version_id}: {stage}");
                }
                LauncherEvent::Progress(event) => {
                    let Some(percent) = event.progress.fraction().map(|f| (f * 100.0) as u32)
                    else {
                        continue;
                    };
                    if last_percent != Some(percent) && percent % 10 == 0 {
                        println!("  {} {percent}%", event.stage);
                    }
                    last_percent = Some(percent);
                }
                LauncherEvent::CatalogUpdated(_) => {}
            }
        }
    })
}
