pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::error::{LauncherError, LauncherResult};
pub use crate::core::events::{channel, EventSink, LauncherEvent};
pub use crate::core::state::{Launcher, LauncherSettings};

/// Install the global tracing subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Sink lines are already printed by the CLI, so developer logs stay off
/// unless asked for.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,pure_launcher_lib=debug"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn developer_logs_are_off_unless_verbose() {
        assert_eq!(default_filter(false), "off");
        assert_eq!(default_filter(true), "info,pure_launcher_lib=debug");
        for verbose in [false, true] {
            assert!(EnvFilter::try_new(default_filter(verbose)).is_ok());
        }
    }
}
