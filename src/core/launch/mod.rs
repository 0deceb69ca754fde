pub mod command;
pub mod process;

pub use command::{build_launch_command, jvm_args, LaunchCommand, LaunchRequest, DEFAULT_MEMORY_FLAG};
pub use process::{spawn_game, RunningGame};
