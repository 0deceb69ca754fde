pub mod launcher;
pub mod settings;

pub use launcher::Launcher;
pub use settings::{default_game_dir, settings_path, LauncherSettings};
