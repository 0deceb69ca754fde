// ─── PureLauncher Core ───
// Headless backend of a single-window game launcher.
//
// Architecture:
//   core/
//     version/     — field extractor, manifest decoder, installed scanner
//     catalog      — available/installed snapshot + selection
//     downloader/  — transport seam + chunked streaming downloader
//     acquisition/ — metadata → client → libraries pipeline
//     java/        — runtime detection
//     launch/      — command assembly + process spawn with log relay
//     auth/        — offline identity
//     events       — log sink and progress events for the presentation layer
//     state/       — settings + launcher controller

pub mod acquisition;
pub mod auth;
pub mod catalog;
pub mod downloader;
pub mod error;
pub mod events;
pub mod http;
pub mod java;
pub mod launch;
pub mod layout;
pub mod state;
pub mod version;
