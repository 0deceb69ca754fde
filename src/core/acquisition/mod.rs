pub mod artifact;
pub mod in_flight;
pub mod job;
pub mod libraries;
pub mod pipeline;

pub use in_flight::{InFlightGuard, InFlightRegistry};
pub use job::{AcquisitionJob, Stage};
pub use libraries::{EnsureLibrariesDir, LibraryContext, LibraryStage};
pub use artifact::{artifact_sha1, artifact_url};
pub use pipeline::AcquisitionPipeline;
