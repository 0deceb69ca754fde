pub mod detect;

pub use detect::{
    detect_runtime, detect_runtime_in, is_valid_runtime, java_binary_name, DetectedRuntime,
    RuntimeSource,
};
