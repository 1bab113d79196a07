pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{bundle_prefix, default_stage1_filename, default_stage2_filename, processed_filename};
pub use progress::ProgressReporter;
