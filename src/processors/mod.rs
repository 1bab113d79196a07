pub mod cleaner;
pub mod preprocessor;
pub mod region_decoder;
pub mod time_features;

pub use cleaner::{infer_column_type, Cleaner, CleaningReport, ColumnType};
pub use preprocessor::{PreprocessOutcome, Preprocessor};
pub use region_decoder::{extract_region_code, format_region_code, map_region_code_to_name};
pub use time_features::TimeFeatures;
