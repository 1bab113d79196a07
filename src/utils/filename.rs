use std::path::{Path, PathBuf};

/// Default stage-one output: air_quality_{country}_{year}.csv
pub fn default_stage1_filename(country: &str, year: i32) -> PathBuf {
    PathBuf::from(format!("air_quality_{}_{}.csv", country.to_lowercase(), year))
}

/// Default stage-two output: the stage-one name with a `_processed` suffix
pub fn default_stage2_filename(country: &str, year: i32) -> PathBuf {
    processed_filename(&default_stage1_filename(country, year))
}

/// Insert `_processed` before the extension of `input`, keeping its directory.
pub fn processed_filename(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{}_processed.{}", stem, ext.to_string_lossy()),
        None => format!("{}_processed", stem),
    };
    input.with_file_name(name)
}

/// Prefix for temporary bundle files, e.g. temp_poland_2024_01_
pub fn bundle_prefix(country: &str, year: i32, month: Option<&str>) -> String {
    match month {
        Some(month) => format!("temp_{}_{}_{}_", country.to_lowercase(), year, month),
        None => format!("temp_{}_{}_", country.to_lowercase(), year),
    }
}
