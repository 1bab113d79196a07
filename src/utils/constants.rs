/// Dataset identifier of the CAMS air-quality forecasts at observation sites
pub const DATASET_NAME: &str = "cams-europe-air-quality-forecasts-optimised-at-observation-sites";

/// Provider defaults
pub const DEFAULT_PROVIDER_URL: &str = "https://ads.atmosphere.copernicus.eu/api";
pub const DEFAULT_CREDENTIALS_FILE: &str = ".cdsapirc";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_MONTHLY_PAUSE_SECS: u64 = 2;

/// Request defaults
pub const DEFAULT_VARIABLES: [&str; 2] = ["nitrogen_dioxide", "particulate_matter_2.5um"];
pub const DEFAULT_COUNTRY: &str = "poland";
pub const DEFAULT_DATA_TYPE: &str = "raw";
pub const DEFAULT_LEADTIME_HOUR: &str = "0-23";
pub const DEFAULT_YEAR: i32 = 2024;

pub const ALL_MONTHS: [&str; 12] = [
    "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
];

pub const ALL_DAYS: [&str; 31] = [
    "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12", "13", "14", "15",
    "16", "17", "18", "19", "20", "21", "22", "23", "24", "25", "26", "27", "28", "29", "30",
    "31",
];

/// Column names of the provider schema that the pipeline relies on
pub const COL_STATION_ID: &str = "station_id";
pub const COL_DATETIME: &str = "datetime";
pub const COL_SPECIES: &str = "species";
pub const COL_CONCENTRATION: &str = "conc_raw_micrograms_per_m3";

/// Column order of the enriched output
pub const OUTPUT_COLUMNS: [&str; 10] = [
    "station_id",
    "country_name",
    "region_code",
    "region_name",
    "date",
    "hour",
    "month",
    "day_of_week",
    "species",
    "conc_raw_micrograms_per_m3",
];

pub const COUNTRY_NAME: &str = "Poland";

/// Separator of both persisted files
pub const FILE_DELIMITER: u8 = b';';

/// Field values read as missing
pub const NULL_MARKERS: [&str; 10] = [
    "", "NA", "N/A", "#N/A", "NaN", "nan", "null", "NULL", "None", "<NA>",
];

/// Rows shown after the final write
pub const PREVIEW_ROWS: usize = 10;

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
