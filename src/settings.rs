//! Layered run settings.
//!
//! Built-in defaults are overridden by an optional TOML file
//! (`airquality.toml` in the working directory, or an explicit path) and then
//! by `AQ_`-prefixed environment variables, e.g. `AQ_PROVIDER__KEY` or
//! `AQ_REQUEST__YEAR`.

use crate::error::{ProcessingError, Result};
use crate::models::RequestTemplate;
use crate::retrieval::ProviderCredentials;
use crate::utils::constants::{
    DATASET_NAME, DEFAULT_COUNTRY, DEFAULT_CREDENTIALS_FILE, DEFAULT_DATA_TYPE,
    DEFAULT_LEADTIME_HOUR, DEFAULT_MONTHLY_PAUSE_SECS, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_PROVIDER_URL, DEFAULT_VARIABLES, DEFAULT_YEAR,
};
use crate::utils::filename::{default_stage1_filename, default_stage2_filename};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

pub const DEFAULT_SETTINGS_FILE: &str = "airquality.toml";
const ENV_PREFIX: &str = "AQ";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub provider: ProviderSettings,
    #[validate(nested)]
    pub request: RequestSettings,
    #[serde(default)]
    pub paths: PathSettings,
}

#[derive(Clone, Deserialize, Validate)]
pub struct ProviderSettings {
    #[validate(url)]
    pub url: String,
    pub key: Option<String>,
    pub credentials_file: Option<PathBuf>,
    #[validate(range(min = 1, max = 3600))]
    pub poll_interval_secs: u64,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("url", &self.url)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("credentials_file", &self.credentials_file)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestSettings {
    #[validate(length(min = 1))]
    pub dataset: String,
    #[validate(length(min = 1))]
    pub variables: Vec<String>,
    #[validate(length(min = 1))]
    pub country: String,
    #[validate(length(min = 1))]
    pub data_type: String,
    #[validate(length(min = 1))]
    pub leadtime_hour: String,
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    #[validate(range(max = 600))]
    pub monthly_pause_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathSettings {
    pub stage1_output: Option<PathBuf>,
    pub stage2_output: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
}

impl Settings {
    /// Load settings, reading `path` if given, else `airquality.toml` when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_SETTINGS_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        let builder = Self::defaults()?.add_source(file).add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("request.variables")
                .try_parsing(true),
        );

        Self::from_config(builder.build()?)
    }

    /// Settings from the built-in defaults only.
    pub fn default_settings() -> Result<Self> {
        Self::from_config(Self::defaults()?.build()?)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("provider.url", DEFAULT_PROVIDER_URL)?
            .set_default("provider.poll_interval_secs", DEFAULT_POLL_INTERVAL_SECS)?
            .set_default("request.dataset", DATASET_NAME)?
            .set_default(
                "request.variables",
                DEFAULT_VARIABLES.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
            )?
            .set_default("request.country", DEFAULT_COUNTRY)?
            .set_default("request.data_type", DEFAULT_DATA_TYPE)?
            .set_default("request.leadtime_hour", DEFAULT_LEADTIME_HOUR)?
            .set_default("request.year", DEFAULT_YEAR)?
            .set_default("request.monthly_pause_secs", DEFAULT_MONTHLY_PAUSE_SECS)?)
    }

    fn from_config(config: Config) -> Result<Self> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn request_template(&self) -> RequestTemplate {
        RequestTemplate {
            variables: self.request.variables.clone(),
            country: self.request.country.clone(),
            data_type: self.request.data_type.clone(),
            leadtime_hour: self.request.leadtime_hour.clone(),
            year: self.request.year,
        }
    }

    pub fn credentials(&self) -> Result<ProviderCredentials> {
        ProviderCredentials::new(&self.provider.url, self.provider.key.as_deref())
    }

    /// Configured credentials file, or `~/.cdsapirc`.
    pub fn credentials_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.provider.credentials_file {
            return Ok(path.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_CREDENTIALS_FILE))
            .ok_or_else(|| {
                ProcessingError::Config(
                    "cannot locate home directory; set provider.credentials_file".to_string(),
                )
            })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.provider.poll_interval_secs)
    }

    pub fn monthly_pause(&self) -> Duration {
        Duration::from_secs(self.request.monthly_pause_secs)
    }

    pub fn stage1_output(&self) -> PathBuf {
        self.paths
            .stage1_output
            .clone()
            .unwrap_or_else(|| default_stage1_filename(&self.request.country, self.request.year))
    }

    pub fn stage2_output(&self) -> PathBuf {
        self.paths
            .stage2_output
            .clone()
            .unwrap_or_else(|| default_stage2_filename(&self.request.country, self.request.year))
    }

    /// Directory for temporary bundles: configured, else next to the stage-1 output.
    pub fn work_dir(&self, stage1_output: &Path) -> PathBuf {
        if let Some(dir) = &self.paths.work_dir {
            return dir.clone();
        }
        match stage1_output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
