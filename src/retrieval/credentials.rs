use crate::error::{ProcessingError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Endpoint and API key of the data store account.
#[derive(Clone)]
pub struct ProviderCredentials {
    pub url: String,
    pub key: String,
}

impl ProviderCredentials {
    /// Fails when no key was configured; keys are never compiled in.
    pub fn new(url: &str, key: Option<&str>) -> Result<Self> {
        let key = key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ProcessingError::Config(
                    "no API key configured; set AQ_PROVIDER__KEY or provider.key".to_string(),
                )
            })?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Writes the two-line `url:` / `key:` file read by the data store's own tooling.
pub fn write_credentials_file(path: &Path, credentials: &ProviderCredentials) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "url: {}", credentials.url)?;
    writeln!(writer, "key: {}", credentials.key)?;
    writer.flush()?;
    restrict_permissions(path)?;

    info!(path = %path.display(), "Wrote provider credentials file");
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
