//! Application settings and paths.
//!
//! Settings are read from `settings.json` in the XDG config directory
//! (`~/.config/nscan` on Linux) or from an explicit path.

use crate::cli::OutputFormat;
use crate::error::{ConfigError, ConfigResult};
use crate::scanner::{ScanOptions, DEFAULT_CONCURRENCY};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/nscan)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the platform directories. Nothing is created on disk.
    pub fn discover() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "nscan", "nscan").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// User defaults for scans and output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Maximum scan units in flight.
    pub concurrency: usize,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Banner read timeout in milliseconds.
    pub read_timeout_ms: u64,
    /// Grab banners unless told otherwise.
    pub grab_banners: bool,
    /// Default output format.
    pub output: OutputFormat,
}

impl Default for AppSettings {
    fn default() -> Self {
        let options = ScanOptions::default();
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            connect_timeout_ms: options.connect_timeout.as_millis() as u64,
            read_timeout_ms: options.read_timeout.as_millis() as u64,
            grab_banners: options.grab_banners,
            output: OutputFormat::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    ///
    /// A missing file is not an error; built-in defaults apply.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::discover()?.settings_file();

        if !file.exists() {
            debug!(path = %file.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;
        debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Reject values that would make a scan meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.connect_timeout_ms == 0 || self.read_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Scan options these settings describe.
    pub fn scan_options(&self) -> ScanOptions {
        let options = ScanOptions::default()
            .with_concurrency(self.concurrency)
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_read_timeout(Duration::from_millis(self.read_timeout_ms));

        if self.grab_banners {
            options.with_banners()
        } else {
            options
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.concurrency, 100);
        assert_eq!(settings.connect_timeout_ms, 500);
        assert_eq!(settings.read_timeout_ms, 1000);
        assert_eq!(settings.scan_options(), ScanOptions::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "concurrency": 25, "grab_banners": true }}"#).unwrap();

        let settings = AppSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.concurrency, 25);
        assert!(settings.grab_banners);
        assert_eq!(settings.connect_timeout_ms, 500);

        let options = settings.scan_options();
        assert_eq!(options.concurrency, 25);
        assert!(options.grab_banners);
    }

    #[test]
    fn test_malformed_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "concurrency = 25").unwrap();
        assert!(matches!(
            AppSettings::load_from(file.path()),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "concurrency": 0 }}"#).unwrap();
        assert!(matches!(
            AppSettings::load_from(file.path()),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            AppSettings::load_from(&path),
            Err(ConfigError::ReadFailed { .. })
        ));
    }
}
