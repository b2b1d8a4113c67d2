//! Configuration file handling for ~/.chronoatlas/config.ini.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::settings::Settings;
use crate::profile::FoldPolicy;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl Settings {
    /// Load settings from the default path (~/.chronoatlas/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load settings from a specific path.
    ///
    /// A missing file means defaults; a present-but-malformed file is
    /// an error, never silently ignored.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        parse_ini(&ini)
    }
}

fn parse_ini(ini: &Ini) -> Result<Settings, ConfigFileError> {
    let mut settings = Settings::default();

    if let Some(section) = ini.section(Some("datasets")) {
        let datasets = &mut settings.datasets;
        if let Some(value) = section.get("boundary_path") {
            datasets.boundary_path = PathBuf::from(value);
        }
        if let Some(value) = section.get("settlement_path") {
            datasets.settlement_path = PathBuf::from(value);
        }
        if let Some(value) = section.get("patch_path") {
            datasets.patch_path = PathBuf::from(value);
        }
    }

    if let Some(section) = ini.section(Some("cache")) {
        let cache = &mut settings.cache;
        if let Some(value) = section.get("capacity") {
            cache.capacity = parse_value("cache", "capacity", value)?;
        }
        if let Some(value) = section.get("enabled") {
            cache.enabled = parse_value("cache", "enabled", value)?;
        }
    }

    if let Some(section) = ini.section(Some("resolver")) {
        if let Some(value) = section.get("fold_policy") {
            settings.resolver.fold_policy =
                value
                    .parse::<FoldPolicy>()
                    .map_err(|e| ConfigFileError::InvalidValue {
                        section: "resolver".to_string(),
                        key: "fold_policy".to_string(),
                        value: value.to_string(),
                        reason: e.to_string(),
                    })?;
        }
    }

    Ok(settings)
}

fn parse_value<T: std::str::FromStr>(
    section: &str,
    key: &str,
    value: &str,
) -> Result<T, ConfigFileError> {
    value.parse().map_err(|_| ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: format!("expected a valid {}", std::any::type_name::<T>()),
    })
}

/// Get the path to the config directory (~/.chronoatlas).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".chronoatlas")
}

/// Get the path to the config file (~/.chronoatlas/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheSettings, DatasetSettings, ResolverSettings};
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = Settings::load_from(Path::new("/nonexistent/config.ini")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_full_config_parses() {
        let file = write_config(
            "[datasets]\n\
             boundary_path = /var/lib/chronoatlas/boundaries.json\n\
             settlement_path = /var/lib/chronoatlas/settlements.json\n\
             patch_path = /var/lib/chronoatlas/patches.json\n\
             \n\
             [cache]\n\
             capacity = 1024\n\
             enabled = false\n\
             \n\
             [resolver]\n\
             fold_policy = prefer_daylight_time\n",
        );

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(
            settings.datasets.patch_path,
            PathBuf::from("/var/lib/chronoatlas/patches.json")
        );
        assert_eq!(settings.cache.capacity, 1024);
        assert!(!settings.cache.enabled);
        assert_eq!(
            settings.resolver.fold_policy,
            FoldPolicy::PreferDaylightTime
        );
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let file = write_config("[cache]\ncapacity = 16\n");
        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.cache.capacity, 16);
        assert!(settings.cache.enabled);
        assert_eq!(settings.datasets, DatasetSettings::default());
        assert_eq!(settings.resolver, ResolverSettings::default());
    }

    #[test]
    fn test_invalid_capacity_rejected() {
        let file = write_config("[cache]\ncapacity = lots\n");
        let result = Settings::load_from(file.path());
        assert!(matches!(
            result,
            Err(ConfigFileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_invalid_fold_policy_rejected() {
        let file = write_config("[resolver]\nfold_policy = prefer_chaos\n");
        assert!(Settings::load_from(file.path()).is_err());
    }

    #[test]
    fn test_cache_settings_defaults() {
        let cache = CacheSettings::default();
        assert!(cache.enabled);
        assert_eq!(cache.capacity, crate::config::DEFAULT_CACHE_CAPACITY);
    }
}
