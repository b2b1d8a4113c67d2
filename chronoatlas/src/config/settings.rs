//! Settings structs and defaults.

use std::path::PathBuf;

use crate::profile::FoldPolicy;

/// Default cache capacity in entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 8192;

/// Environment variables that override dataset paths.
pub const ENV_BOUNDARY_PATH: &str = "CHRONOATLAS_BOUNDARIES";
pub const ENV_SETTLEMENT_PATH: &str = "CHRONOATLAS_SETTLEMENTS";
pub const ENV_PATCH_PATH: &str = "CHRONOATLAS_PATCHES";

/// Full service configuration.
///
/// Loaded from an INI file at startup (missing file means defaults),
/// then overridden by environment variables for the dataset paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub datasets: DatasetSettings,
    pub cache: CacheSettings,
    pub resolver: ResolverSettings,
}

/// Paths of the three startup datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSettings {
    pub boundary_path: PathBuf,
    pub settlement_path: PathBuf,
    pub patch_path: PathBuf,
}

/// Coordinate lookup cache tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Maximum number of memoized coordinate cells.
    pub capacity: usize,
    /// Disable to trade latency for zero shared mutable state; results
    /// are identical either way.
    pub enabled: bool,
}

/// Ambiguity resolution tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    /// Fold policy used by profiles that do not pin their own.
    pub fold_policy: FoldPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            datasets: DatasetSettings::default(),
            cache: CacheSettings::default(),
            resolver: ResolverSettings::default(),
        }
    }
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            boundary_path: PathBuf::from("data/boundaries.json"),
            settlement_path: PathBuf::from("data/settlements.json"),
            patch_path: PathBuf::from("data/patches.json"),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            enabled: true,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            fold_policy: FoldPolicy::default(),
        }
    }
}

impl Settings {
    /// Apply `CHRONOATLAS_*` environment overrides for dataset paths.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(ENV_BOUNDARY_PATH) {
            self.datasets.boundary_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var(ENV_SETTLEMENT_PATH) {
            self.datasets.settlement_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var(ENV_PATCH_PATH) {
            self.datasets.patch_path = PathBuf::from(path);
        }
    }
}
