//! Configuration for the resolution core.
//!
//! Settings come from an INI file (defaults when absent) with
//! environment-variable overrides for the dataset paths. Dataset
//! loading itself happens in the respective index modules; a missing or
//! malformed dataset is a fatal startup error, but a missing config
//! file is not.

mod file;
mod settings;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CacheSettings, DatasetSettings, ResolverSettings, Settings, DEFAULT_CACHE_CAPACITY,
    ENV_BOUNDARY_PATH, ENV_PATCH_PATH, ENV_SETTLEMENT_PATH,
};
