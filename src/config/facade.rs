//! Configuration loader: layers every source in precedence order.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::CloudflowConfig;
use crate::error::ApiError;
use config::{Environment, File};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Sources, lowest to highest precedence: built-in defaults, the global config file,
    /// `config/config.toml` and `config/{CLOUDFLOW_ENV}.toml` under the workspace, then
    /// `CLOUDFLOW_*` environment variables (`__` separates nested keys).
    pub fn load(workspace_root: &Path) -> Result<CloudflowConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder.add_source(environment()).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load from one explicit file (plus defaults and environment).
    pub fn load_from_file(path: &Path) -> Result<CloudflowConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .add_source(environment())
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Global config file location, if a home directory is known.
    pub fn xdg_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    /// Built-in defaults only.
    pub fn default() -> CloudflowConfig {
        CloudflowConfig::default()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("CLOUDFLOW")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
