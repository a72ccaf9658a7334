//! Merge rules: built-in defaults that every later source overrides.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Plan limit of the personal cloud: 2 TiB.
pub const DEFAULT_QUOTA_BYTES: u64 = 2 * 1024 * 1024 * 1024 * 1024;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("storage.quota_bytes", DEFAULT_QUOTA_BYTES as i64)?
        .set_default("ingest.follow_symlinks", false)?
        .set_default("ingest.preserve_folders", false)?
        .set_default("enrichment.enabled", true)?
        .set_default("enrichment.scope", "all")?
        .set_default("logging.enabled", false)
}
