//! Integration tests for layered configuration loading

use super::test_utils::with_isolated_env;
use cloudflow::config::{ConfigLoader, DEFAULT_QUOTA_BYTES};
use cloudflow::enrich::EnrichmentScope;
use cloudflow::provider::ProviderType;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_defaults_without_any_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = with_isolated_env(&temp_dir, &[], || {
        ConfigLoader::load(&temp_dir.path().join("ws")).unwrap()
    });
    assert_eq!(config.storage.quota_bytes, Some(DEFAULT_QUOTA_BYTES));
    assert!(!config.ingest.preserve_folders);
    assert!(config.enrichment.enabled);
    assert_eq!(config.enrichment.scope, EnrichmentScope::All);
    assert!(!config.logging.enabled);
}

#[test]
fn test_workspace_file_overrides_global_file() {
    let temp_dir = TempDir::new().unwrap();
    let global_dir = temp_dir.path().join("config").join("cloudflow");
    fs::create_dir_all(&global_dir).unwrap();
    fs::write(
        global_dir.join("config.toml"),
        r#"
[storage]
quota_bytes = 5000

[ingest]
preserve_folders = true
ignore_patterns = [".DS_Store"]
"#,
    )
    .unwrap();

    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(workspace.join("config")).unwrap();
    fs::write(
        workspace.join("config").join("config.toml"),
        r#"
[storage]
quota_bytes = 9000

[enrichment]
scope = "latest"

[enrichment.provider]
provider_type = "ollama"
model = "llama3"
"#,
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir, &[], || ConfigLoader::load(&workspace).unwrap());
    assert_eq!(config.storage.quota_bytes, Some(9000));
    assert!(config.ingest.preserve_folders);
    assert_eq!(config.ingest.ignore_patterns, vec![".DS_Store".to_string()]);
    assert_eq!(config.enrichment.scope, EnrichmentScope::Latest);
    let provider = config.enrichment.provider.unwrap();
    assert_eq!(provider.provider_type, ProviderType::Ollama);
    assert_eq!(provider.model, "llama3");
}

#[test]
fn test_environment_file_and_variables() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(workspace.join("config")).unwrap();
    fs::write(
        workspace.join("config").join("staging.toml"),
        "[ingest]\nfollow_symlinks = true\n",
    )
    .unwrap();

    let config = with_isolated_env(
        &temp_dir,
        &[
            ("CLOUDFLOW_ENV", "staging"),
            ("CLOUDFLOW_STORAGE__QUOTA_BYTES", "1234"),
            ("CLOUDFLOW_ENRICHMENT__ENABLED", "false"),
        ],
        || ConfigLoader::load(&workspace).unwrap(),
    );
    assert!(config.ingest.follow_symlinks);
    assert_eq!(config.storage.quota_bytes, Some(1234));
    assert!(!config.enrichment.enabled);
}

#[test]
fn test_invalid_values_are_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("bad.toml");
    fs::write(
        &config_file,
        r#"
[storage]
quota_bytes = 0

[logging]
level = "loud"
"#,
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir, &[], || {
        ConfigLoader::load_from_file(&config_file).unwrap()
    });
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(config.validated().is_err());
}
