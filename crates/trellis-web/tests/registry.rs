//! Loading and reloading the registry from a manifest on disk

use std::io::Write;
use trellis_config::TrellisConfig;
use trellis_core::{ComponentCatalog, PassThrough};
use trellis_web::{load_registry, reload_registry, WebError};

fn catalog() -> ComponentCatalog {
    ComponentCatalog::new().with("Page", PassThrough)
}

fn manifest_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn config_for(file: &tempfile::NamedTempFile) -> TrellisConfig {
    let mut config = TrellisConfig::default();
    config.registry.manifest_path = Some(file.path().to_path_buf());
    config
}

#[tokio::test]
async fn loads_manifest_named_in_config() {
    let file = manifest_file(r#"{"views": [{"path": "/a", "component": "Page"}]}"#);
    let handle = load_registry(&config_for(&file), &catalog()).await.unwrap();

    let chain = handle.resolver().resolve_chain("/a").unwrap();
    assert_eq!(chain.identifiers(), vec!["root", "/a"]);
}

#[tokio::test]
async fn missing_manifest_path_is_config_error() {
    let err = load_registry(&TrellisConfig::default(), &catalog()).await.unwrap_err();
    assert!(matches!(err, WebError::Config(_)));
}

#[tokio::test]
async fn failed_reload_keeps_running_registry() {
    let file = manifest_file(r#"{"views": [{"path": "/a", "component": "Page"}]}"#);
    let config = config_for(&file);
    let handle = load_registry(&config, &catalog()).await.unwrap();

    std::fs::write(file.path(), r#"{"views": [{"path": "/b", "component": "Missing"}]}"#).unwrap();
    let err = reload_registry(&handle, &config, &catalog()).await.unwrap_err();
    assert_eq!(err.category(), "unknown_component");
    assert!(handle.resolver().resolve_chain("/a").is_ok());

    std::fs::write(file.path(), r#"{"views": [{"path": "/b", "component": "Page"}]}"#).unwrap();
    reload_registry(&handle, &config, &catalog()).await.unwrap();
    assert!(handle.resolver().resolve_chain("/a").is_err());
    assert!(handle.resolver().resolve_chain("/b").is_ok());
}
