use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use rmistub::config::{Config, MarkerConfig};
use rmistub::stub::StubFormat;

fn temp_config_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("rmistub-config-test")
        .tempdir()
        .expect("failed to create temp dir")
}

#[test]
fn defaults_when_empty() -> Result<()> {
    let config = Config::from_yaml_str("")?;
    assert_eq!(config, Config::default());
    assert_eq!(config.output_dir, PathBuf::from("rmi"));
    assert_eq!(config.format, StubFormat::Script);
    assert!(config.manifest);
    assert_eq!(config.markers, MarkerConfig::default());
    Ok(())
}

#[test]
fn partial_yaml_keeps_remaining_defaults() -> Result<()> {
    let config = Config::from_yaml_str(
        "output-dir: build/stubs\n\
         format: json\n\
         markers:\n  remote: [Exported]\n",
    )?;

    assert_eq!(config.output_dir, PathBuf::from("build/stubs"));
    assert_eq!(config.format, StubFormat::Json);
    assert_eq!(config.extension, None);
    assert!(config.manifest);
    assert_eq!(config.markers.remote, ["Exported"]);
    assert!(config.markers.local.is_empty());
    Ok(())
}

#[test]
fn unknown_format_is_rejected() {
    assert!(Config::from_yaml_str("format: xml\n").is_err());
}

#[test]
fn explicit_path_is_loaded() -> Result<()> {
    let dir = temp_config_dir();
    let path = dir.path().join("stubs.yaml");
    fs::write(&path, "extension: mjs\nmanifest: false\n")?;

    let config = Config::load(Some(path.as_path()))?;
    assert_eq!(config.extension.as_deref(), Some("mjs"));
    assert!(!config.manifest);
    Ok(())
}

#[test]
fn missing_explicit_path_is_an_error() {
    let dir = temp_config_dir();
    let path = dir.path().join("absent.yaml");
    let err = Config::load(Some(path.as_path())).expect_err("should fail");
    assert!(format!("{err:#}").contains("failed to read configuration"));
}

#[cfg(not(feature = "toml-config"))]
#[test]
fn toml_requires_the_feature() -> Result<()> {
    let dir = temp_config_dir();
    let path = dir.path().join("rmistub.toml");
    fs::write(&path, "format = \"json\"\n")?;
    assert!(Config::from_path(&path).is_err());
    Ok(())
}

#[cfg(feature = "toml-config")]
#[test]
fn toml_is_read_with_the_feature() -> Result<()> {
    let dir = temp_config_dir();
    let path = dir.path().join("rmistub.toml");
    fs::write(&path, "format = \"json\"\n\n[markers]\nlocal = [\"Hidden\"]\n")?;
    let config = Config::from_path(&path)?;
    assert_eq!(config.format, StubFormat::Json);
    assert_eq!(config.markers.local, ["Hidden"]);
    Ok(())
}
