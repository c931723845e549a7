use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stub::StubFormat;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Root directory for generated stubs.
    pub output_dir: PathBuf,
    pub format: StubFormat,
    /// Overrides the format's default file extension.
    pub extension: Option<String>,
    /// Write `rmistub-manifest.yaml` into the output directory.
    pub manifest: bool,
    pub markers: MarkerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("rmi"),
            format: StubFormat::default(),
            extension: None,
            manifest: true,
            markers: MarkerConfig::default(),
        }
    }
}

/// Annotation simple names recognised in addition to the built-in markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub remote: Vec<String>,
    pub local: Vec<String>,
}

impl Config {
    pub const FILE_NAME: &'static str = "rmistub.yaml";
    #[cfg(feature = "toml-config")]
    pub const TOML_FILE_NAME: &'static str = "rmistub.toml";

    /// Loads `explicit` when given, otherwise the configuration file in the
    /// working directory, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }

        let yaml = Path::new(Self::FILE_NAME);
        if yaml.exists() {
            return Self::from_path(yaml);
        }

        #[cfg(feature = "toml-config")]
        {
            let toml_path = Path::new(Self::TOML_FILE_NAME);
            if toml_path.exists() {
                return Self::from_path(toml_path);
            }
        }

        debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        debug!(config = %path.display(), "loading configuration");

        match path.extension().and_then(OsStr::to_str) {
            #[cfg(feature = "toml-config")]
            Some("toml") => toml::from_str(&contents)
                .with_context(|| format!("invalid configuration in {}", path.display())),
            #[cfg(not(feature = "toml-config"))]
            Some("toml") => anyhow::bail!(
                "{} is a TOML file; rebuild with the `toml-config` feature to read it",
                path.display()
            ),
            _ => Self::from_yaml_str(&contents)
                .with_context(|| format!("invalid configuration in {}", path.display())),
        }
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }
}
