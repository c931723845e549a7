use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tracing::warn;

use super::GeneratedResource;

/// Maps every generated artifact to the declaration and source file it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyManifest {
    pub generator_version: String,
    pub generated_at: DateTime<Utc>,
    pub artifacts: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub artifact: PathBuf,
    pub element: String,
    pub source: PathBuf,
    /// SHA-1 of the source file at generation time.
    pub fingerprint: Option<String>,
}

impl DependencyManifest {
    pub const FILE_NAME: &'static str = "rmistub-manifest.yaml";

    pub fn from_resources(resources: &[GeneratedResource], generator_version: &str) -> Self {
        let mut fingerprints: AHashMap<&Path, Option<String>> = AHashMap::new();
        let artifacts = resources
            .iter()
            .map(|resource| {
                let source = resource.origin.source.as_path();
                let fingerprint = fingerprints
                    .entry(source)
                    .or_insert_with(|| match fingerprint(source) {
                        Ok(digest) => Some(digest),
                        Err(err) => {
                            warn!(source = %source.display(), "{err:#}");
                            None
                        }
                    })
                    .clone();
                ManifestEntry {
                    artifact: resource.path.clone(),
                    element: resource.origin.element.clone(),
                    source: resource.origin.source.clone(),
                    fingerprint,
                }
            })
            .collect();

        Self {
            generator_version: generator_version.to_string(),
            generated_at: Utc::now(),
            artifacts,
        }
    }

    /// Artifacts generated from `source`.
    pub fn artifacts_for(&self, source: &Path) -> impl Iterator<Item = &ManifestEntry> {
        self.artifacts
            .iter()
            .filter(move |entry| entry.source == source)
    }

    pub fn write_to_yaml(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("failed to serialise dependency manifest")?;
        let mut file = File::create(path)
            .with_context(|| format!("failed to open manifest {}", path.display()))?;
        file.write_all(yaml.as_bytes())
            .context("failed to write dependency manifest")
    }

    pub fn read_from_yaml(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open manifest {}", path.display()))?;
        serde_yaml::from_reader(file).context("failed to deserialise dependency manifest")
    }
}

pub fn fingerprint(path: &Path) -> Result<String> {
    let data =
        fs::read(path).with_context(|| format!("failed to read {} for hashing", path.display()))?;
    Ok(format!("{:x}", Sha1::digest(&data)))
}
