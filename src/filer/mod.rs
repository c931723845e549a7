//! Resource creation for generated artifacts.
//!
//! Every resource is created on behalf of an originating declaration so the set of
//! generated files can be traced back to the sources that produced them.

pub mod manifest;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use ahash::AHashSet;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use manifest::{DependencyManifest, ManifestEntry};

/// Declaration a generated resource was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub element: String,
    pub source: PathBuf,
}

impl Origin {
    pub fn new(element: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            element: element.into(),
            source: source.into(),
        }
    }
}

/// An open output resource. The writer lives exactly as long as the resource;
/// `close` flushes it and reports any failure.
pub struct Resource {
    location: PathBuf,
    sink: Box<dyn Write>,
}

impl Resource {
    pub fn new(location: impl Into<PathBuf>, sink: Box<dyn Write>) -> Self {
        Self {
            location: location.into(),
            sink,
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn writer(&mut self) -> &mut dyn Write {
        self.sink.as_mut()
    }

    pub fn close(mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

pub trait Filer {
    /// Creates `file_name` under the directory of `package` (`a.b` → `a/b/`).
    fn create_resource(
        &mut self,
        package: &str,
        file_name: &str,
        origin: &Origin,
    ) -> io::Result<Resource>;

    /// Withdraws a created resource whose contents could not be written in full.
    /// The path stays reserved for the rest of the pass.
    fn discard(&mut self, location: &Path);
}

/// Relative path of a resource inside the output root.
pub fn resource_path(package: &str, file_name: &str) -> PathBuf {
    let mut path = PathBuf::new();
    for segment in package.split('.').filter(|segment| !segment.is_empty()) {
        path.push(segment);
    }
    path.push(file_name);
    path
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedResource {
    /// Relative to the filer root.
    pub path: PathBuf,
    pub origin: Origin,
}

/// Filer writing below a root directory on the local file system.
pub struct FsFiler {
    root: PathBuf,
    reserved: AHashSet<PathBuf>,
    generated: Vec<GeneratedResource>,
}

impl FsFiler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            reserved: AHashSet::new(),
            generated: Vec::new(),
        }
    }

    pub fn generated(&self) -> &[GeneratedResource] {
        &self.generated
    }

    /// Writes the dependency manifest next to the generated resources.
    pub fn write_manifest(&self, generator_version: &str) -> Result<PathBuf> {
        let manifest = DependencyManifest::from_resources(&self.generated, generator_version);
        let path = self.root.join(DependencyManifest::FILE_NAME);
        manifest.write_to_yaml(&path)?;
        Ok(path)
    }
}

impl Filer for FsFiler {
    fn create_resource(
        &mut self,
        package: &str,
        file_name: &str,
        origin: &Origin,
    ) -> io::Result<Resource> {
        let relative = resource_path(package, file_name);
        if !self.reserved.insert(relative.clone()) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "attempt to recreate {} in the same pass (requested by {})",
                    relative.display(),
                    origin.element
                ),
            ));
        }

        let location = self.root.join(&relative);
        if let Some(parent) = location.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&location)?;
        debug!(resource = %location.display(), origin = %origin.element, "created resource");

        self.generated.push(GeneratedResource {
            path: relative,
            origin: origin.clone(),
        });
        Ok(Resource::new(location, Box::new(BufWriter::new(file))))
    }

    fn discard(&mut self, location: &Path) {
        let root = &self.root;
        self.generated
            .retain(|resource| root.join(&resource.path) != location);
        match fs::remove_file(location) {
            Ok(()) => debug!(resource = %location.display(), "discarded incomplete resource"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(
                resource = %location.display(),
                "failed to remove incomplete resource: {err}"
            ),
        }
    }
}
