use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::model::RemoteClass;
use super::serializer::StubSerializer;
use crate::filer::{Filer, Origin};

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to create {file_name} in package `{package}`: {source}")]
    Create {
        package: String,
        file_name: String,
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to close {}: {source}", path.display())]
    Close { path: PathBuf, source: io::Error },
}

/// Outcome of emitting one class.
#[derive(Debug)]
pub struct Emission {
    pub location: Option<PathBuf>,
    pub errors: Vec<EmitError>,
}

impl Emission {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Writes finished stub models through a filer, one artifact per class.
pub struct StubBuilder<'a> {
    filer: &'a mut dyn Filer,
    serializer: &'a dyn StubSerializer,
}

impl<'a> StubBuilder<'a> {
    pub fn new(filer: &'a mut dyn Filer, serializer: &'a dyn StubSerializer) -> Self {
        Self { filer, serializer }
    }

    /// Never fails as a whole: every I/O error is captured in the returned
    /// [`Emission`] so the caller can carry on with the next class.
    pub fn emit(&mut self, class: &RemoteClass, origin: &Origin) -> Emission {
        let file_name = class.file_name(self.serializer.extension());
        let mut resource =
            match self
                .filer
                .create_resource(class.package_name(), &file_name, origin)
            {
                Ok(resource) => resource,
                Err(source) => {
                    return Emission {
                        location: None,
                        errors: vec![EmitError::Create {
                            package: class.package_name().to_string(),
                            file_name,
                            source,
                        }],
                    };
                }
            };

        let location = resource.location().to_path_buf();
        let mut errors = Vec::new();
        if let Err(source) = self.serializer.serialize(class, resource.writer()) {
            errors.push(EmitError::Write {
                path: location.clone(),
                source,
            });
        }
        // closed on both paths; a close failure is recorded, never propagated
        if let Err(source) = resource.close() {
            errors.push(EmitError::Close {
                path: location.clone(),
                source,
            });
        }

        if !errors.is_empty() {
            self.filer.discard(&location);
        }

        Emission {
            location: Some(location),
            errors,
        }
    }
}
