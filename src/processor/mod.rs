//! One processing pass: collect remote signatures from a round and emit a stub
//! artifact for every class that has any.

pub mod collector;
pub mod markers;
pub mod resolve;
pub mod round;

use std::path::PathBuf;

use tracing::{error, info};

use crate::filer::Filer;
use crate::stub::{EmitError, StubBuilder, StubSerializer};
use rmistub_utils::errors::Diagnostic;

pub use collector::{CollectedClass, Collection, SignatureCollector};
pub use markers::{Marker, MarkerSet, MarkerTable};
pub use resolve::TypeResolver;
pub use round::{RootElement, Round, SourceUnit};

/// Outcome for a single remote class.
#[derive(Debug)]
pub struct ClassReport {
    pub qualified_name: String,
    pub methods: usize,
    pub location: Option<PathBuf>,
    pub errors: Vec<EmitError>,
}

impl ClassReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ProcessReport {
    pub classes: Vec<ClassReport>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ProcessReport {
    pub fn emitted(&self) -> impl Iterator<Item = &ClassReport> {
        self.classes.iter().filter(|class| class.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ClassReport> {
        self.classes.iter().filter(|class| !class.is_ok())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }
}

pub struct Processor<'a> {
    markers: MarkerTable,
    filer: &'a mut dyn Filer,
    serializer: &'a dyn StubSerializer,
}

impl<'a> Processor<'a> {
    pub fn new(
        markers: MarkerTable,
        filer: &'a mut dyn Filer,
        serializer: &'a dyn StubSerializer,
    ) -> Self {
        Self {
            markers,
            filer,
            serializer,
        }
    }

    pub fn collect(&self, round: &Round) -> Collection {
        SignatureCollector::new(&self.markers).collect(round)
    }

    /// Runs the whole pass. A failing class is reported and the pass moves on.
    pub fn process(&mut self, round: &Round) -> ProcessReport {
        let Collection {
            classes,
            diagnostics,
        } = self.collect(round);

        let mut builder = StubBuilder::new(&mut *self.filer, self.serializer);
        let mut reports = Vec::with_capacity(classes.len());

        for CollectedClass { class, origin } in classes {
            let emission = builder.emit(&class, &origin);
            if emission.is_ok() {
                if let Some(location) = &emission.location {
                    info!(
                        class = %class.qualified_name(),
                        methods = class.methods().len(),
                        artifact = %location.display(),
                        "generated stub"
                    );
                }
            } else {
                for err in &emission.errors {
                    error!(class = %class.qualified_name(), "{err}");
                }
            }

            reports.push(ClassReport {
                qualified_name: class.qualified_name().to_string(),
                methods: class.methods().len(),
                location: emission.location,
                errors: emission.errors,
            });
        }

        ProcessReport {
            classes: reports,
            diagnostics,
        }
    }
}
