use std::path::PathBuf;

use ahash::AHashSet;

use crate::ast::{CompilationUnit, TypeDecl};
use crate::filer::Origin;

/// A parsed source file together with the text it was parsed from.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub source: String,
    pub unit: CompilationUnit,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>, unit: CompilationUnit) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            unit,
        }
    }

    pub fn source_id(&self) -> String {
        self.path.display().to_string()
    }
}

/// Everything visible to one processing pass.
#[derive(Debug, Default)]
pub struct Round {
    units: Vec<SourceUnit>,
    declared: AHashSet<String>,
}

impl Round {
    pub fn new(units: Vec<SourceUnit>) -> Self {
        let declared = units
            .iter()
            .flat_map(|source| {
                source
                    .unit
                    .types
                    .iter()
                    .map(move |decl| source.unit.qualify(&decl.name))
            })
            .collect();
        Self { units, declared }
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    /// Whether a top-level type with this qualified name is part of the round.
    pub fn declares(&self, qualified_name: &str) -> bool {
        self.declared.contains(qualified_name)
    }

    pub fn unit_for(&self, source_id: &str) -> Option<&SourceUnit> {
        self.units
            .iter()
            .find(|source| source.source_id() == source_id)
    }

    /// Top-level declarations of every unit, in source order.
    pub fn root_elements(&self) -> impl Iterator<Item = RootElement<'_>> {
        self.units.iter().flat_map(|source| {
            source
                .unit
                .types
                .iter()
                .map(move |decl| RootElement { source, decl })
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RootElement<'a> {
    pub source: &'a SourceUnit,
    pub decl: &'a TypeDecl,
}

impl RootElement<'_> {
    pub fn qualified_name(&self) -> String {
        self.source.unit.qualify(&self.decl.name)
    }

    pub fn origin(&self) -> Origin {
        Origin::new(self.qualified_name(), self.source.path.clone())
    }
}
