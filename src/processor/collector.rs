use ahash::AHashMap;
use tracing::debug;

use super::markers::MarkerTable;
use super::resolve::TypeResolver;
use super::round::{RootElement, Round};
use crate::ast::{Annotation, MethodDecl, TypeKind, Visibility};
use crate::filer::Origin;
use crate::lexer::Span;
use crate::stub::{RemoteClass, RemoteMethod};
use rmistub_utils::errors::Diagnostic;

/// A non-empty stub model and the declaration it was collected from.
#[derive(Debug, Clone)]
pub struct CollectedClass {
    pub class: RemoteClass,
    pub origin: Origin,
}

#[derive(Debug, Default)]
pub struct Collection {
    pub classes: Vec<CollectedClass>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct SignatureCollector<'a> {
    markers: &'a MarkerTable,
}

impl<'a> SignatureCollector<'a> {
    pub fn new(markers: &'a MarkerTable) -> Self {
        Self { markers }
    }

    pub fn collect(&self, round: &Round) -> Collection {
        let mut collection = Collection::default();
        for element in round.root_elements() {
            if let Some(collected) =
                self.collect_element(round, element, &mut collection.diagnostics)
            {
                collection.classes.push(collected);
            }
        }
        collection
    }

    /// Returns `None` for declarations that are not interfaces or classes and for
    /// types without a single eligible method.
    pub fn collect_element(
        &self,
        round: &Round,
        element: RootElement<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<CollectedClass> {
        let decl = element.decl;
        if !matches!(decl.kind, TypeKind::Class | TypeKind::Interface) {
            return None;
        }

        let source_id = element.source.source_id();
        self.check_markers(&source_id, &decl.annotations, diagnostics);
        let remote_type = self.markers.resolve(&decl.annotations).is_remote();

        let mut class = RemoteClass::new(element.qualified_name());
        let resolver = TypeResolver::new(round, &element.source.unit, decl);
        let mut seen: AHashMap<&str, Span> = AHashMap::new();

        for method in decl.methods() {
            self.check_markers(&source_id, &method.annotations, diagnostics);
            if !self.is_eligible(method, remote_type) {
                continue;
            }

            if let Some(first) = seen.insert(method.name.as_str(), method.span) {
                diagnostics.push(
                    Diagnostic::warning(
                        source_id.as_str(),
                        method.span,
                        format!(
                            "remote method `{}` is overloaded; stubs do not distinguish overloads",
                            method.name
                        ),
                    )
                    .with_label(format!(
                        "first declared at byte {}, redeclared here",
                        first.start()
                    ))
                    .with_help("rename one of the overloads or mark it @Local"),
                );
            }

            let remote_method = extract(method, &resolver.for_method(method));
            debug!(
                class = %class.qualified_name(),
                method = %remote_method.name(),
                params = remote_method.parameters().len(),
                "collected remote method"
            );
            class.add_method(remote_method);
        }

        if !class.has_methods() {
            debug!(class = %class.qualified_name(), "no remote methods, skipping");
            return None;
        }

        Some(CollectedClass {
            class,
            origin: element.origin(),
        })
    }

    fn is_eligible(&self, method: &MethodDecl, remote_type: bool) -> bool {
        if matches!(
            method.visibility(),
            Visibility::Private | Visibility::Protected
        ) {
            return false;
        }
        let markers = self.markers.resolve(&method.annotations);
        if markers.is_local() {
            return false;
        }
        remote_type || markers.is_remote()
    }

    fn check_markers(
        &self,
        source_id: &str,
        annotations: &[Annotation],
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for annotation in annotations {
            if let Some(marker) = self.markers.near_miss(annotation.simple_name()) {
                diagnostics.push(
                    Diagnostic::hint(
                        source_id,
                        annotation.span,
                        format!(
                            "`@{}` is not a stub marker and is ignored",
                            annotation.name
                        ),
                    )
                    .with_help(format!("did you mean `@{marker}`?")),
                );
            }
        }
    }
}

fn extract(method: &MethodDecl, resolver: &TypeResolver<'_>) -> RemoteMethod {
    let mut remote = RemoteMethod::new(method.name.as_str(), resolver.render(&method.return_type));
    for param in &method.params {
        remote.add_parameter(resolver.render_param(param), param.name.as_str());
    }
    for thrown in &method.throws {
        remote.add_exception(resolver.render(thrown));
    }
    remote
}
