//! Canonical type text, as the Java compiler prints declared types: class names
//! qualified where they can be resolved, type arguments joined by `,` without
//! spaces, arrays as `[]` and varargs as `...`.

use ahash::AHashSet;
use once_cell::sync::Lazy;

use super::round::Round;
use crate::ast::{BoundKind, CompilationUnit, MethodDecl, Param, TypeArg, TypeDecl, TypeRef};

static JAVA_LANG: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    [
        "AutoCloseable",
        "ArithmeticException",
        "ArrayIndexOutOfBoundsException",
        "Boolean",
        "Byte",
        "CharSequence",
        "Character",
        "Class",
        "ClassCastException",
        "ClassNotFoundException",
        "CloneNotSupportedException",
        "Cloneable",
        "Comparable",
        "Deprecated",
        "Double",
        "Enum",
        "Error",
        "Exception",
        "Float",
        "IllegalArgumentException",
        "IllegalStateException",
        "IndexOutOfBoundsException",
        "Integer",
        "InterruptedException",
        "Iterable",
        "Long",
        "Math",
        "NullPointerException",
        "Number",
        "NumberFormatException",
        "Object",
        "Override",
        "Record",
        "ReflectiveOperationException",
        "Runnable",
        "RuntimeException",
        "SecurityException",
        "Short",
        "String",
        "StringBuffer",
        "StringBuilder",
        "System",
        "Thread",
        "Throwable",
        "UnsupportedOperationException",
        "Void",
    ]
    .into_iter()
    .collect()
});

pub struct TypeResolver<'a> {
    round: &'a Round,
    unit: &'a CompilationUnit,
    enclosing: &'a TypeDecl,
    enclosing_name: String,
    type_vars: Vec<&'a str>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(round: &'a Round, unit: &'a CompilationUnit, enclosing: &'a TypeDecl) -> Self {
        Self {
            round,
            unit,
            enclosing,
            enclosing_name: unit.qualify(&enclosing.name),
            type_vars: enclosing.type_params.iter().map(String::as_str).collect(),
        }
    }

    /// Resolver that also sees the method's own type variables.
    pub fn for_method(&self, method: &'a MethodDecl) -> TypeResolver<'a> {
        let mut type_vars = self.type_vars.clone();
        type_vars.extend(method.type_params.iter().map(String::as_str));
        TypeResolver {
            round: self.round,
            unit: self.unit,
            enclosing: self.enclosing,
            enclosing_name: self.enclosing_name.clone(),
            type_vars,
        }
    }

    pub fn render_param(&self, param: &Param) -> String {
        let rendered = self.render(&param.ty);
        if param.varargs {
            format!("{rendered}...")
        } else {
            rendered
        }
    }

    pub fn render(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Void => "void".to_string(),
            TypeRef::Primitive(name) => name.clone(),
            TypeRef::Array(element) => format!("{}[]", self.render(element)),
            TypeRef::Named(segments) => {
                let mut out = String::new();
                for (idx, segment) in segments.iter().enumerate() {
                    if idx == 0 {
                        match self.qualify(&segment.name) {
                            Some(qualified) => out.push_str(&qualified),
                            None => out.push_str(&segment.name),
                        }
                    } else {
                        out.push('.');
                        out.push_str(&segment.name);
                    }
                    if !segment.args.is_empty() {
                        let args: Vec<String> =
                            segment.args.iter().map(|arg| self.render_arg(arg)).collect();
                        out.push('<');
                        out.push_str(&args.join(","));
                        out.push('>');
                    }
                }
                out
            }
        }
    }

    fn render_arg(&self, arg: &TypeArg) -> String {
        match arg {
            TypeArg::Type(ty) => self.render(ty),
            TypeArg::Wildcard(None) => "?".to_string(),
            TypeArg::Wildcard(Some((BoundKind::Extends, ty))) => {
                format!("? extends {}", self.render(ty))
            }
            TypeArg::Wildcard(Some((BoundKind::Super, ty))) => {
                format!("? super {}", self.render(ty))
            }
        }
    }

    /// Scopes in shadowing order: type variables, member types of the enclosing
    /// type, single-type imports, the current package, on-demand imports of types
    /// declared in the round, `java.lang`.
    fn qualify(&self, name: &str) -> Option<String> {
        if self.type_vars.contains(&name) {
            return None;
        }
        if self.enclosing.nested_types().any(|nested| nested.name == name) {
            return Some(format!("{}.{name}", self.enclosing_name));
        }
        if let Some(import) = self
            .unit
            .imports
            .iter()
            .find(|import| import.imported_name() == Some(name))
        {
            return Some(import.path.clone());
        }
        let same_package = self.unit.qualify(name);
        if self.round.declares(&same_package) {
            return Some(same_package);
        }
        if let Some(on_demand) = self
            .unit
            .imports
            .iter()
            .filter(|import| import.is_wildcard && !import.is_static)
            .map(|import| format!("{}.{name}", import.path))
            .find(|candidate| self.round.declares(candidate))
        {
            return Some(on_demand);
        }
        if JAVA_LANG.contains(name) {
            return Some(format!("java.lang.{name}"));
        }
        None
    }
}
