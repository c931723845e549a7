use std::fmt;

use crate::lexer::Span;

/// One parsed `.java` source file.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
}

impl CompilationUnit {
    pub fn new(package: Option<String>, imports: Vec<ImportDecl>, types: Vec<TypeDecl>) -> Self {
        Self {
            package,
            imports,
            types,
        }
    }

    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or_default()
    }

    /// Fully qualified name of a top-level type declared in this unit.
    pub fn qualify(&self, simple_name: &str) -> String {
        match self.package.as_deref() {
            Some(package) if !package.is_empty() => format!("{package}.{simple_name}"),
            _ => simple_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub path: String,
    pub is_static: bool,
    pub is_wildcard: bool,
}

impl ImportDecl {
    /// Simple name brought into scope by a single-type import.
    pub fn imported_name(&self) -> Option<&str> {
        if self.is_static || self.is_wildcard {
            return None;
        }
        self.path.rsplit('.').next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Annotation => "@interface",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Default,
    Synchronized,
    Native,
    Transient,
    Volatile,
    Strictfp,
    Sealed,
    NonSealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

impl Visibility {
    pub fn of(modifiers: &[Modifier]) -> Self {
        if modifiers.contains(&Modifier::Private) {
            Visibility::Private
        } else if modifiers.contains(&Modifier::Protected) {
            Visibility::Protected
        } else if modifiers.contains(&Modifier::Public) {
            Visibility::Public
        } else {
            Visibility::Package
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    pub span: Span,
}

impl Annotation {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// `javax.ejb.Remote` and `Remote` both answer `Remote`.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    pub type_params: Vec<String>,
    pub members: Vec<Member>,
    pub span: Span,
}

impl TypeDecl {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|member| match member {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn nested_types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.members.iter().filter_map(|member| match member {
            Member::Type(decl) => Some(decl),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Member {
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Field(FieldDecl),
    Type(TypeDecl),
    Initializer,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    pub type_params: Vec<String>,
    pub return_type: TypeRef,
    pub params: Vec<Param>,
    pub throws: Vec<TypeRef>,
    pub span: Span,
}

impl MethodDecl {
    pub fn visibility(&self) -> Visibility {
        Visibility::of(&self.modifiers)
    }
}

#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub name: String,
    pub modifiers: Vec<Modifier>,
    pub params: Vec<Param>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub modifiers: Vec<Modifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: TypeRef,
    pub name: String,
    pub varargs: bool,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Void,
    Primitive(String),
    Named(Vec<TypeSegment>),
    Array(Box<TypeRef>),
}

/// Renders the type exactly as written, without any name resolution.
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => f.write_str("void"),
            TypeRef::Primitive(name) => f.write_str(name),
            TypeRef::Array(element) => write!(f, "{element}[]"),
            TypeRef::Named(segments) => {
                for (idx, segment) in segments.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(&segment.name)?;
                    if !segment.args.is_empty() {
                        f.write_str("<")?;
                        for (arg_idx, arg) in segment.args.iter().enumerate() {
                            if arg_idx > 0 {
                                f.write_str(",")?;
                            }
                            write!(f, "{arg}")?;
                        }
                        f.write_str(">")?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSegment {
    pub name: String,
    pub args: Vec<TypeArg>,
}

impl TypeSegment {
    pub fn new(name: impl Into<String>, args: Vec<TypeArg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Extends,
    Super,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArg {
    Type(TypeRef),
    Wildcard(Option<(BoundKind, TypeRef)>),
}

impl fmt::Display for TypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArg::Type(ty) => write!(f, "{ty}"),
            TypeArg::Wildcard(None) => f.write_str("?"),
            TypeArg::Wildcard(Some((BoundKind::Extends, ty))) => write!(f, "? extends {ty}"),
            TypeArg::Wildcard(Some((BoundKind::Super, ty))) => write!(f, "? super {ty}"),
        }
    }
}
