pub mod nodes;

pub use nodes::{
    Annotation, BoundKind, CompilationUnit, ConstructorDecl, FieldDecl, ImportDecl, Member,
    MethodDecl, Modifier, Param, TypeArg, TypeDecl, TypeKind, TypeRef, TypeSegment, Visibility,
};
