use rmistub::ast::{CompilationUnit, Member, Modifier, TypeArg, TypeKind, TypeRef, Visibility};
use rmistub::lexer::tokenize;
use rmistub::parser::parse;

fn parse_source(source: &str) -> CompilationUnit {
    let tokens = tokenize(source).expect("tokenization should succeed");
    parse(&tokens).expect("parsing should succeed")
}

#[test]
fn parse_package_imports_and_interface() {
    let unit = parse_source(
        "package com.example.api;\n\
         import java.util.List;\n\
         import java.util.*;\n\
         import static java.util.Objects.requireNonNull;\n\
         \n\
         @Remote\n\
         public interface Catalog extends Base<String> {\n\
             List<String> names(int limit) throws java.io.IOException;\n\
         }\n",
    );

    assert_eq!(unit.package.as_deref(), Some("com.example.api"));
    assert_eq!(unit.imports.len(), 3);
    assert_eq!(unit.imports[0].imported_name(), Some("List"));
    assert!(unit.imports[1].is_wildcard);
    assert_eq!(unit.imports[1].path, "java.util");
    assert!(unit.imports[2].is_static);

    assert_eq!(unit.types.len(), 1);
    let catalog = &unit.types[0];
    assert_eq!(catalog.kind, TypeKind::Interface);
    assert_eq!(catalog.name, "Catalog");
    assert_eq!(catalog.annotations[0].name, "Remote");
    assert_eq!(catalog.modifiers, vec![Modifier::Public]);

    let method = catalog.methods().next().expect("one method");
    assert_eq!(method.name, "names");
    assert_eq!(method.return_type.to_string(), "List<String>");
    assert_eq!(method.params.len(), 1);
    assert_eq!(method.params[0].name, "limit");
    assert_eq!(method.params[0].ty, TypeRef::Primitive("int".to_string()));
    assert_eq!(method.throws.len(), 1);
    assert_eq!(method.throws[0].to_string(), "java.io.IOException");
}

#[test]
fn class_members_are_classified() {
    let unit = parse_source(
        "class Service {\n\
             private static final int LIMIT = compute(1, 2);\n\
             static { LIMIT2 = 3; }\n\
             public Service(String name) { this.name = name; }\n\
             @Deprecated protected synchronized void run() { if (x) { y(); } }\n\
             Runnable task = () -> { work(); };\n\
             enum Mode { FAST, SLOW; Mode() {} }\n\
             record Point(int x, int y) {}\n\
             ;\n\
         }\n",
    );

    let decl = &unit.types[0];
    let kinds: Vec<&str> = decl
        .members
        .iter()
        .map(|member| match member {
            Member::Field(_) => "field",
            Member::Initializer => "initializer",
            Member::Constructor(_) => "constructor",
            Member::Method(_) => "method",
            Member::Type(_) => "type",
        })
        .collect();
    assert_eq!(
        kinds,
        [
            "field",
            "initializer",
            "constructor",
            "method",
            "field",
            "type",
            "type"
        ]
    );

    let run = decl.methods().next().expect("run method");
    assert_eq!(run.visibility(), Visibility::Protected);
    assert_eq!(run.annotations[0].simple_name(), "Deprecated");

    let nested: Vec<TypeKind> = decl.nested_types().map(|nested| nested.kind).collect();
    assert_eq!(nested, [TypeKind::Enum, TypeKind::Record]);
}

#[test]
fn generic_methods_wildcards_and_arrays() {
    let unit = parse_source(
        "interface Finder<K, V extends Comparable<V>> {\n\
             <T extends Number & Comparable<T>> Map<K, ? extends T>[] find(final K key, @Nullable String... tags);\n\
             default int[] sizes(byte data[][]) { return null; }\n\
         }\n",
    );

    let decl = &unit.types[0];
    assert_eq!(decl.type_params, ["K", "V"]);

    let mut methods = decl.methods();
    let find = methods.next().expect("find");
    assert_eq!(find.type_params, ["T"]);
    match &find.return_type {
        TypeRef::Array(element) => match element.as_ref() {
            TypeRef::Named(segments) => {
                assert_eq!(segments[0].name, "Map");
                assert!(matches!(segments[0].args[1], TypeArg::Wildcard(Some(_))));
            }
            other => panic!("expected named element type, got {other:?}"),
        },
        other => panic!("expected array return type, got {other:?}"),
    }
    assert!(find.params[1].varargs);
    assert_eq!(find.params[1].annotations[0].name, "Nullable");

    let sizes = methods.next().expect("sizes");
    assert_eq!(sizes.return_type.to_string(), "int[]");
    assert_eq!(sizes.params[0].ty.to_string(), "byte[][]");
}

#[test]
fn annotations_with_arguments_and_qualified_names() {
    let unit = parse_source(
        "@javax.ejb.Remote(name = \"catalog\", value = {A.class, B.class})\n\
         @SuppressWarnings(\"unchecked\")\n\
         public abstract class Catalog {\n\
             @jakarta.ejb.Local public abstract void reset();\n\
         }\n",
    );

    let decl = &unit.types[0];
    assert_eq!(decl.annotations.len(), 2);
    assert_eq!(decl.annotations[0].name, "javax.ejb.Remote");
    assert_eq!(decl.annotations[0].simple_name(), "Remote");

    let reset = decl.methods().next().expect("reset");
    assert_eq!(reset.annotations[0].simple_name(), "Local");
    assert_eq!(reset.return_type, TypeRef::Void);
}

#[test]
fn opaque_declarations_are_kept_without_members() {
    let unit = parse_source(
        "enum Color { RED, GREEN; void paint() {} }\n\
         @interface Marker { String value() default \"\"; }\n\
         record Pair<A, B>(A first, B second) implements Comparable<Pair<A, B>> {}\n",
    );

    let kinds: Vec<TypeKind> = unit.types.iter().map(|decl| decl.kind).collect();
    assert_eq!(
        kinds,
        [TypeKind::Enum, TypeKind::Annotation, TypeKind::Record]
    );
    assert!(unit.types.iter().all(|decl| decl.members.is_empty()));
}

#[test]
fn sealed_is_only_a_modifier_in_modifier_position() {
    let unit = parse_source(
        "public sealed interface Shape permits Circle {\n\
             void permits(int sealed);\n\
             public int sealed();\n\
         }\n",
    );

    let shape = &unit.types[0];
    assert_eq!(shape.modifiers, vec![Modifier::Public, Modifier::Sealed]);

    let names: Vec<&str> = shape.methods().map(|method| method.name.as_str()).collect();
    assert_eq!(names, ["permits", "sealed"]);
    let permits = shape.methods().next().expect("permits");
    assert_eq!(permits.params[0].name, "sealed");
}

#[test]
fn legacy_array_dims_after_parameters_belong_to_the_return_type() {
    let unit = parse_source(
        "interface Legacy {\n\
             int values()[];\n\
             String[] grid(int size)[] throws Exception;\n\
         }\n",
    );

    let returns: Vec<String> = unit.types[0]
        .methods()
        .map(|method| method.return_type.to_string())
        .collect();
    assert_eq!(returns, ["int[]", "String[][]"]);
}

#[test]
fn missing_semicolon_is_an_error() {
    let tokens = tokenize("interface Broken { void f() }").expect("tokenization should succeed");
    let errors = parse(&tokens).expect_err("parsing should fail");
    assert!(!errors.is_empty());
    assert!(errors[0].message.contains("unexpected"));
}
