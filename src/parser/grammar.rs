use chumsky::Stream;
use chumsky::prelude::*;

use crate::ast::nodes::{
    Annotation, BoundKind, CompilationUnit, ConstructorDecl, FieldDecl, ImportDecl, Member,
    MethodDecl, Modifier, Param, TypeArg, TypeDecl, TypeKind, TypeRef, TypeSegment,
};
use crate::lexer::token::{Span, Token, TokenKind};
use rmistub_utils::errors::Diagnostic;

#[derive(Debug, Clone)]
pub struct ParserError {
    pub message: String,
    pub span: Span,
}

impl ParserError {
    pub fn to_diagnostic(&self, source_id: &str) -> Diagnostic {
        Diagnostic::error(source_id, self.span, self.message.clone())
    }
}

impl From<Simple<TokenKind>> for ParserError {
    fn from(value: Simple<TokenKind>) -> Self {
        let span = Span::from(value.span());
        let mut expected: Vec<&str> = value
            .expected()
            .filter_map(|kind| kind.as_ref().map(TokenKind::name))
            .collect();
        expected.sort_unstable();
        expected.dedup();

        let mut message = match value.found() {
            Some(found) => format!("unexpected token: {found:?}"),
            None => "unexpected end of input".to_string(),
        };
        if !expected.is_empty() {
            message.push_str(&format!(", expected one of: {}", expected.join(" ")));
        }
        if let Some(label) = value.label() {
            message.push_str(&format!(" (in {label})"));
        }
        Self { message, span }
    }
}

pub fn parse(tokens: &[Token]) -> Result<CompilationUnit, Vec<ParserError>> {
    let parser = compilation_unit_parser();
    let end = tokens.last().map_or(0, |token| token.span.end());

    let stream = Stream::from_iter(
        end..end + 1,
        tokens
            .iter()
            .cloned()
            .map(|token| (token.kind, token.span.into())),
    );

    parser
        .parse(stream)
        .map_err(|errors| errors.into_iter().map(ParserError::from).collect())
}

fn compilation_unit_parser() -> impl Parser<TokenKind, CompilationUnit, Error = Simple<TokenKind>> {
    let package = annotation_parser()
        .repeated()
        .ignore_then(just(TokenKind::Package))
        .ignore_then(qualified_name_parser())
        .then_ignore(just(TokenKind::Semicolon))
        .labelled("package declaration");

    let import = just(TokenKind::Import)
        .ignore_then(
            filter(|kind: &TokenKind| !matches!(kind, TokenKind::Semicolon | TokenKind::Eof))
                .repeated(),
        )
        .then_ignore(just(TokenKind::Semicolon))
        .map(import_from_tokens)
        .labelled("import declaration");

    package
        .or_not()
        .then(import.repeated())
        .then(
            type_decl_parser()
                .map(Some)
                .or(just(TokenKind::Semicolon).to(None))
                .repeated(),
        )
        .then_ignore(just(TokenKind::Eof))
        .then_ignore(end())
        .map(|((package, imports), types)| {
            CompilationUnit::new(package, imports, types.into_iter().flatten().collect())
        })
}

fn import_from_tokens(tokens: Vec<TokenKind>) -> ImportDecl {
    let is_static = tokens.first() == Some(&TokenKind::Static);
    let mut path = String::new();
    let mut is_wildcard = false;

    for kind in tokens.iter().skip(usize::from(is_static)) {
        match kind {
            TokenKind::Identifier(name) => path.push_str(name),
            TokenKind::Dot => path.push('.'),
            TokenKind::Star => is_wildcard = true,
            _ => {}
        }
    }
    if is_wildcard {
        path = path.trim_end_matches('.').to_string();
    }

    ImportDecl {
        path,
        is_static,
        is_wildcard,
    }
}

fn type_decl_parser() -> impl Parser<TokenKind, TypeDecl, Error = Simple<TokenKind>> + Clone {
    recursive(|type_decl| {
        let initializer = just(TokenKind::Static)
            .or_not()
            .ignore_then(group(TokenKind::LBrace, TokenKind::RBrace))
            .to(Member::Initializer);

        let member = choice((
            initializer,
            type_decl.map(Member::Type),
            method_parser().map(Member::Method),
            constructor_parser().map(Member::Constructor),
            field_parser().map(Member::Field),
        ));

        let members = just(TokenKind::Semicolon)
            .to(None)
            .or(member.map(Some))
            .repeated()
            .delimited_by(just(TokenKind::LBrace), just(TokenKind::RBrace))
            .map(|members| members.into_iter().flatten().collect::<Vec<_>>());

        // extends / implements / permits clauses and record headers
        let header = choice((
            group(TokenKind::LParen, TokenKind::RParen),
            filter(|kind: &TokenKind| {
                !kind.is_delimiter() && !matches!(kind, TokenKind::Semicolon | TokenKind::Eof)
            })
            .ignored(),
        ))
        .repeated();

        let class_like = just(TokenKind::Class)
            .to(TypeKind::Class)
            .or(just(TokenKind::Interface).to(TypeKind::Interface))
            .then(identifier_parser())
            .then(type_params_parser().or_not())
            .then_ignore(header.clone())
            .then(members);

        let opaque = choice((
            just(TokenKind::Enum).to(TypeKind::Enum),
            just(TokenKind::At)
                .then(just(TokenKind::Interface))
                .to(TypeKind::Annotation),
            just(TokenKind::Identifier("record".to_string())).to(TypeKind::Record),
        ))
        .then(identifier_parser())
        .then(type_params_parser().or_not())
        .then_ignore(header)
        .then(group(TokenKind::LBrace, TokenKind::RBrace).to(Vec::new()));

        prefix_parser()
            .then(class_like.or(opaque))
            .map_with_span(
                |((annotations, modifiers), (((kind, name), type_params), members)), span| {
                    TypeDecl {
                        kind,
                        name,
                        annotations,
                        modifiers,
                        type_params: type_params.unwrap_or_default(),
                        members,
                        span: Span::from(span),
                    }
                },
            )
            .labelled("type declaration")
    })
}

fn method_parser() -> impl Parser<TokenKind, MethodDecl, Error = Simple<TokenKind>> + Clone {
    let return_type = just(TokenKind::Void)
        .to(TypeRef::Void)
        .or(type_ref_parser());

    let body = group(TokenKind::LBrace, TokenKind::RBrace).or(just(TokenKind::Semicolon).ignored());

    prefix_parser()
        .then(type_params_parser().or_not())
        .then(return_type)
        .then(identifier_parser())
        .then(params_parser())
        .then(dims_parser())
        .then(throws_parser())
        .then_ignore(body)
        .map_with_span(
            |((((((prefix, type_params), return_type), name), params), dims), throws), span| {
                let (annotations, modifiers) = prefix;
                // legacy `int values()[]` form
                let return_type = (0..dims)
                    .fold(return_type, |element, _| TypeRef::Array(Box::new(element)));
                MethodDecl {
                    name,
                    annotations,
                    modifiers,
                    type_params: type_params.unwrap_or_default(),
                    return_type,
                    params,
                    throws,
                    span: Span::from(span),
                }
            },
        )
        .labelled("method")
        .boxed()
}

fn constructor_parser() -> impl Parser<TokenKind, ConstructorDecl, Error = Simple<TokenKind>> + Clone
{
    prefix_parser()
        .then_ignore(type_params_parser().or_not())
        .then(identifier_parser())
        .then(params_parser())
        .then_ignore(throws_parser())
        .then_ignore(group(TokenKind::LBrace, TokenKind::RBrace))
        .map_with_span(|(((_, modifiers), name), params), span| ConstructorDecl {
            name,
            modifiers,
            params,
            span: Span::from(span),
        })
        .labelled("constructor")
        .boxed()
}

fn field_parser() -> impl Parser<TokenKind, FieldDecl, Error = Simple<TokenKind>> + Clone {
    // initializers may hold anonymous classes and lambdas, so skip whole groups up to `;`
    let initializer = choice((
        group(TokenKind::LParen, TokenKind::RParen),
        group(TokenKind::LBrace, TokenKind::RBrace),
        group(TokenKind::LBracket, TokenKind::RBracket),
        filter(|kind: &TokenKind| {
            !kind.is_delimiter() && !matches!(kind, TokenKind::Semicolon | TokenKind::Eof)
        })
        .ignored(),
    ))
    .repeated();

    prefix_parser()
        .then(type_ref_parser())
        .then(identifier_parser())
        .then_ignore(initializer)
        .then_ignore(just(TokenKind::Semicolon))
        .map_with_span(|(((_, modifiers), ty), name), span| FieldDecl {
            name,
            ty,
            modifiers,
            span: Span::from(span),
        })
        .labelled("field")
        .boxed()
}

fn params_parser() -> impl Parser<TokenKind, Vec<Param>, Error = Simple<TokenKind>> + Clone {
    let param = prefix_parser()
        .then(type_ref_parser())
        .then(just(TokenKind::Ellipsis).or_not())
        .then(identifier_parser())
        .then(dims_parser())
        .map(|((((prefix, ty), ellipsis), name), dims)| {
            let ty = (0..dims).fold(ty, |element, _| TypeRef::Array(Box::new(element)));
            Param {
                ty,
                name,
                varargs: ellipsis.is_some(),
                annotations: prefix.0,
            }
        });

    param
        .separated_by(just(TokenKind::Comma))
        .delimited_by(just(TokenKind::LParen), just(TokenKind::RParen))
        // receiver parameters (`Outer this`) are not part of the signature
        .map(|params| {
            params
                .into_iter()
                .filter(|param| param.name != "this")
                .collect::<Vec<_>>()
        })
        .labelled("parameter list")
}

fn throws_parser() -> impl Parser<TokenKind, Vec<TypeRef>, Error = Simple<TokenKind>> + Clone {
    just(TokenKind::Throws)
        .ignore_then(
            type_ref_parser()
                .separated_by(just(TokenKind::Comma))
                .at_least(1),
        )
        .or_not()
        .map(Option::unwrap_or_default)
}

fn type_params_parser() -> impl Parser<TokenKind, Vec<String>, Error = Simple<TokenKind>> + Clone {
    let bound = just(TokenKind::Extends)
        .ignore_then(
            type_ref_parser()
                .separated_by(just(TokenKind::Ampersand))
                .at_least(1),
        )
        .or_not();

    annotation_parser()
        .repeated()
        .ignore_then(identifier_parser())
        .then_ignore(bound)
        .separated_by(just(TokenKind::Comma))
        .at_least(1)
        .delimited_by(just(TokenKind::Lt), just(TokenKind::Gt))
        .labelled("type parameters")
}

fn type_ref_parser() -> impl Parser<TokenKind, TypeRef, Error = Simple<TokenKind>> + Clone {
    recursive(|ty| {
        let type_annotations = annotation_parser().repeated().ignored();

        let bound = just(TokenKind::Extends)
            .to(BoundKind::Extends)
            .or(just(TokenKind::Super).to(BoundKind::Super))
            .then(ty.clone());
        let wildcard = just(TokenKind::Question)
            .ignore_then(bound.or_not())
            .map(TypeArg::Wildcard);
        let arg = type_annotations
            .clone()
            .ignore_then(wildcard.or(ty.map(TypeArg::Type)));
        let args = arg
            .separated_by(just(TokenKind::Comma))
            .delimited_by(just(TokenKind::Lt), just(TokenKind::Gt));

        let segment = identifier_parser()
            .then(args.or_not())
            .map(|(name, args)| TypeSegment::new(name, args.unwrap_or_default()));
        let named = segment
            .separated_by(just(TokenKind::Dot))
            .at_least(1)
            .map(TypeRef::Named);
        let primitive = select! { TokenKind::Primitive(name) => TypeRef::Primitive(name) };

        type_annotations
            .ignore_then(primitive.or(named))
            .then(dims_parser())
            .map(|(base, dims)| (0..dims).fold(base, |element, _| TypeRef::Array(Box::new(element))))
    })
    .labelled("type")
}

fn dims_parser() -> impl Parser<TokenKind, usize, Error = Simple<TokenKind>> + Clone {
    just(TokenKind::LBracket)
        .then(just(TokenKind::RBracket))
        .repeated()
        .map(|dims| dims.len())
}

#[derive(Clone)]
enum Prefix {
    Annotation(Annotation),
    Modifier(Modifier),
}

/// Annotations and modifiers in any interleaving, as Java allows.
fn prefix_parser()
-> impl Parser<TokenKind, (Vec<Annotation>, Vec<Modifier>), Error = Simple<TokenKind>> + Clone {
    annotation_parser()
        .map(Prefix::Annotation)
        .or(modifier_parser().map(Prefix::Modifier))
        .repeated()
        .map(|items| {
            let mut annotations = Vec::new();
            let mut modifiers = Vec::new();
            for item in items {
                match item {
                    Prefix::Annotation(annotation) => annotations.push(annotation),
                    Prefix::Modifier(modifier) => modifiers.push(modifier),
                }
            }
            (annotations, modifiers)
        })
}

fn annotation_parser() -> impl Parser<TokenKind, Annotation, Error = Simple<TokenKind>> + Clone {
    just(TokenKind::At)
        .ignore_then(qualified_name_parser())
        .then_ignore(group(TokenKind::LParen, TokenKind::RParen).or_not())
        .map_with_span(|name, span| Annotation::new(name, Span::from(span)))
        .labelled("annotation")
}

fn modifier_parser() -> impl Parser<TokenKind, Modifier, Error = Simple<TokenKind>> + Clone {
    select! {
        TokenKind::Public => Modifier::Public,
        TokenKind::Protected => Modifier::Protected,
        TokenKind::Private => Modifier::Private,
        TokenKind::Static => Modifier::Static,
        TokenKind::Final => Modifier::Final,
        TokenKind::Abstract => Modifier::Abstract,
        TokenKind::Default => Modifier::Default,
        TokenKind::Synchronized => Modifier::Synchronized,
        TokenKind::Native => Modifier::Native,
        TokenKind::Transient => Modifier::Transient,
        TokenKind::Volatile => Modifier::Volatile,
        TokenKind::Strictfp => Modifier::Strictfp,
        TokenKind::NonSealed => Modifier::NonSealed,
        // contextual: `sealed` stays usable as a name everywhere else
        TokenKind::Identifier(word) if word == "sealed" => Modifier::Sealed,
    }
}

fn qualified_name_parser() -> impl Parser<TokenKind, String, Error = Simple<TokenKind>> + Clone {
    identifier_parser()
        .separated_by(just(TokenKind::Dot))
        .at_least(1)
        .map(|parts| parts.join("."))
}

fn identifier_parser() -> impl Parser<TokenKind, String, Error = Simple<TokenKind>> + Clone {
    select! { TokenKind::Identifier(name) => name }
}

/// Balanced `open ... close` group whose contents are skipped.
fn group(
    open: TokenKind,
    close: TokenKind,
) -> impl Parser<TokenKind, (), Error = Simple<TokenKind>> + Clone {
    token_tree_parser()
        .repeated()
        .delimited_by(just(open), just(close))
        .ignored()
}

fn token_tree_parser() -> impl Parser<TokenKind, (), Error = Simple<TokenKind>> + Clone {
    recursive(|tree| {
        let nested = |open: TokenKind, close: TokenKind| {
            tree.clone()
                .repeated()
                .delimited_by(just(open), just(close))
                .ignored()
        };
        choice((
            nested(TokenKind::LParen, TokenKind::RParen),
            nested(TokenKind::LBrace, TokenKind::RBrace),
            nested(TokenKind::LBracket, TokenKind::RBracket),
            filter(|kind: &TokenKind| !kind.is_delimiter() && *kind != TokenKind::Eof).ignored(),
        ))
    })
}
