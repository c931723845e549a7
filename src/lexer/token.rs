use std::fmt;

pub use rmistub_span::Span;

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Package,
    Import,
    Class,
    Interface,
    Enum,
    Extends,
    Implements,
    Super,
    Throws,
    Void,
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
    NonSealed,
    Primitive(String),
    Identifier(String),
    Number(String),
    StringLiteral(String),
    CharLiteral(String),
    At,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Comma,
    Semicolon,
    Dot,
    Ellipsis,
    Question,
    Ampersand,
    Star,
    Operator(char),
    Eof,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Package => "package",
            TokenKind::Import => "import",
            TokenKind::Class => "class",
            TokenKind::Interface => "interface",
            TokenKind::Enum => "enum",
            TokenKind::Extends => "extends",
            TokenKind::Implements => "implements",
            TokenKind::Super => "super",
            TokenKind::Throws => "throws",
            TokenKind::Void => "void",
            TokenKind::Public => "public",
            TokenKind::Protected => "protected",
            TokenKind::Private => "private",
            TokenKind::Static => "static",
            TokenKind::Final => "final",
            TokenKind::Abstract => "abstract",
            TokenKind::Default => "default",
            TokenKind::Synchronized => "synchronized",
            TokenKind::Native => "native",
            TokenKind::Transient => "transient",
            TokenKind::Volatile => "volatile",
            TokenKind::Strictfp => "strictfp",
            TokenKind::NonSealed => "non-sealed",
            TokenKind::Primitive(_) => "primitive type",
            TokenKind::Identifier(_) => "identifier",
            TokenKind::Number(_) => "number",
            TokenKind::StringLiteral(_) => "string",
            TokenKind::CharLiteral(_) => "character",
            TokenKind::At => "@",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Ellipsis => "...",
            TokenKind::Question => "?",
            TokenKind::Ampersand => "&",
            TokenKind::Star => "*",
            TokenKind::Operator(_) => "operator",
            TokenKind::Eof => "eof",
        }
    }

    /// Opening or closing bracket that delimits a nested token group.
    pub fn is_delimiter(&self) -> bool {
        matches!(
            self,
            TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::LBracket
                | TokenKind::RBracket
        )
    }

    pub(crate) fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "package" => TokenKind::Package,
            "import" => TokenKind::Import,
            "class" => TokenKind::Class,
            "interface" => TokenKind::Interface,
            "enum" => TokenKind::Enum,
            "extends" => TokenKind::Extends,
            "implements" => TokenKind::Implements,
            "super" => TokenKind::Super,
            "throws" => TokenKind::Throws,
            "void" => TokenKind::Void,
            "public" => TokenKind::Public,
            "protected" => TokenKind::Protected,
            "private" => TokenKind::Private,
            "static" => TokenKind::Static,
            "final" => TokenKind::Final,
            "abstract" => TokenKind::Abstract,
            "default" => TokenKind::Default,
            "synchronized" => TokenKind::Synchronized,
            "native" => TokenKind::Native,
            "transient" => TokenKind::Transient,
            "volatile" => TokenKind::Volatile,
            "strictfp" => TokenKind::Strictfp,
            "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double" => {
                TokenKind::Primitive(word.to_string())
            }
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Debug for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Primitive(name) => write!(f, "Primitive({name})"),
            TokenKind::Identifier(name) => write!(f, "Identifier({name})"),
            TokenKind::Number(number) => write!(f, "Number({number})"),
            TokenKind::StringLiteral(value) => write!(f, "StringLiteral(\"{value}\")"),
            TokenKind::CharLiteral(value) => write!(f, "CharLiteral('{value}')"),
            TokenKind::Operator(op) => write!(f, "Operator({op})"),
            kind => f.write_str(kind.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
