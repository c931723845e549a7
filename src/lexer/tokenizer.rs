use super::token::{Span, Token, TokenKind};
use rmistub_utils::errors::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum LexerError {
    #[error("unterminated string literal (line {line}, column {column})")]
    UnterminatedString {
        line: usize,
        column: usize,
        span: Span,
    },
    #[error("unterminated character literal (line {line}, column {column})")]
    UnterminatedChar {
        line: usize,
        column: usize,
        span: Span,
    },
    #[error("unterminated block comment (line {line}, column {column})")]
    UnterminatedComment {
        line: usize,
        column: usize,
        span: Span,
    },
    #[error("unexpected character `{ch}` (line {line}, column {column})")]
    UnexpectedCharacter {
        ch: char,
        line: usize,
        column: usize,
        span: Span,
    },
}

impl LexerError {
    pub fn span(&self) -> Span {
        match self {
            LexerError::UnterminatedString { span, .. }
            | LexerError::UnterminatedChar { span, .. }
            | LexerError::UnterminatedComment { span, .. }
            | LexerError::UnexpectedCharacter { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self, source_id: &str) -> Diagnostic {
        Diagnostic::error(source_id, self.span(), self.to_string())
    }
}

pub type LexResult<T> = Result<T, Vec<LexerError>>;

pub fn tokenize(source: &str) -> LexResult<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let start = i;
        let single = match bytes[i] {
            b'(' => Some(TokenKind::LParen),
            b')' => Some(TokenKind::RParen),
            b'{' => Some(TokenKind::LBrace),
            b'}' => Some(TokenKind::RBrace),
            b'[' => Some(TokenKind::LBracket),
            b']' => Some(TokenKind::RBracket),
            b'<' => Some(TokenKind::Lt),
            b'>' => Some(TokenKind::Gt),
            b',' => Some(TokenKind::Comma),
            b';' => Some(TokenKind::Semicolon),
            b'?' => Some(TokenKind::Question),
            b'&' => Some(TokenKind::Ampersand),
            b'*' => Some(TokenKind::Star),
            b'@' => Some(TokenKind::At),
            _ => None,
        };
        if let Some(kind) = single {
            tokens.push(Token::new(kind, Span::new(start, start + 1)));
            i += 1;
            continue;
        }

        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' | b'\x0c' => {
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => match source[i + 2..].find("*/") {
                Some(end) => i += end + 4,
                None => {
                    let (line, column) = line_column(source, start);
                    errors.push(LexerError::UnterminatedComment {
                        line,
                        column,
                        span: Span::new(start, bytes.len()),
                    });
                    i = bytes.len();
                }
            },
            b'"' if source[i..].starts_with("\"\"\"") => {
                let mut j = i + 3;
                let mut closed = false;
                while j < bytes.len() {
                    if bytes[j] == b'\\' {
                        j += 2;
                        continue;
                    }
                    if source.as_bytes()[j..].starts_with(b"\"\"\"") {
                        closed = true;
                        break;
                    }
                    j += 1;
                }
                if closed {
                    let value = &source[i + 3..j];
                    tokens.push(Token::new(
                        TokenKind::StringLiteral(value.to_string()),
                        Span::new(start, j + 3),
                    ));
                    i = j + 3;
                } else {
                    let (line, column) = line_column(source, start);
                    errors.push(LexerError::UnterminatedString {
                        line,
                        column,
                        span: Span::new(start, bytes.len()),
                    });
                    i = bytes.len();
                }
            }
            quote @ (b'"' | b'\'') => {
                let mut j = i + 1;
                let closed = loop {
                    match bytes.get(j) {
                        None | Some(b'\n') => break false,
                        Some(b'\\') => j += 2,
                        Some(&b) if b == quote => break true,
                        Some(_) => j += 1,
                    }
                };
                if closed {
                    let value = source[i + 1..j].to_string();
                    let kind = if quote == b'"' {
                        TokenKind::StringLiteral(value)
                    } else {
                        TokenKind::CharLiteral(value)
                    };
                    tokens.push(Token::new(kind, Span::new(start, j + 1)));
                    i = j + 1;
                } else {
                    let end = j.min(bytes.len());
                    let (line, column) = line_column(source, start);
                    let span = Span::new(start, end);
                    errors.push(if quote == b'"' {
                        LexerError::UnterminatedString { line, column, span }
                    } else {
                        LexerError::UnterminatedChar { line, column, span }
                    });
                    i = end;
                }
            }
            b'.' if source[i..].starts_with("...") => {
                tokens.push(Token::new(TokenKind::Ellipsis, Span::new(start, start + 3)));
                i += 3;
            }
            b'.' if !bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => {
                tokens.push(Token::new(TokenKind::Dot, Span::new(start, start + 1)));
                i += 1;
            }
            b'.' | b'0'..=b'9' => {
                i += 1;
                while i < bytes.len() {
                    let b = bytes[i];
                    if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' {
                        i += 1;
                    } else if (b == b'+' || b == b'-')
                        && matches!(bytes[i - 1], b'e' | b'E' | b'p' | b'P')
                    {
                        i += 1;
                    } else {
                        break;
                    }
                }
                tokens.push(Token::new(
                    TokenKind::Number(source[start..i].to_string()),
                    Span::new(start, i),
                ));
            }
            b'=' | b'+' | b'-' | b'!' | b'~' | b'|' | b'^' | b'%' | b':' | b'/' => {
                tokens.push(Token::new(
                    TokenKind::Operator(bytes[i] as char),
                    Span::new(start, start + 1),
                ));
                i += 1;
            }
            _ => {
                let Some(ch) = source[i..].chars().next() else {
                    break;
                };
                if !is_identifier_start(ch) {
                    let (line, column) = line_column(source, start);
                    errors.push(LexerError::UnexpectedCharacter {
                        ch,
                        line,
                        column,
                        span: Span::new(start, start + ch.len_utf8()),
                    });
                    i += ch.len_utf8();
                    continue;
                }

                i = identifier_end(source, i);
                let mut word = &source[start..i];
                let kind = if word == "non" && source[i..].starts_with("-sealed") {
                    let end = identifier_end(source, i + 1);
                    if &source[i + 1..end] == "sealed" {
                        i = end;
                        word = &source[start..i];
                        TokenKind::NonSealed
                    } else {
                        TokenKind::Identifier(word.to_string())
                    }
                } else {
                    TokenKind::keyword(word)
                        .unwrap_or_else(|| TokenKind::Identifier(word.to_string()))
                };
                tokens.push(Token::new(kind, Span::new(start, start + word.len())));
            }
        }
    }

    tokens.push(Token::new(
        TokenKind::Eof,
        Span::new(bytes.len(), bytes.len()),
    ));

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

fn identifier_end(source: &str, start: usize) -> usize {
    source[start..]
        .char_indices()
        .find(|&(_, ch)| !is_identifier_part(ch))
        .map_or(source.len(), |(offset, _)| start + offset)
}

fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let prefix = &source[..offset];
    let line = prefix.matches('\n').count() + 1;
    let column = prefix
        .rsplit('\n')
        .next()
        .map_or(0, |current| current.chars().count())
        + 1;
    (line, column)
}
