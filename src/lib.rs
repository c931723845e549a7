//! Generates HTTP-RMI client stubs from Java service declarations.
//!
//! Sources are lexed and parsed into a declaration model ([`ast`]), remote
//! methods are collected from `@Remote`/`@Service` types and methods
//! ([`processor`]), and each resulting stub model ([`stub`]) is written through a
//! [`filer`] as one artifact per class.

pub mod ast;
pub mod cli;
pub mod config;
pub mod filer;
pub mod lexer;
pub mod parser;
pub mod processor;
pub mod stub;
pub mod utils;
pub mod version;
