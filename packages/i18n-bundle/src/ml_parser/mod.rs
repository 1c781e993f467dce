//! ML (Markup Language) Parser Module
//!
//! Tokenizes XML-like text into a node tree plus a list of parse errors.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod tokens;
pub mod xml_parser;

pub use ast::*;
pub use lexer::{tokenize, TokenizeOptions, TokenizeResult};
pub use parser::{ParseTreeResult, Parser};
pub use tokens::*;
pub use xml_parser::XmlParser;
