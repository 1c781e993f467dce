//! ML Parser Tokens
//!
//! Token kinds produced by the markup lexer.

use crate::parse_util::ParseSourceSpan;

/// Token types for XML parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    TagOpenStart,
    TagOpenEnd,
    TagOpenEndVoid,
    TagClose,
    Text,
    RawText,
    CommentStart,
    CommentEnd,
    CdataStart,
    CdataEnd,
    AttrName,
    AttrQuote,
    AttrValueText,
    DocType,
    ProcessingInstruction,
    ExpansionFormStart,
    ExpansionCaseValue,
    ExpansionCaseExpStart,
    ExpansionCaseExpEnd,
    ExpansionFormEnd,
    Eof,
}

/// A lexed token.
///
/// `parts` depends on the kind:
/// - `TagOpenStart` / `TagClose`: `[name]`
/// - `AttrName`: `[name]`, `AttrValueText`: `[decoded value]`
/// - `Text` / `RawText`: `[decoded text]`
/// - `DocType` / `ProcessingInstruction`: `[content]`
/// - `ExpansionCaseValue`: `[value]`
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub parts: Vec<String>,
    pub source_span: ParseSourceSpan,
}

impl Token {
    pub fn new(token_type: TokenType, parts: Vec<String>, source_span: ParseSourceSpan) -> Self {
        Token {
            token_type,
            parts,
            source_span,
        }
    }

    /// First part of the token, or "" when the token carries none.
    pub fn value(&self) -> &str {
        self.parts.first().map(String::as_str).unwrap_or("")
    }
}
