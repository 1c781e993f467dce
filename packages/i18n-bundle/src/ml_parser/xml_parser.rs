//! XML Parser
//!
//! Generic parser configured for XML content: every tag may self-close and
//! none is void or implicitly closed.

use super::lexer::TokenizeOptions;
use super::parser::{ParseTreeResult, Parser};

/// XML parser (extends generic Parser with XML tag semantics)
#[derive(Debug, Clone, Default)]
pub struct XmlParser {
    parser: Parser,
}

impl XmlParser {
    pub fn new() -> Self {
        XmlParser {
            parser: Parser::new(),
        }
    }

    /// Parse `source`. ICU expansion forms are only recognized when
    /// `tokenize_expansion_forms` is set, otherwise braces are plain text.
    pub fn parse(&self, source: &str, url: &str, tokenize_expansion_forms: bool) -> ParseTreeResult {
        let options = TokenizeOptions {
            tokenize_expansion_forms,
        };
        self.parser.parse(source, url, Some(options))
    }
}
