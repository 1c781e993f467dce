//! ML Parser Lexer
//!
//! XML tokenizer - converts source text into tokens.
//!
//! When `tokenize_expansion_forms` is set, ICU expansion forms
//! (`{count, plural, =0 {none} other {many}}`) are tokenized as well.

use super::tokens::{Token, TokenType};
use crate::chars;
use crate::parse_util::{ParseError, ParseLocation, ParseSourceFile, ParseSourceSpan};
use once_cell::sync::Lazy;
use regex::Regex;
use std::rc::Rc;

/// Tokenization result
#[derive(Debug, Clone)]
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
}

/// Tokenization options
#[derive(Debug, Clone, Default)]
pub struct TokenizeOptions {
    pub tokenize_expansion_forms: bool,
}

/// Main tokenization function
pub fn tokenize(source: &str, url: &str, options: TokenizeOptions) -> TokenizeResult {
    let file = Rc::new(ParseSourceFile::new(source.to_string(), url.to_string()));
    let mut tokenizer = Tokenizer::new(file, options);
    tokenizer.tokenize();

    TokenizeResult {
        tokens: tokenizer.tokens,
        errors: tokenizer.errors,
    }
}

static CR_OR_CRLF_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n?").expect("valid regex"));

const INTERPOLATION_START: &str = "{{";
const INTERPOLATION_END: &str = "}}";

#[derive(Debug, Clone)]
struct CursorState {
    offset: usize,
    line: usize,
    column: usize,
}

struct Tokenizer {
    file: Rc<ParseSourceFile>,
    state: CursorState,
    tokenize_icu: bool,
    expansion_case_stack: Vec<TokenType>,
    tokens: Vec<Token>,
    errors: Vec<ParseError>,
}

impl Tokenizer {
    fn new(file: Rc<ParseSourceFile>, options: TokenizeOptions) -> Self {
        Tokenizer {
            file,
            state: CursorState {
                offset: 0,
                line: 0,
                column: 0,
            },
            tokenize_icu: options.tokenize_expansion_forms,
            expansion_case_stack: Vec::new(),
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn tokenize(&mut self) {
        while !self.at_eof() {
            let start = self.state.clone();
            let token_count = self.tokens.len();

            let result = if self.attempt_str("<!--") {
                self.consume_comment(start.clone())
            } else if self.attempt_str("<![CDATA[") {
                self.consume_cdata(start.clone())
            } else if self.attempt_str("<!") {
                self.consume_doc_type(start.clone())
            } else if self.attempt_str("<?") {
                self.consume_processing_instruction(start.clone())
            } else if self.attempt_str("</") {
                self.consume_tag_close(start.clone())
            } else if self.is_tag_open_start() {
                self.advance();
                self.consume_tag_open(start.clone())
            } else if self.tokenize_icu {
                match self.tokenize_expansion_form() {
                    Ok(true) => Ok(()),
                    Ok(false) => {
                        self.consume_text();
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            } else {
                self.consume_text();
                Ok(())
            };

            if let Err(error) = result {
                // Drop the half-built construct and resume after it
                self.tokens.truncate(token_count);
                self.errors.push(error);
                if self.state.offset == start.offset {
                    self.advance();
                }
            }
        }

        let eof = self.state.clone();
        self.push_token(TokenType::Eof, vec![], &eof);
    }

    // Cursor

    fn at_eof(&self) -> bool {
        self.state.offset >= self.file.content.len()
    }

    fn peek(&self) -> char {
        self.file.content[self.state.offset..]
            .chars()
            .next()
            .unwrap_or(chars::EOF)
    }

    fn peek_at(&self, index: usize) -> char {
        self.file.content[self.state.offset..]
            .chars()
            .nth(index)
            .unwrap_or(chars::EOF)
    }

    fn advance(&mut self) {
        let ch = self.peek();
        if self.at_eof() {
            return;
        }
        self.state.offset += ch.len_utf8();
        if ch == chars::NEWLINE {
            self.state.line += 1;
            self.state.column = 0;
        } else {
            self.state.column += 1;
        }
    }

    fn attempt_str_peek(&self, s: &str) -> bool {
        self.file.content[self.state.offset..].starts_with(s)
    }

    fn attempt_str(&mut self, s: &str) -> bool {
        if !self.attempt_str_peek(s) {
            return false;
        }
        for _ in s.chars() {
            self.advance();
        }
        true
    }

    fn attempt_char_code(&mut self, char_code: char) -> bool {
        if !self.at_eof() && self.peek() == char_code {
            self.advance();
            return true;
        }
        false
    }

    fn require_char_code(&mut self, char_code: char) -> Result<(), ParseError> {
        let location = self.state.clone();
        if self.attempt_char_code(char_code) {
            return Ok(());
        }
        Err(self.create_error(unexpected_character_error_msg(self.current_char()), &location))
    }

    fn skip_whitespace(&mut self) {
        while !self.at_eof() && chars::is_whitespace(self.peek()) {
            self.advance();
        }
    }

    fn current_char(&self) -> Option<char> {
        if self.at_eof() {
            None
        } else {
            Some(self.peek())
        }
    }

    /// Read up to (not including) `end`. Fails when the input ends first.
    fn read_until(&mut self, end: char) -> Result<String, ParseError> {
        let start = self.state.offset;
        while self.peek() != end || self.at_eof() {
            if self.at_eof() {
                let location = self.state.clone();
                return Err(self.create_error(unexpected_character_error_msg(None), &location));
            }
            self.advance();
        }
        Ok(self.file.content[start..self.state.offset].to_string())
    }

    /// Read up to (not including) the terminator string. Fails when the input
    /// ends first.
    fn read_until_str(&mut self, end: &str) -> Result<String, ParseError> {
        let start = self.state.offset;
        while !self.attempt_str_peek(end) {
            if self.at_eof() {
                let location = self.state.clone();
                return Err(self.create_error(unexpected_character_error_msg(None), &location));
            }
            self.advance();
        }
        Ok(self.file.content[start..self.state.offset].to_string())
    }

    fn location(&self, state: &CursorState) -> ParseLocation {
        ParseLocation::new(self.file.clone(), state.offset, state.line, state.column)
    }

    fn span_from(&self, start: &CursorState) -> ParseSourceSpan {
        ParseSourceSpan::new(self.location(start), self.location(&self.state))
    }

    fn push_token(&mut self, token_type: TokenType, parts: Vec<String>, start: &CursorState) {
        let span = self.span_from(start);
        self.tokens.push(Token::new(token_type, parts, span));
    }

    fn create_error(&self, msg: String, start: &CursorState) -> ParseError {
        ParseError::new(self.span_from(start), msg)
    }

    // Markup constructs

    fn consume_comment(&mut self, start: CursorState) -> Result<(), ParseError> {
        self.push_token(TokenType::CommentStart, vec![], &start);
        let content_start = self.state.clone();
        let content = self.read_until_str("-->")?;
        self.push_token(TokenType::RawText, vec![content], &content_start);
        let end_start = self.state.clone();
        self.attempt_str("-->");
        self.push_token(TokenType::CommentEnd, vec![], &end_start);
        Ok(())
    }

    fn consume_cdata(&mut self, start: CursorState) -> Result<(), ParseError> {
        self.push_token(TokenType::CdataStart, vec![], &start);
        let content_start = self.state.clone();
        let content = self.read_until_str("]]>")?;
        self.push_token(TokenType::RawText, vec![process_carriage_returns(&content)], &content_start);
        let end_start = self.state.clone();
        self.attempt_str("]]>");
        self.push_token(TokenType::CdataEnd, vec![], &end_start);
        Ok(())
    }

    fn consume_doc_type(&mut self, start: CursorState) -> Result<(), ParseError> {
        let content = self.read_until(chars::GT)?;
        self.advance();
        self.push_token(TokenType::DocType, vec![content], &start);
        Ok(())
    }

    fn consume_processing_instruction(&mut self, start: CursorState) -> Result<(), ParseError> {
        let content = self.read_until_str("?>")?;
        self.attempt_str("?>");
        self.push_token(TokenType::ProcessingInstruction, vec![content.trim().to_string()], &start);
        Ok(())
    }

    fn is_tag_open_start(&self) -> bool {
        self.peek() == chars::LT && is_name_start(self.peek_at(1))
    }

    fn is_tag_start(&self) -> bool {
        self.peek() == chars::LT
            && (is_name_start(self.peek_at(1))
                || matches!(self.peek_at(1), chars::SLASH | chars::BANG | chars::QUESTION))
    }

    fn read_name(&mut self) -> String {
        let start = self.state.offset;
        while !self.at_eof() && !is_name_end(self.peek()) {
            self.advance();
        }
        self.file.content[start..self.state.offset].to_string()
    }

    fn consume_tag_open(&mut self, start: CursorState) -> Result<(), ParseError> {
        let name = self.read_name();
        self.push_token(TokenType::TagOpenStart, vec![name], &start);

        loop {
            self.skip_whitespace();
            if self.at_eof() || matches!(self.peek(), chars::GT | chars::SLASH) {
                break;
            }
            self.consume_attribute()?;
        }

        self.consume_tag_open_end()
    }

    fn consume_attribute(&mut self) -> Result<(), ParseError> {
        let name_start = self.state.clone();
        let name = self.read_name();
        if name.is_empty() {
            return Err(self.create_error(unexpected_character_error_msg(self.current_char()), &name_start));
        }
        self.push_token(TokenType::AttrName, vec![name], &name_start);

        self.skip_whitespace();
        if self.attempt_char_code(chars::EQ) {
            self.skip_whitespace();
            self.consume_attribute_value()?;
        }
        Ok(())
    }

    fn consume_attribute_value(&mut self) -> Result<(), ParseError> {
        let quote_char = self.peek();
        if quote_char == chars::SQ || quote_char == chars::DQ {
            self.consume_quote(quote_char);
            let value_start = self.state.clone();
            let mut value = String::new();
            while self.peek() != quote_char || self.at_eof() {
                if self.at_eof() {
                    let location = self.state.clone();
                    return Err(self.create_error(unexpected_character_error_msg(None), &location));
                }
                self.consume_char_or_entity(&mut value);
            }
            self.push_token(TokenType::AttrValueText, vec![process_carriage_returns(&value)], &value_start);
            self.consume_quote(quote_char);
        } else {
            let value_start = self.state.clone();
            let mut value = String::new();
            while !self.at_eof() && !chars::is_whitespace(self.peek()) && self.peek() != chars::GT {
                if self.attempt_str_peek("/>") {
                    break;
                }
                self.consume_char_or_entity(&mut value);
            }
            self.push_token(TokenType::AttrValueText, vec![value], &value_start);
        }
        Ok(())
    }

    fn consume_quote(&mut self, quote_char: char) {
        let start = self.state.clone();
        self.advance();
        self.push_token(TokenType::AttrQuote, vec![quote_char.to_string()], &start);
    }

    fn consume_tag_open_end(&mut self) -> Result<(), ParseError> {
        let start = self.state.clone();
        if self.attempt_str("/>") {
            self.push_token(TokenType::TagOpenEndVoid, vec![], &start);
            return Ok(());
        }
        self.require_char_code(chars::GT)?;
        self.push_token(TokenType::TagOpenEnd, vec![], &start);
        Ok(())
    }

    fn consume_tag_close(&mut self, start: CursorState) -> Result<(), ParseError> {
        self.skip_whitespace();
        let name = self.read_name();
        self.skip_whitespace();
        self.require_char_code(chars::GT)?;
        self.push_token(TokenType::TagClose, vec![name], &start);
        Ok(())
    }

    // Text

    fn consume_text(&mut self) {
        let start = self.state.clone();
        let mut value = String::new();

        loop {
            if self.tokenize_icu && self.attempt_str_peek(INTERPOLATION_START) {
                self.consume_interpolation(&mut value);
            } else {
                self.consume_char_or_entity(&mut value);
            }
            if self.is_text_end() {
                break;
            }
        }

        self.push_token(TokenType::Text, vec![process_carriage_returns(&value)], &start);
    }

    /// `{{ ... }}` is plain text, its braces must not open an expansion form
    fn consume_interpolation(&mut self, value: &mut String) {
        let start = self.state.offset;
        self.attempt_str(INTERPOLATION_START);
        while !self.at_eof() && !self.attempt_str_peek(INTERPOLATION_END) {
            self.advance();
        }
        self.attempt_str(INTERPOLATION_END);
        value.push_str(&self.file.content[start..self.state.offset]);
    }

    fn is_text_end(&self) -> bool {
        if self.at_eof() || self.is_tag_start() {
            return true;
        }
        if self.tokenize_icu {
            if self.is_expansion_form_start() {
                return true;
            }
            if self.peek() == chars::RBRACE && self.is_in_expansion_case() {
                return true;
            }
        }
        false
    }

    fn consume_char_or_entity(&mut self, value: &mut String) {
        if self.peek() != chars::AMPERSAND {
            value.push(self.peek());
            self.advance();
            return;
        }

        let start = self.state.clone();
        self.advance();
        match self.read_entity(&start) {
            Ok(decoded) => value.push_str(&decoded),
            Err(error) => {
                self.errors.push(error);
                value.push_str(&self.file.content[start.offset..self.state.offset]);
            }
        }
    }

    /// Decode an entity, the leading `&` has been consumed.
    fn read_entity(&mut self, start: &CursorState) -> Result<String, ParseError> {
        if self.attempt_char_code(chars::HASH) {
            let is_hex = self.attempt_char_code('x') || self.attempt_char_code('X');
            let digits_start = self.state.offset;
            while !self.at_eof()
                && (if is_hex {
                    chars::is_ascii_hex_digit(self.peek())
                } else {
                    chars::is_digit(self.peek())
                })
            {
                self.advance();
            }
            let digits = self.file.content[digits_start..self.state.offset].to_string();
            if !self.attempt_char_code(chars::SEMICOLON) {
                let entity = self.file.content[start.offset..self.state.offset].to_string();
                return Err(self.create_error(unparsable_entity_error_msg(is_hex, &entity), start));
            }
            let radix = if is_hex { 16 } else { 10 };
            return u32::from_str_radix(&digits, radix)
                .ok()
                .and_then(char::from_u32)
                .map(|c| c.to_string())
                .ok_or_else(|| {
                    let entity = self.file.content[start.offset..self.state.offset].to_string();
                    self.create_error(unparsable_entity_error_msg(is_hex, &entity), start)
                });
        }

        let name_start = self.state.offset;
        while !self.at_eof() && self.peek().is_ascii_alphanumeric() {
            self.advance();
        }
        let name = self.file.content[name_start..self.state.offset].to_string();
        if self.peek() != chars::SEMICOLON {
            // Not an entity reference, `&` is literal text
            return Ok(format!("&{}", name));
        }
        self.advance();
        named_entity(&name)
            .map(str::to_string)
            .ok_or_else(|| self.create_error(unknown_entity_error_msg(&name), start))
    }

    // Expansion forms

    fn tokenize_expansion_form(&mut self) -> Result<bool, ParseError> {
        if self.is_expansion_form_start() {
            self.consume_expansion_form_start()?;
            return Ok(true);
        }

        if is_expansion_case_start(self.peek()) && self.is_in_expansion_form() {
            self.consume_expansion_case_start()?;
            return Ok(true);
        }

        if self.peek() == chars::RBRACE {
            if self.is_in_expansion_case() {
                self.consume_expansion_case_end();
                return Ok(true);
            }
            if self.is_in_expansion_form() {
                self.consume_expansion_form_end();
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn is_expansion_form_start(&self) -> bool {
        self.peek() == chars::LBRACE && !self.attempt_str_peek(INTERPOLATION_START)
    }

    fn is_in_expansion_case(&self) -> bool {
        self.expansion_case_stack.last() == Some(&TokenType::ExpansionCaseExpStart)
    }

    fn is_in_expansion_form(&self) -> bool {
        self.expansion_case_stack.last() == Some(&TokenType::ExpansionFormStart)
    }

    fn consume_expansion_form_start(&mut self) -> Result<(), ParseError> {
        let start = self.state.clone();
        self.require_char_code(chars::LBRACE)?;
        self.push_token(TokenType::ExpansionFormStart, vec![], &start);
        self.expansion_case_stack.push(TokenType::ExpansionFormStart);

        let condition_start = self.state.clone();
        let condition = self.read_until(chars::COMMA)?;
        self.push_token(TokenType::RawText, vec![process_carriage_returns(&condition)], &condition_start);
        self.require_char_code(chars::COMMA)?;
        self.skip_whitespace();

        let type_start = self.state.clone();
        let exp_type = self.read_until(chars::COMMA)?;
        self.push_token(TokenType::RawText, vec![exp_type.trim_end().to_string()], &type_start);
        self.require_char_code(chars::COMMA)?;
        self.skip_whitespace();
        Ok(())
    }

    fn consume_expansion_case_start(&mut self) -> Result<(), ParseError> {
        let value_start = self.state.clone();
        let value = self.read_until(chars::LBRACE)?;
        self.push_token(TokenType::ExpansionCaseValue, vec![value.trim().to_string()], &value_start);
        self.skip_whitespace();

        let start = self.state.clone();
        self.require_char_code(chars::LBRACE)?;
        self.push_token(TokenType::ExpansionCaseExpStart, vec![], &start);
        self.skip_whitespace();
        self.expansion_case_stack.push(TokenType::ExpansionCaseExpStart);
        Ok(())
    }

    fn consume_expansion_case_end(&mut self) {
        let start = self.state.clone();
        self.advance();
        self.push_token(TokenType::ExpansionCaseExpEnd, vec![], &start);
        self.skip_whitespace();
        self.expansion_case_stack.pop();
    }

    fn consume_expansion_form_end(&mut self) {
        let start = self.state.clone();
        self.advance();
        self.push_token(TokenType::ExpansionFormEnd, vec![], &start);
        self.expansion_case_stack.pop();
    }
}

fn process_carriage_returns(content: &str) -> String {
    CR_OR_CRLF_REGEXP.replace_all(content, "\n").into_owned()
}

fn named_entity(name: &str) -> Option<&'static str> {
    match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some("\u{00A0}"),
        _ => None,
    }
}

fn unexpected_character_error_msg(char_code: Option<char>) -> String {
    match char_code {
        Some(c) => format!("Unexpected character \"{}\"", c),
        None => "Unexpected character \"EOF\"".to_string(),
    }
}

fn unknown_entity_error_msg(entity_src: &str) -> String {
    format!(
        "Unknown entity \"{}\" - use the \"&#<decimal>;\" or  \"&#x<hex>;\" syntax",
        entity_src
    )
}

fn unparsable_entity_error_msg(is_hex: bool, entity_str: &str) -> String {
    let ref_type = if is_hex { "hexadecimal" } else { "decimal" };
    format!(
        "Unable to parse entity \"{}\" - {} character reference entities must end with \";\"",
        entity_str, ref_type
    )
}

fn is_name_start(code: char) -> bool {
    chars::is_ascii_letter(code) || code == chars::UNDERSCORE || code == chars::COLON
}

fn is_name_end(code: char) -> bool {
    chars::is_whitespace(code)
        || matches!(
            code,
            chars::GT | chars::LT | chars::SLASH | chars::SQ | chars::DQ | chars::EQ
        )
        || code == chars::EOF
}

fn is_expansion_case_start(peek: char) -> bool {
    peek == chars::EQ || chars::is_ascii_letter(peek) || chars::is_digit(peek)
}
