//! Parse Utilities
//!
//! Source files, locations and spans shared by the markup parser and the
//! i18n message trees, plus the span-carrying `ParseError`.

use crate::chars;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseSourceFile {
    pub content: String,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: String, url: String) -> Self {
        ParseSourceFile { content, url }
    }
}

/// A position in a source file. `offset` is a byte offset, `line` and `col`
/// are 0 based.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseLocation {
    pub file: Rc<ParseSourceFile>,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    pub fn new(file: Rc<ParseSourceFile>, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation {
            file,
            offset,
            line,
            col,
        }
    }

    /// Return the source around the location
    /// Up to `max_chars` or `max_lines` on each side of the location
    pub fn get_context(&self, max_chars: usize, max_lines: usize) -> Option<(String, String)> {
        let content = &self.file.content;
        if content.is_empty() {
            return None;
        }

        let offset = self.offset.min(content.len());
        let (before_src, after_src) = content.split_at(offset);

        let mut before: Vec<char> = Vec::new();
        let mut ctx_lines = 0;
        for ch in before_src.chars().rev().take(max_chars) {
            if ch == chars::NEWLINE {
                ctx_lines += 1;
                if ctx_lines >= max_lines {
                    break;
                }
            }
            before.push(ch);
        }
        before.reverse();

        let mut after = String::new();
        ctx_lines = 0;
        for ch in after_src.chars().take(max_chars) {
            if ch == chars::NEWLINE {
                ctx_lines += 1;
                if ctx_lines >= max_lines {
                    break;
                }
            }
            after.push(ch);
        }

        Some((before.into_iter().collect(), after))
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.file.url, self.line, self.col)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
    pub details: Option<String>,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan {
            start,
            end,
            details: None,
        }
    }

    /// A zero-width span at the start of an empty file, for nodes that are
    /// built programmatically rather than parsed.
    pub fn empty(url: &str) -> Self {
        let file = Rc::new(ParseSourceFile::new(String::new(), url.to_string()));
        let location = ParseLocation::new(file, 0, 0, 0);
        ParseSourceSpan::new(location.clone(), location)
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    /// The source text covered by this span.
    pub fn text(&self) -> &str {
        self.start
            .file
            .content
            .get(self.start.offset..self.end.offset)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub span: ParseSourceSpan,
    pub msg: String,
    pub level: ParseErrorLevel,
}

/// Errors reported while converting bundle markup into i18n nodes.
pub type I18nError = ParseError;

impl ParseError {
    pub fn new(span: ParseSourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
            level: ParseErrorLevel::Error,
        }
    }

    pub fn contextual_message(&self) -> String {
        match self.span.start.get_context(100, 3) {
            Some((before, after)) => {
                let level_str = match self.level {
                    ParseErrorLevel::Warning => "WARNING",
                    ParseErrorLevel::Error => "ERROR",
                };
                format!("{} (\"{}[{} ->]{}\")", self.msg, before, level_str, after)
            }
            None => self.msg.clone(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details = self
            .span
            .details
            .as_ref()
            .map(|d| format!(", {}", d))
            .unwrap_or_default();
        write!(f, "{}: {}{}", self.contextual_message(), self.span.start, details)
    }
}
