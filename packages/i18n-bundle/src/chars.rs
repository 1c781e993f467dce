//! Character constants used by the markup lexer

// Special characters
pub const EOF: char = '\0';
pub const TAB: char = '\t';
pub const LF: char = '\n';
pub const NEWLINE: char = '\n'; // Alias for LF
pub const FF: char = '\x0C';
pub const CR: char = '\r';
pub const SPACE: char = ' ';

// Punctuation
pub const BANG: char = '!';
pub const DQ: char = '"';
pub const HASH: char = '#';
pub const AMPERSAND: char = '&';
pub const SQ: char = '\'';
pub const COMMA: char = ',';
pub const SLASH: char = '/';
pub const COLON: char = ':';
pub const SEMICOLON: char = ';';
pub const LT: char = '<';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const QUESTION: char = '?';
pub const UNDERSCORE: char = '_';

// Braces
pub const LBRACE: char = '{';
pub const RBRACE: char = '}';

pub fn is_whitespace(code: char) -> bool {
    matches!(code, TAB | LF | FF | CR | SPACE)
}

pub fn is_digit(code: char) -> bool {
    code.is_ascii_digit()
}

pub fn is_ascii_letter(code: char) -> bool {
    code.is_ascii_alphabetic()
}

pub fn is_ascii_hex_digit(code: char) -> bool {
    code.is_ascii_hexdigit()
}
