//! ML Parser
//!
//! XML parser - converts tokens into AST

use super::ast::*;
use super::lexer::{tokenize, TokenizeOptions};
use super::tokens::{Token, TokenType};
use crate::parse_util::{ParseError, ParseSourceSpan};

/// Parse tree result
#[derive(Debug, Clone)]
pub struct ParseTreeResult {
    pub root_nodes: Vec<Node>,
    pub errors: Vec<ParseError>,
}

impl ParseTreeResult {
    pub fn new(root_nodes: Vec<Node>, errors: Vec<ParseError>) -> Self {
        ParseTreeResult { root_nodes, errors }
    }
}

/// Main parser class
#[derive(Debug, Clone, Default)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Parser
    }

    pub fn parse(&self, source: &str, url: &str, options: Option<TokenizeOptions>) -> ParseTreeResult {
        let tokenize_result = tokenize(source, url, options.unwrap_or_default());

        let mut tree_builder = TreeBuilder::new(tokenize_result.tokens);
        tree_builder.build();

        let mut all_errors = tokenize_result.errors;
        all_errors.extend(tree_builder.errors);

        ParseTreeResult::new(tree_builder.root_nodes, all_errors)
    }
}

/// Internal tree builder
struct TreeBuilder {
    tokens: Vec<Token>,
    index: usize,
    element_stack: Vec<Element>,
    root_nodes: Vec<Node>,
    errors: Vec<ParseError>,
}

impl TreeBuilder {
    /// `tokens` must be terminated by an `Eof` token.
    fn new(tokens: Vec<Token>) -> Self {
        TreeBuilder {
            tokens,
            index: 0,
            element_stack: Vec::new(),
            root_nodes: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn build(&mut self) {
        while let Some(token_type) = self.peek_type() {
            match token_type {
                TokenType::Eof => break,
                TokenType::TagOpenStart => {
                    let tok = self.advance();
                    self.consume_start_tag(tok);
                }
                TokenType::TagClose => {
                    let tok = self.advance();
                    self.consume_end_tag(tok);
                }
                TokenType::CdataStart => {
                    let tok = self.advance();
                    self.consume_cdata(tok);
                }
                TokenType::CommentStart => {
                    let tok = self.advance();
                    self.consume_comment(tok);
                }
                TokenType::Text | TokenType::RawText => {
                    let tok = self.advance();
                    self.consume_text(tok);
                }
                TokenType::ExpansionFormStart => {
                    let tok = self.advance();
                    self.consume_expansion(tok);
                }
                _ => {
                    // Doctypes, processing instructions and stray tokens carry no content
                    self.advance();
                }
            }
        }

        while let Some(element) = self.element_stack.pop() {
            self.errors.push(ParseError::new(
                element.start_source_span.clone(),
                format!("Unclosed element \"{}\"", element.name),
            ));
            self.add_to_parent(Node::Element(element));
        }
    }

    fn peek_type(&self) -> Option<TokenType> {
        self.tokens.get(self.index).map(|t| t.token_type)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.index].clone();
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn advance_if(&mut self, token_type: TokenType) -> Option<Token> {
        if self.peek_type() == Some(token_type) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn consume_cdata(&mut self, start_token: Token) {
        let text = self.advance_if(TokenType::RawText);
        let end = self.advance_if(TokenType::CdataEnd);
        let end_location = end
            .as_ref()
            .map(|t| t.source_span.end.clone())
            .unwrap_or_else(|| start_token.source_span.end.clone());
        let value = text.map(|t| t.value().to_string()).unwrap_or_default();
        let span = ParseSourceSpan::new(start_token.source_span.start, end_location);
        self.add_to_parent(Node::Text(Text::new(value, span)));
    }

    fn consume_comment(&mut self, start_token: Token) {
        let text = self.advance_if(TokenType::RawText);
        let end = self.advance_if(TokenType::CommentEnd);
        let end_location = end
            .as_ref()
            .map(|t| t.source_span.end.clone())
            .unwrap_or_else(|| start_token.source_span.end.clone());
        let value = text.map(|t| t.value().trim().to_string());
        let span = ParseSourceSpan::new(start_token.source_span.start, end_location);
        self.add_to_parent(Node::Comment(Comment::new(value, span)));
    }

    fn consume_text(&mut self, token: Token) {
        let value = token.value().to_string();
        if value.is_empty() {
            return;
        }
        self.add_to_parent(Node::Text(Text::new(value, token.source_span)));
    }

    fn consume_start_tag(&mut self, start_token: Token) {
        let name = start_token.value().to_string();
        let mut attrs = Vec::new();
        while let Some(attr_name) = self.advance_if(TokenType::AttrName) {
            attrs.push(self.consume_attr(attr_name));
        }

        let (is_self_closing, end_location) = match self.peek_type() {
            Some(TokenType::TagOpenEndVoid) => (true, self.advance().source_span.end),
            Some(TokenType::TagOpenEnd) => (false, self.advance().source_span.end),
            _ => (false, start_token.source_span.end.clone()),
        };

        let start_span = ParseSourceSpan::new(start_token.source_span.start, end_location);
        let element = Element {
            name,
            attrs,
            children: Vec::new(),
            is_self_closing,
            source_span: start_span.clone(),
            start_source_span: start_span,
            end_source_span: None,
        };

        if is_self_closing {
            self.add_to_parent(Node::Element(element));
        } else {
            self.element_stack.push(element);
        }
    }

    fn consume_attr(&mut self, attr_name: Token) -> Attribute {
        let name = attr_name.value().to_string();
        let mut end_location = attr_name.source_span.end.clone();

        if let Some(quote) = self.advance_if(TokenType::AttrQuote) {
            end_location = quote.source_span.end;
        }
        let mut value = String::new();
        let mut value_span = None;
        if let Some(value_token) = self.advance_if(TokenType::AttrValueText) {
            value = value_token.value().to_string();
            end_location = value_token.source_span.end.clone();
            value_span = Some(value_token.source_span);
        }
        if let Some(quote) = self.advance_if(TokenType::AttrQuote) {
            end_location = quote.source_span.end;
        }

        Attribute {
            name,
            value,
            source_span: ParseSourceSpan::new(attr_name.source_span.start.clone(), end_location),
            key_span: attr_name.source_span,
            value_span,
        }
    }

    fn consume_end_tag(&mut self, end_token: Token) {
        let name = end_token.value();
        let matches_open_element = self
            .element_stack
            .last()
            .map(|el| el.name == name)
            .unwrap_or(false);

        if !matches_open_element {
            self.errors.push(ParseError::new(
                end_token.source_span.clone(),
                format!(
                    "Unexpected closing tag \"{}\". It may happen when the tag has already been closed by another tag.",
                    name
                ),
            ));
            return;
        }

        if let Some(mut element) = self.element_stack.pop() {
            element.source_span = ParseSourceSpan::new(
                element.source_span.start.clone(),
                end_token.source_span.end.clone(),
            );
            element.end_source_span = Some(end_token.source_span);
            self.add_to_parent(Node::Element(element));
        }
    }

    fn consume_expansion(&mut self, start_token: Token) {
        let switch_value = match self.advance_if(TokenType::RawText) {
            Some(token) => token,
            None => {
                self.error_missing_brace(&start_token);
                return;
            }
        };
        let exp_type = self
            .advance_if(TokenType::RawText)
            .map(|t| t.value().to_string())
            .unwrap_or_default();

        let mut cases = Vec::new();
        while self.peek_type() == Some(TokenType::ExpansionCaseValue) {
            match self.parse_expansion_case() {
                Some(case) => cases.push(case),
                // error has been reported
                None => return,
            }
        }

        let end = match self.advance_if(TokenType::ExpansionFormEnd) {
            Some(token) => token,
            None => {
                self.error_missing_brace(&start_token);
                return;
            }
        };

        let expansion = Expansion {
            switch_value: switch_value.value().to_string(),
            expansion_type: exp_type,
            cases,
            source_span: ParseSourceSpan::new(start_token.source_span.start, end.source_span.end),
            switch_value_source_span: switch_value.source_span,
        };
        self.add_to_parent(Node::Expansion(expansion));
    }

    fn parse_expansion_case(&mut self) -> Option<ExpansionCase> {
        let value = self.advance();

        let start = match self.advance_if(TokenType::ExpansionCaseExpStart) {
            Some(token) => token,
            None => {
                self.errors.push(ParseError::new(
                    value.source_span.clone(),
                    "Invalid ICU message. Missing '{'.",
                ));
                return None;
            }
        };

        let mut exp = self.collect_expansion_exp_tokens(&start)?;
        let end = self.advance();
        exp.push(Token::new(TokenType::Eof, vec![], end.source_span.clone()));

        let mut expansion_case_builder = TreeBuilder::new(exp);
        expansion_case_builder.build();
        if !expansion_case_builder.errors.is_empty() {
            self.errors.extend(expansion_case_builder.errors);
            return None;
        }

        Some(ExpansionCase {
            value: value.value().to_string(),
            expression: expansion_case_builder.root_nodes,
            source_span: ParseSourceSpan::new(value.source_span.start.clone(), end.source_span.end.clone()),
            value_source_span: value.source_span,
            exp_source_span: ParseSourceSpan::new(start.source_span.start, end.source_span.end),
        })
    }

    /// Collect the tokens of a case body, leaving the closing
    /// `ExpansionCaseExpEnd` as the next token.
    fn collect_expansion_exp_tokens(&mut self, start: &Token) -> Option<Vec<Token>> {
        let mut exp = Vec::new();
        let mut expansion_form_stack = vec![TokenType::ExpansionCaseExpStart];

        loop {
            let token_type = self.peek_type().unwrap_or(TokenType::Eof);

            match token_type {
                TokenType::ExpansionFormStart | TokenType::ExpansionCaseExpStart => {
                    expansion_form_stack.push(token_type);
                }
                TokenType::ExpansionCaseExpEnd => {
                    if expansion_form_stack.last() == Some(&TokenType::ExpansionCaseExpStart) {
                        expansion_form_stack.pop();
                        if expansion_form_stack.is_empty() {
                            return Some(exp);
                        }
                    } else {
                        self.error_missing_brace(start);
                        return None;
                    }
                }
                TokenType::ExpansionFormEnd => {
                    if expansion_form_stack.last() == Some(&TokenType::ExpansionFormStart) {
                        expansion_form_stack.pop();
                    } else {
                        self.error_missing_brace(start);
                        return None;
                    }
                }
                TokenType::Eof => {
                    self.error_missing_brace(start);
                    return None;
                }
                _ => {}
            }

            exp.push(self.advance());
        }
    }

    fn error_missing_brace(&mut self, token: &Token) {
        self.errors.push(ParseError::new(
            token.source_span.clone(),
            "Invalid ICU message. Missing '}'.",
        ));
    }

    fn add_to_parent(&mut self, node: Node) {
        let siblings = match self.element_stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root_nodes,
        };

        // Adjacent text (e.g. around a CDATA section) is merged into one node
        if let (Node::Text(text), Some(Node::Text(prev))) = (&node, siblings.last_mut()) {
            prev.value.push_str(&text.value);
            prev.source_span.end = text.source_span.end.clone();
            return;
        }

        siblings.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str, icu: bool) -> ParseTreeResult {
        let options = TokenizeOptions {
            tokenize_expansion_forms: icu,
        };
        Parser::new().parse(source, "test.xml", Some(options))
    }

    #[test]
    fn test_parse_nested_elements() {
        let result = parse("<a x=\"1\"><b/>text</a>", false);
        assert!(result.errors.is_empty());
        assert_eq!(result.root_nodes.len(), 1);
        match &result.root_nodes[0] {
            Node::Element(a) => {
                assert_eq!(a.name, "a");
                assert_eq!(a.attr("x").map(|attr| attr.value.as_str()), Some("1"));
                assert_eq!(a.children.len(), 2);
                assert_eq!(a.inner_source(), "<b/>text");
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_closing_tag() {
        let result = parse("<a></b></a>", false);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].msg.starts_with("Unexpected closing tag \"b\""));
    }

    #[test]
    fn test_unclosed_element() {
        let result = parse("<a>", false);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].msg, "Unclosed element \"a\"");
    }

    #[test]
    fn test_parse_expansion_with_nested_element() {
        let result = parse("{n, plural, =1 {one <ph name=\"X\"/>} other {many}}", true);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        match &result.root_nodes[0] {
            Node::Expansion(expansion) => {
                assert_eq!(expansion.switch_value, "n");
                assert_eq!(expansion.expansion_type, "plural");
                assert_eq!(expansion.cases.len(), 2);
                assert_eq!(expansion.cases[0].value, "=1");
                assert_eq!(expansion.cases[0].expression.len(), 2);
                assert_eq!(expansion.cases[1].value, "other");
            }
            other => panic!("expected expansion, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_expansion() {
        let result = parse("{n, plural, =1 {one}", true);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].msg, "Invalid ICU message. Missing '}'.");
    }
}
