//! ML Parser AST
//!
//! XML Abstract Syntax Tree node definitions

use crate::parse_util::ParseSourceSpan;

/// Node type union
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Attribute(Attribute),
    Comment(Comment),
    Element(Element),
    Expansion(Expansion),
    ExpansionCase(ExpansionCase),
    Text(Text),
}

impl Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            Node::Attribute(n) => &n.source_span,
            Node::Comment(n) => &n.source_span,
            Node::Element(n) => &n.source_span,
            Node::Expansion(n) => &n.source_span,
            Node::ExpansionCase(n) => &n.source_span,
            Node::Text(n) => &n.source_span,
        }
    }

    pub fn visit<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Node::Attribute(n) => visitor.visit_attribute(n),
            Node::Comment(n) => visitor.visit_comment(n),
            Node::Element(n) => visitor.visit_element(n),
            Node::Expansion(n) => visitor.visit_expansion(n),
            Node::ExpansionCase(n) => visitor.visit_expansion_case(n),
            Node::Text(n) => visitor.visit_text(n),
        }
    }
}

/// Text node
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

impl Text {
    pub fn new(value: String, source_span: ParseSourceSpan) -> Self {
        Text { value, source_span }
    }
}

/// Expansion (ICU message format)
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub switch_value: String,
    pub expansion_type: String,
    pub cases: Vec<ExpansionCase>,
    pub source_span: ParseSourceSpan,
    pub switch_value_source_span: ParseSourceSpan,
}

/// Expansion case
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionCase {
    pub value: String,
    pub expression: Vec<Node>,
    pub source_span: ParseSourceSpan,
    pub value_source_span: ParseSourceSpan,
    pub exp_source_span: ParseSourceSpan,
}

/// Attribute node
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
    pub value_span: Option<ParseSourceSpan>,
}

/// Element node
///
/// `start_source_span` covers `<name attrs>`, `end_source_span` covers
/// `</name>`. A self-closing element has no end span.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    pub is_self_closing: bool,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
    pub end_source_span: Option<ParseSourceSpan>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| attr.name == name)
    }

    /// The exact source text between the end of the start tag and the start
    /// of the end tag. Empty for self-closing elements.
    pub fn inner_source(&self) -> &str {
        match &self.end_source_span {
            Some(end) => {
                let content = &self.start_source_span.start.file.content;
                content
                    .get(self.start_source_span.end.offset..end.start.offset)
                    .unwrap_or("")
            }
            None => "",
        }
    }
}

/// Comment node
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub value: Option<String>,
    pub source_span: ParseSourceSpan,
}

impl Comment {
    pub fn new(value: Option<String>, source_span: ParseSourceSpan) -> Self {
        Comment { value, source_span }
    }
}

/// Visitor trait for traversing AST
pub trait Visitor {
    type Output;

    fn visit_element(&mut self, element: &Element) -> Self::Output;
    fn visit_attribute(&mut self, attribute: &Attribute) -> Self::Output;
    fn visit_text(&mut self, text: &Text) -> Self::Output;
    fn visit_comment(&mut self, comment: &Comment) -> Self::Output;
    fn visit_expansion(&mut self, expansion: &Expansion) -> Self::Output;
    fn visit_expansion_case(&mut self, expansion_case: &ExpansionCase) -> Self::Output;
}

/// Visit all nodes
pub fn visit_all<V: Visitor>(visitor: &mut V, nodes: &[Node]) -> Vec<V::Output> {
    nodes.iter().map(|node| node.visit(visitor)).collect()
}
