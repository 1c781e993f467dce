//! I18n AST Module
//!
//! Defines the AST nodes for internationalization messages

use crate::parse_util::ParseSourceSpan;
use indexmap::IndexMap;

/// Line and columns indexes are 1 based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSpan {
    pub file_path: String,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl MessageSpan {
    pub fn new(file_path: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        MessageSpan {
            file_path: file_path.into(),
            start_line,
            start_col: 1,
            end_line,
            end_col: 1,
        }
    }
}

/// Represents an i18n message
///
/// An empty `meaning` or `description` means the message has none. An empty
/// `id` means the id has to be computed with a digest.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub nodes: Vec<Node>,
    pub meaning: String,
    pub description: String,
    pub custom_id: String,
    pub sources: Vec<MessageSpan>,
    pub id: String,
}

impl Message {
    pub fn new(nodes: Vec<Node>, meaning: String, description: String, custom_id: String) -> Self {
        let id = custom_id.clone();

        let sources = match (nodes.first(), nodes.last()) {
            (Some(first), Some(last)) if !first.source_span().start.file.url.is_empty() => {
                let start = &first.source_span().start;
                let end = &last.source_span().end;
                vec![MessageSpan {
                    file_path: start.file.url.clone(),
                    start_line: start.line + 1,
                    start_col: start.col + 1,
                    end_line: end.line + 1,
                    end_col: start.col + 1,
                }]
            }
            _ => vec![],
        };

        Message {
            nodes,
            meaning,
            description,
            custom_id,
            sources,
            id,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_sources(mut self, sources: Vec<MessageSpan>) -> Self {
        self.sources = sources;
        self
    }
}

/// Enum representing all possible i18n AST node types
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(Text),
    Container(Container),
    Icu(Icu),
    TagPlaceholder(TagPlaceholder),
    Placeholder(Placeholder),
    IcuPlaceholder(IcuPlaceholder),
}

impl Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            Node::Text(n) => &n.source_span,
            Node::Container(n) => &n.source_span,
            Node::Icu(n) => &n.source_span,
            Node::TagPlaceholder(n) => &n.source_span,
            Node::Placeholder(n) => &n.source_span,
            Node::IcuPlaceholder(n) => &n.source_span,
        }
    }

    pub fn visit<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Node::Text(n) => visitor.visit_text(n),
            Node::Container(n) => visitor.visit_container(n),
            Node::Icu(n) => visitor.visit_icu(n),
            Node::TagPlaceholder(n) => visitor.visit_tag_placeholder(n),
            Node::Placeholder(n) => visitor.visit_placeholder(n),
            Node::IcuPlaceholder(n) => visitor.visit_icu_placeholder(n),
        }
    }
}

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

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub children: Vec<Node>,
    pub source_span: ParseSourceSpan,
}

impl Container {
    pub fn new(children: Vec<Node>, source_span: ParseSourceSpan) -> Self {
        Container {
            children,
            source_span,
        }
    }
}

/// A plural / select construct. `cases` keeps the declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Icu {
    pub expression: String,
    pub type_: String,
    pub cases: IndexMap<String, Node>,
    pub source_span: ParseSourceSpan,
    pub expression_placeholder: Option<String>,
}

impl Icu {
    pub fn new(
        expression: String,
        type_: String,
        cases: IndexMap<String, Node>,
        source_span: ParseSourceSpan,
        expression_placeholder: Option<String>,
    ) -> Self {
        Icu {
            expression,
            type_,
            cases,
            source_span,
            expression_placeholder,
        }
    }
}

/// A markup element collapsed to a start and a close placeholder.
/// Void elements have an empty `close_name` and no children.
#[derive(Debug, Clone, PartialEq)]
pub struct TagPlaceholder {
    pub tag: String,
    pub attrs: IndexMap<String, String>,
    pub start_name: String,
    pub close_name: String,
    pub children: Vec<Node>,
    pub is_void: bool,
    pub source_span: ParseSourceSpan,
}

impl TagPlaceholder {
    pub fn new(
        tag: String,
        attrs: IndexMap<String, String>,
        start_name: String,
        close_name: String,
        children: Vec<Node>,
        is_void: bool,
        source_span: ParseSourceSpan,
    ) -> Self {
        let (close_name, children) = if is_void {
            (String::new(), Vec::new())
        } else {
            (close_name, children)
        };
        TagPlaceholder {
            tag,
            attrs,
            start_name,
            close_name,
            children,
            is_void,
            source_span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub value: String,
    pub name: String,
    pub source_span: ParseSourceSpan,
}

impl Placeholder {
    pub fn new(value: String, name: String, source_span: ParseSourceSpan) -> Self {
        Placeholder {
            value,
            name,
            source_span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IcuPlaceholder {
    pub value: Icu,
    pub name: String,
    pub source_span: ParseSourceSpan,
}

impl IcuPlaceholder {
    pub fn new(value: Icu, name: String, source_span: ParseSourceSpan) -> Self {
        IcuPlaceholder {
            value,
            name,
            source_span,
        }
    }
}

/// Visitor over the i18n AST. Each consumer (serializers, digest, name
/// mapping) is its own handler set over the same node kinds.
pub trait Visitor {
    type Output;

    fn visit_text(&mut self, text: &Text) -> Self::Output;
    fn visit_container(&mut self, container: &Container) -> Self::Output;
    fn visit_icu(&mut self, icu: &Icu) -> Self::Output;
    fn visit_tag_placeholder(&mut self, ph: &TagPlaceholder) -> Self::Output;
    fn visit_placeholder(&mut self, ph: &Placeholder) -> Self::Output;
    fn visit_icu_placeholder(&mut self, ph: &IcuPlaceholder) -> Self::Output;
}

/// Visit all nodes
pub fn visit_all<V: Visitor>(visitor: &mut V, nodes: &[Node]) -> Vec<V::Output> {
    nodes.iter().map(|node| node.visit(visitor)).collect()
}

/// Concatenates the text of a node list, placeholders are rendered as their
/// names. Used for logging and quick assertions.
pub fn serialize_message(nodes: &[Node]) -> String {
    struct LocalizeMessageStringVisitor;

    impl Visitor for LocalizeMessageStringVisitor {
        type Output = String;

        fn visit_text(&mut self, text: &Text) -> String {
            text.value.clone()
        }

        fn visit_container(&mut self, container: &Container) -> String {
            visit_all(self, &container.children).join("")
        }

        fn visit_icu(&mut self, icu: &Icu) -> String {
            let str_cases: Vec<String> = icu
                .cases
                .iter()
                .map(|(k, v)| format!("{} {{{}}}", k, v.visit(self)))
                .collect();
            format!("{{{}, {}, {}}}", icu.expression, icu.type_, str_cases.join(" "))
        }

        fn visit_tag_placeholder(&mut self, ph: &TagPlaceholder) -> String {
            let children = visit_all(self, &ph.children).join("");
            if ph.is_void {
                format!("{{${}}}", ph.start_name)
            } else {
                format!("{{${}}}{}{{${}}}", ph.start_name, children, ph.close_name)
            }
        }

        fn visit_placeholder(&mut self, ph: &Placeholder) -> String {
            format!("{{${}}}", ph.name)
        }

        fn visit_icu_placeholder(&mut self, ph: &IcuPlaceholder) -> String {
            format!("{{${}}}", ph.name)
        }
    }

    visit_all(&mut LocalizeMessageStringVisitor, nodes).join("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> ParseSourceSpan {
        ParseSourceSpan::empty("")
    }

    #[test]
    fn test_void_tag_placeholder_drops_close_name_and_children() {
        let ph = TagPlaceholder::new(
            "br".to_string(),
            IndexMap::new(),
            "LINE_BREAK".to_string(),
            "CLOSE_LINE_BREAK".to_string(),
            vec![Node::Text(Text::new("x".to_string(), span()))],
            true,
            span(),
        );
        assert!(ph.close_name.is_empty());
        assert!(ph.children.is_empty());
    }

    #[test]
    fn test_serialize_message() {
        let mut cases = IndexMap::new();
        cases.insert("=0".to_string(), Node::Text(Text::new("none".to_string(), span())));
        cases.insert("other".to_string(), Node::Text(Text::new("many".to_string(), span())));
        let nodes = vec![
            Node::Text(Text::new("Hi ".to_string(), span())),
            Node::Placeholder(Placeholder::new("name".to_string(), "NAME".to_string(), span())),
            Node::Icu(Icu::new("n".to_string(), "plural".to_string(), cases, span(), None)),
        ];
        assert_eq!(
            serialize_message(&nodes),
            "Hi {$NAME}{n, plural, =0 {none} other {many}}"
        );
    }

    #[test]
    fn test_message_without_spans_has_no_sources() {
        let message = Message::new(
            vec![Node::Text(Text::new("a".to_string(), span()))],
            String::new(),
            String::new(),
            "id".to_string(),
        );
        assert_eq!(message.id, "id");
        assert!(message.sources.is_empty());
    }
}
