//! XML Helper Module
//!
//! A small XML tree used as the lingua franca between i18n messages and the
//! serialized bundle text.

use indexmap::IndexMap;

/// Visitor trait for XML nodes
///
/// `CR` nodes are visited as text.
pub trait IVisitor {
    type Output;

    fn visit_tag(&mut self, tag: &Tag) -> Self::Output;
    fn visit_text(&mut self, text: &Text) -> Self::Output;
    fn visit_declaration(&mut self, decl: &Declaration) -> Self::Output;
    fn visit_doctype(&mut self, doctype: &Doctype) -> Self::Output;
}

struct Visitor;

impl IVisitor for Visitor {
    type Output = String;

    fn visit_tag(&mut self, tag: &Tag) -> String {
        let str_attrs = self.serialize_attributes(&tag.attrs);

        if tag.children.is_empty() {
            return format!("<{}{}/>", tag.name, str_attrs);
        }

        let str_children: Vec<String> = tag.children.iter().map(|node| node.visit(self)).collect();

        format!(
            "<{}{}>{}</{}>",
            tag.name,
            str_attrs,
            str_children.join(""),
            tag.name
        )
    }

    fn visit_text(&mut self, text: &Text) -> String {
        text.value.clone()
    }

    fn visit_declaration(&mut self, decl: &Declaration) -> String {
        let str_attrs = self.serialize_attributes(&decl.attrs);
        format!("<?xml{} ?>", str_attrs)
    }

    fn visit_doctype(&mut self, doctype: &Doctype) -> String {
        format!("<!DOCTYPE {} [\n{}\n]>", doctype.root_tag, doctype.dtd)
    }
}

impl Visitor {
    fn serialize_attributes(&self, attrs: &IndexMap<String, String>) -> String {
        let str_attrs: String = attrs
            .iter()
            .map(|(name, value)| format!(" {}=\"{}\"", name, value))
            .collect();
        str_attrs
    }
}

/// Serialize XML nodes to string
pub fn serialize(nodes: &[Node]) -> String {
    let mut visitor = Visitor;
    nodes.iter().map(|node| node.visit(&mut visitor)).collect()
}

/// All XML node kinds
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Declaration(Declaration),
    Doctype(Doctype),
    Tag(Tag),
    Text(Text),
    CR(CR),
}

impl Node {
    pub fn visit<V: IVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Node::Declaration(n) => visitor.visit_declaration(n),
            Node::Doctype(n) => visitor.visit_doctype(n),
            Node::Tag(n) => visitor.visit_tag(n),
            Node::Text(n) => visitor.visit_text(n),
            Node::CR(n) => visitor.visit_text(&n.as_text()),
        }
    }

    pub fn text(unescaped_value: impl Into<String>) -> Node {
        Node::Text(Text::new(unescaped_value))
    }

    pub fn cr(ws: usize) -> Node {
        Node::CR(CR::new(ws))
    }
}

impl From<Tag> for Node {
    fn from(tag: Tag) -> Self {
        Node::Tag(tag)
    }
}

/// XML Declaration node
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub attrs: IndexMap<String, String>,
}

impl Declaration {
    pub fn new(unescaped_attrs: IndexMap<String, String>) -> Self {
        Declaration {
            attrs: escape_attrs(unescaped_attrs),
        }
    }
}

/// XML Doctype node
#[derive(Debug, Clone, PartialEq)]
pub struct Doctype {
    pub root_tag: String,
    pub dtd: String,
}

impl Doctype {
    pub fn new(root_tag: impl Into<String>, dtd: impl Into<String>) -> Self {
        Doctype {
            root_tag: root_tag.into(),
            dtd: dtd.into(),
        }
    }
}

/// XML Tag node
///
/// Attribute values are stored escaped and serialized in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub attrs: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Tag {
    pub fn new(
        name: impl Into<String>,
        unescaped_attrs: IndexMap<String, String>,
        children: Vec<Node>,
    ) -> Self {
        Tag {
            name: name.into(),
            attrs: escape_attrs(unescaped_attrs),
            children,
        }
    }

    /// Shorthand for a tag without attributes.
    pub fn element(name: impl Into<String>, children: Vec<Node>) -> Self {
        Tag::new(name, IndexMap::new(), children)
    }
}

/// XML Text node
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub value: String,
}

impl Text {
    pub fn new(unescaped_value: impl Into<String>) -> Self {
        Text {
            value: escape_xml(&unescaped_value.into()),
        }
    }
}

/// XML Carriage Return node (for formatting)
#[derive(Debug, Clone, PartialEq)]
pub struct CR {
    pub ws: usize,
}

impl CR {
    pub fn new(ws: usize) -> Self {
        CR { ws }
    }

    fn as_text(&self) -> Text {
        Text {
            value: format!("\n{}", " ".repeat(self.ws)),
        }
    }
}

fn escape_attrs(unescaped_attrs: IndexMap<String, String>) -> IndexMap<String, String> {
    unescaped_attrs
        .into_iter()
        .map(|(k, v)| (k, escape_xml(&v)))
        .collect()
}

/// Escape special XML characters
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
