//! Shared builders for the i18n bundle tests.
#![allow(dead_code)]

use i18n_bundle::i18n::i18n_ast::{
    Container, Icu, IcuPlaceholder, Message, MessageSpan, Node, Placeholder, TagPlaceholder, Text,
};
use i18n_bundle::parse_util::ParseSourceSpan;
use indexmap::IndexMap;

pub fn span() -> ParseSourceSpan {
    ParseSourceSpan::empty("")
}

pub fn text(value: &str) -> Node {
    Node::Text(Text::new(value.to_string(), span()))
}

pub fn ph(name: &str, value: &str) -> Node {
    Node::Placeholder(Placeholder::new(value.to_string(), name.to_string(), span()))
}

pub fn container(children: Vec<Node>) -> Node {
    Node::Container(Container::new(children, span()))
}

pub fn tag_ph(tag: &str, start_name: &str, close_name: &str, children: Vec<Node>) -> Node {
    Node::TagPlaceholder(TagPlaceholder::new(
        tag.to_string(),
        IndexMap::new(),
        start_name.to_string(),
        close_name.to_string(),
        children,
        false,
        span(),
    ))
}

pub fn void_tag_ph(tag: &str, start_name: &str) -> Node {
    Node::TagPlaceholder(TagPlaceholder::new(
        tag.to_string(),
        IndexMap::new(),
        start_name.to_string(),
        String::new(),
        Vec::new(),
        true,
        span(),
    ))
}

pub fn icu_value(expression: &str, type_: &str, cases: Vec<(&str, Node)>) -> Icu {
    let cases: IndexMap<String, Node> = cases
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    Icu::new(expression.to_string(), type_.to_string(), cases, span(), None)
}

pub fn icu(expression: &str, type_: &str, cases: Vec<(&str, Node)>) -> Node {
    Node::Icu(icu_value(expression, type_, cases))
}

pub fn icu_ph(name: &str, value: Icu) -> Node {
    Node::IcuPlaceholder(IcuPlaceholder::new(value, name.to_string(), span()))
}

pub fn message(nodes: Vec<Node>) -> Message {
    Message::new(nodes, String::new(), String::new(), String::new())
}

pub fn message_with_id(id: &str, nodes: Vec<Node>) -> Message {
    message(nodes).with_id(id)
}

pub fn message_with(nodes: Vec<Node>, meaning: &str, description: &str) -> Message {
    Message::new(nodes, meaning.to_string(), description.to_string(), String::new())
}

pub fn source(file_path: &str, start_line: usize, end_line: usize) -> MessageSpan {
    MessageSpan::new(file_path, start_line, end_line)
}

/// Route library logs to the test output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}
