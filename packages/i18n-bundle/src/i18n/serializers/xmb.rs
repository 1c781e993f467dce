//! XMB Serializer Module
//!
//! XMB (XML Message Bundle) is the write-only export format. Translations come
//! back as XTB, see `xtb`.

use crate::i18n::config::BundleConfig;
use crate::i18n::digest::decimal_digest;
use crate::i18n::error::BundleError;
use crate::i18n::i18n_ast::{self as i18n, Message, Visitor};
use crate::i18n::serializers::serializer::{
    HtmlToXmlParser, I18nMessagesById, PlaceholderMapper, Serializer, SimplePlaceholderMapper,
    XmlMessagesById,
};
use crate::i18n::serializers::xml_helper as xml;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

const MESSAGES_TAG: &str = "messagebundle";
const MESSAGE_TAG: &str = "msg";
const PLACEHOLDER_TAG: &str = "ph";
const EXAMPLE_TAG: &str = "ex";
const SOURCE_TAG: &str = "source";

/// The document type every XMB file is written with.
pub const DOCTYPE: &str = r#"<!ELEMENT messagebundle (msg)*>
<!ATTLIST messagebundle class CDATA #IMPLIED>

<!ELEMENT msg (#PCDATA|ph|source)*>
<!ATTLIST msg id CDATA #IMPLIED>
<!ATTLIST msg seq CDATA #IMPLIED>
<!ATTLIST msg name CDATA #IMPLIED>
<!ATTLIST msg desc CDATA #IMPLIED>
<!ATTLIST msg meaning CDATA #IMPLIED>
<!ATTLIST msg obsolete (obsolete) #IMPLIED>
<!ATTLIST msg xml:space (default|preserve) "default">
<!ATTLIST msg is_hidden CDATA #IMPLIED>

<!ELEMENT source (#PCDATA)>

<!ELEMENT ph (#PCDATA|ex)*>
<!ATTLIST ph name CDATA #REQUIRED>

<!ELEMENT ex (#PCDATA)>"#;

static NON_PUBLIC_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Z0-9_]").expect("valid regex"));

/// XMB (XML Message Bundle) serializer
#[derive(Debug, Clone, Default)]
pub struct Xmb {
    config: BundleConfig,
}

impl Xmb {
    pub fn new() -> Self {
        Xmb::default()
    }

    pub fn with_config(config: BundleConfig) -> Self {
        Xmb { config }
    }
}

impl Serializer for Xmb {
    fn write(&self, messages: &[Message], locale: Option<&str>) -> Result<String, BundleError> {
        Ok(xmb_write_with_config(messages, locale, &[], &self.config))
    }

    fn load(&self, _content: &str, _url: &str) -> Result<I18nMessagesById, BundleError> {
        Err(BundleError::Unsupported(
            "XMB is a write-only format. Use XTB to load translations.".to_string(),
        ))
    }

    fn digest(&self, message: &Message) -> String {
        digest(message)
    }

    fn create_name_mapper(&self, message: &Message) -> Option<Box<dyn PlaceholderMapper>> {
        Some(Box::new(xmb_mapper(message)))
    }
}

/// Parse an existing XMB file and return its `msg` elements by id, used to
/// merge translations when extracting.
pub fn xmb_load_to_xml(content: &str) -> Result<XmlMessagesById, BundleError> {
    let result = HtmlToXmlParser::new(MESSAGE_TAG).parse(content);

    if !result.errors.is_empty() {
        warn!(errors = result.errors.len(), "xmb parse failed");
        return Err(BundleError::from_parse_errors("xmb", &result.errors));
    }

    debug!(messages = result.xml_messages_by_id.len(), "loaded existing xmb messages");
    Ok(result.xml_messages_by_id)
}

/// Write `messages` as an XMB document. `existing_nodes` are spliced at the
/// top of the bundle, in order.
pub fn xmb_write(messages: &[Message], locale: Option<&str>, existing_nodes: &[xml::Node]) -> String {
    xmb_write_with_config(messages, locale, existing_nodes, &BundleConfig::default())
}

pub fn xmb_write_with_config(
    messages: &[Message],
    locale: Option<&str>,
    existing_nodes: &[xml::Node],
    config: &BundleConfig,
) -> String {
    debug!(
        messages = messages.len(),
        existing = existing_nodes.len(),
        locale = ?locale,
        "writing xmb bundle"
    );

    let mut root_children = Vec::with_capacity(2 * (existing_nodes.len() + messages.len()) + 1);

    for node in existing_nodes {
        root_children.push(xml::Node::cr(2));
        root_children.push(node.clone());
    }

    for message in messages {
        root_children.push(xml::Node::cr(2));
        root_children.push(message_tag(message, config).into());
    }

    root_children.push(xml::Node::cr(0));

    let mut root = xml::Tag::new(MESSAGES_TAG, config.root_attrs.clone(), root_children);
    ExampleVisitor::new(&config.default_example).add_default_examples(&mut root);

    let decl_attrs = IndexMap::from([
        ("version".to_string(), "1.0".to_string()),
        ("encoding".to_string(), "UTF-8".to_string()),
    ]);

    xml::serialize(&[
        xml::Node::Declaration(xml::Declaration::new(decl_attrs)),
        xml::Node::cr(0),
        xml::Node::Doctype(xml::Doctype::new(MESSAGES_TAG, DOCTYPE)),
        xml::Node::cr(0),
        root.into(),
        xml::Node::cr(0),
    ])
}

fn message_tag(message: &Message, config: &BundleConfig) -> xml::Tag {
    let mut attrs = IndexMap::new();
    attrs.insert("id".to_string(), message.id.clone());

    if !message.description.is_empty() {
        attrs.insert("desc".to_string(), message.description.clone());
    }

    if !message.meaning.is_empty() {
        attrs.insert("meaning".to_string(), message.meaning.clone());
    }

    let mut children: Vec<xml::Node> = message
        .sources
        .iter()
        .map(|source| {
            let source_text = if source.end_line != source.start_line {
                format!("{}:{},{}", source.file_path, source.start_line, source.end_line)
            } else {
                format!("{}:{}", source.file_path, source.start_line)
            };
            xml::Tag::element(SOURCE_TAG, vec![xml::Node::text(source_text)]).into()
        })
        .collect();

    let mapper = xmb_mapper(message);
    let mut visitor = XmbVisitor {
        mapper: &mapper,
        default_example: &config.default_example,
    };
    children.extend(visitor.serialize(&message.nodes));

    xml::Tag::new(MESSAGE_TAG, attrs, children)
}

pub fn digest(message: &Message) -> String {
    decimal_digest(message)
}

pub fn xmb_mapper(message: &Message) -> SimplePlaceholderMapper {
    SimplePlaceholderMapper::new(message, to_public_name)
}

/// XMB/XTB placeholders can only contain A-Z, 0-9 and _
pub fn to_public_name(internal_name: &str) -> String {
    NON_PUBLIC_NAME_CHARS
        .replace_all(&internal_name.to_uppercase(), "_")
        .into_owned()
}

/// Converts message nodes to XMB XML nodes
struct XmbVisitor<'a> {
    mapper: &'a dyn PlaceholderMapper,
    default_example: &'a str,
}

impl<'a> XmbVisitor<'a> {
    fn serialize(&mut self, nodes: &[i18n::Node]) -> Vec<xml::Node> {
        i18n::visit_all(self, nodes).into_iter().flatten().collect()
    }

    fn public_name(&self, internal_name: &str) -> String {
        self.mapper
            .to_public_name(internal_name)
            .unwrap_or_else(|| internal_name.to_string())
    }

    /// A `ph` tag that already carries its example.
    fn placeholder_tag(&self, internal_name: &str, example: String) -> xml::Node {
        let name = self.public_name(internal_name);
        let example = if !example.is_empty() {
            example
        } else if !name.is_empty() {
            name.clone()
        } else {
            self.default_example.to_string()
        };
        let ex = xml::Tag::element(EXAMPLE_TAG, vec![xml::Node::text(example)]);
        let attrs = IndexMap::from([("name".to_string(), name)]);
        xml::Tag::new(PLACEHOLDER_TAG, attrs, vec![ex.into()]).into()
    }
}

impl<'a> Visitor for XmbVisitor<'a> {
    type Output = Vec<xml::Node>;

    fn visit_text(&mut self, text: &i18n::Text) -> Vec<xml::Node> {
        vec![xml::Node::text(text.value.clone())]
    }

    fn visit_container(&mut self, container: &i18n::Container) -> Vec<xml::Node> {
        self.serialize(&container.children)
    }

    fn visit_icu(&mut self, icu: &i18n::Icu) -> Vec<xml::Node> {
        let expression = icu
            .expression_placeholder
            .as_deref()
            .unwrap_or(&icu.expression);
        let mut nodes = vec![xml::Node::text(format!("{{{}, {}, ", expression, icu.type_))];

        for (case, node) in &icu.cases {
            nodes.push(xml::Node::text(format!("{} {{", case)));
            nodes.extend(node.visit(self));
            nodes.push(xml::Node::text("} "));
        }

        nodes.push(xml::Node::text("}"));
        nodes
    }

    fn visit_tag_placeholder(&mut self, ph: &i18n::TagPlaceholder) -> Vec<xml::Node> {
        let start_tag_ph = self.placeholder_tag(&ph.start_name, format!("<{}>", ph.tag));
        if ph.is_void {
            // void tags have no children nor closing tags
            return vec![start_tag_ph];
        }

        let mut nodes = vec![start_tag_ph];
        nodes.extend(self.serialize(&ph.children));
        nodes.push(self.placeholder_tag(&ph.close_name, format!("</{}>", ph.tag)));
        nodes
    }

    fn visit_placeholder(&mut self, ph: &i18n::Placeholder) -> Vec<xml::Node> {
        vec![self.placeholder_tag(&ph.name, format!("{{{{{}}}}}", ph.value))]
    }

    fn visit_icu_placeholder(&mut self, ph: &i18n::IcuPlaceholder) -> Vec<xml::Node> {
        let cases: Vec<String> = ph
            .value
            .cases
            .keys()
            .map(|case| format!("{} {{...}}", case))
            .collect();
        let example = format!(
            "{{{}, {}, {}}}",
            ph.value.expression,
            ph.value.type_,
            cases.join(" ")
        );
        vec![self.placeholder_tag(&ph.name, example)]
    }
}

/// Gives every `ph` tag without children an example, TC requires at least
/// one non-empty example on placeholders.
///
/// Placeholders built from messages already carry one, this pass covers the
/// spliced existing nodes.
struct ExampleVisitor<'a> {
    default_example: &'a str,
}

impl<'a> ExampleVisitor<'a> {
    fn new(default_example: &'a str) -> Self {
        ExampleVisitor { default_example }
    }

    fn add_default_examples(&self, tag: &mut xml::Tag) {
        if tag.name == PLACEHOLDER_TAG {
            if tag.children.is_empty() {
                let ex_text = tag
                    .attrs
                    .get("name")
                    .filter(|name| !name.is_empty())
                    .cloned()
                    .unwrap_or_else(|| xml::escape_xml(self.default_example));
                // `name` is stored escaped already
                let ex = xml::Tag::element(EXAMPLE_TAG, vec![xml::Node::Text(xml::Text { value: ex_text })]);
                tag.children = vec![ex.into()];
            }
            return;
        }

        for child in tag.children.iter_mut() {
            if let xml::Node::Tag(child) = child {
                self.add_default_examples(child);
            }
        }
    }
}
