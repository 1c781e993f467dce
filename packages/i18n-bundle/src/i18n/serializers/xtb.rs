//! XTB Serializer Module
//!
//! XTB (XML Translation Bundle) format loader. This format is read-only and
//! pairs with XMB.

use crate::i18n::error::BundleError;
use crate::i18n::i18n_ast::{self as i18n, Message};
use crate::i18n::serializers::serializer::{
    I18nMessagesById, PlaceholderMapper, Serializer, SimplePlaceholderMapper,
};
use crate::i18n::serializers::xmb::{xmb_mapper, Xmb};
use crate::ml_parser::{self as ml, XmlParser};
use crate::parse_util::I18nError;
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

const TRANSLATIONS_TAG: &str = "translationbundle";
const TRANSLATION_TAG: &str = "translation";
const PLACEHOLDER_TAG: &str = "ph";

/// XTB (XML Translation Bundle) loader
#[derive(Debug, Clone, Default)]
pub struct Xtb {
    xmb: Xmb,
}

impl Xtb {
    pub fn new() -> Self {
        Xtb::default()
    }
}

impl Serializer for Xtb {
    fn write(&self, _messages: &[Message], _locale: Option<&str>) -> Result<String, BundleError> {
        Err(BundleError::Unsupported(
            "XTB is a read-only format. Use XMB to write messages.".to_string(),
        ))
    }

    fn load(&self, content: &str, url: &str) -> Result<I18nMessagesById, BundleError> {
        load_xtb(content, url)
    }

    fn digest(&self, message: &Message) -> String {
        self.xmb.digest(message)
    }

    fn create_name_mapper(&self, message: &Message) -> Option<Box<dyn PlaceholderMapper>> {
        self.xmb.create_name_mapper(message)
    }
}

/// Load the translations of an XTB file.
///
/// Structural errors fail the whole load. The markup of each translation is
/// only converted when that translation is first read.
pub fn xtb_load_to_i18n(content: &str) -> Result<I18nMessagesById, BundleError> {
    load_xtb(content, "")
}

pub fn xtb_mapper(message: &Message) -> SimplePlaceholderMapper {
    xmb_mapper(message)
}

fn load_xtb(content: &str, url: &str) -> Result<I18nMessagesById, BundleError> {
    let (msg_id_to_html, errors) = XtbParser::new().parse(content, url);

    if !errors.is_empty() {
        warn!(errors = errors.len(), url, "xtb parse failed");
        return Err(BundleError::from_parse_errors("xtb", &errors));
    }

    // Translations written by other tools may not convert cleanly; each one
    // is converted on first access so a bad entry only fails its own lookup.
    let mut messages = I18nMessagesById::new(convert_translation);
    for (id, html) in msg_id_to_html {
        messages.insert_unresolved(id, html);
    }

    debug!(translations = messages.len(), url, "loaded xtb bundle");
    Ok(messages)
}

fn convert_translation(html: &str) -> Result<Vec<i18n::Node>, BundleError> {
    let (nodes, errors) = XmlToI18n::new().convert(html);
    if !errors.is_empty() {
        return Err(BundleError::from_parse_errors("xtb", &errors));
    }
    Ok(nodes)
}

/// Extract messages as raw markup from the xtb file
struct XtbParser {
    bundle_depth: usize,
    errors: Vec<I18nError>,
    msg_id_to_html: IndexMap<String, String>,
}

impl XtbParser {
    fn new() -> Self {
        XtbParser {
            bundle_depth: 0,
            errors: Vec::new(),
            msg_id_to_html: IndexMap::new(),
        }
    }

    fn parse(mut self, xtb: &str, url: &str) -> (IndexMap<String, String>, Vec<I18nError>) {
        // Expansion forms stay off here: translation bodies are kept as raw
        // markup and only lexed as ICU when converted.
        let xml = XmlParser::new().parse(xtb, url, false);

        self.errors = xml.errors;
        ml::visit_all(&mut self, &xml.root_nodes);

        (self.msg_id_to_html, self.errors)
    }

    fn add_error(&mut self, node: &ml::Element, message: impl Into<String>) {
        self.errors
            .push(I18nError::new(node.source_span.clone(), message));
    }
}

impl ml::Visitor for XtbParser {
    type Output = ();

    fn visit_element(&mut self, element: &ml::Element) {
        match element.name.as_str() {
            TRANSLATIONS_TAG => {
                self.bundle_depth += 1;
                if self.bundle_depth > 1 {
                    self.add_error(
                        element,
                        format!("<{}> elements can not be nested", TRANSLATIONS_TAG),
                    );
                }
                ml::visit_all(self, &element.children);
                self.bundle_depth -= 1;
            }
            TRANSLATION_TAG => match element.attr("id") {
                None => self.add_error(
                    element,
                    format!("<{}> misses the \"id\" attribute", TRANSLATION_TAG),
                ),
                Some(id_attr) => {
                    let id = id_attr.value.clone();
                    if self.msg_id_to_html.contains_key(&id) {
                        self.add_error(element, format!("Duplicated translations for msg {}", id));
                    } else {
                        trace!(id = %id, "captured translation");
                        let inner_text = element.inner_source().to_string();
                        self.msg_id_to_html.insert(id, inner_text);
                    }
                }
            },
            _ => self.add_error(element, "Unexpected tag"),
        }
    }

    fn visit_attribute(&mut self, _attribute: &ml::Attribute) {}

    fn visit_text(&mut self, _text: &ml::Text) {}

    fn visit_comment(&mut self, _comment: &ml::Comment) {}

    fn visit_expansion(&mut self, _expansion: &ml::Expansion) {}

    fn visit_expansion_case(&mut self, _expansion_case: &ml::ExpansionCase) {}
}

/// Convert ml nodes (xtb syntax) to i18n nodes
struct XmlToI18n {
    errors: Vec<I18nError>,
}

impl XmlToI18n {
    fn new() -> Self {
        XmlToI18n { errors: Vec::new() }
    }

    fn convert(mut self, message: &str) -> (Vec<i18n::Node>, Vec<I18nError>) {
        let xml_icu = XmlParser::new().parse(message, "", true);
        self.errors = xml_icu.errors;

        let i18n_nodes = if !self.errors.is_empty() || xml_icu.root_nodes.is_empty() {
            Vec::new()
        } else {
            self.convert_all(&xml_icu.root_nodes)
        };

        (i18n_nodes, self.errors)
    }

    fn convert_all(&mut self, nodes: &[ml::Node]) -> Vec<i18n::Node> {
        ml::visit_all(self, nodes).into_iter().flatten().collect()
    }

    fn add_error(&mut self, node: &ml::Element, message: impl Into<String>) {
        self.errors
            .push(I18nError::new(node.source_span.clone(), message));
    }
}

impl ml::Visitor for XmlToI18n {
    type Output = Option<i18n::Node>;

    fn visit_text(&mut self, text: &ml::Text) -> Option<i18n::Node> {
        Some(i18n::Node::Text(i18n::Text::new(
            text.value.clone(),
            text.source_span.clone(),
        )))
    }

    fn visit_expansion(&mut self, icu: &ml::Expansion) -> Option<i18n::Node> {
        let mut case_map = IndexMap::new();

        for icu_case in &icu.cases {
            let nodes = self.convert_all(&icu_case.expression);
            case_map.insert(
                icu_case.value.clone(),
                i18n::Node::Container(i18n::Container::new(nodes, icu.source_span.clone())),
            );
        }

        Some(i18n::Node::Icu(i18n::Icu::new(
            icu.switch_value.clone(),
            icu.expansion_type.clone(),
            case_map,
            icu.source_span.clone(),
            None,
        )))
    }

    fn visit_expansion_case(&mut self, icu_case: &ml::ExpansionCase) -> Option<i18n::Node> {
        let nodes = self.convert_all(&icu_case.expression);
        Some(i18n::Node::Container(i18n::Container::new(
            nodes,
            icu_case.source_span.clone(),
        )))
    }

    fn visit_element(&mut self, el: &ml::Element) -> Option<i18n::Node> {
        if el.name == PLACEHOLDER_TAG {
            if let Some(name_attr) = el.attr("name") {
                return Some(i18n::Node::Placeholder(i18n::Placeholder::new(
                    String::new(),
                    name_attr.value.clone(),
                    el.source_span.clone(),
                )));
            }

            self.add_error(el, format!("<{}> misses the \"name\" attribute", PLACEHOLDER_TAG));
        } else {
            self.add_error(el, "Unexpected tag");
        }
        None
    }

    fn visit_comment(&mut self, _comment: &ml::Comment) -> Option<i18n::Node> {
        None
    }

    fn visit_attribute(&mut self, _attribute: &ml::Attribute) -> Option<i18n::Node> {
        None
    }
}
