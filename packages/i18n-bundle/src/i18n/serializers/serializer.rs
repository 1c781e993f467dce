//! Serializer Module
//!
//! Base traits shared by the bundle formats: the `Serializer` seam, the
//! placeholder name mappers and the per-id result containers.

use crate::i18n::error::BundleError;
use crate::i18n::i18n_ast::{self as i18n, Message, Visitor};
use crate::i18n::serializers::xml_helper as xml;
use crate::ml_parser::{self as ml, XmlParser};
use crate::parse_util::ParseError;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

/// Base trait for i18n serializers
pub trait Serializer {
    /// Serialize messages to string format
    /// - The `id` contains the message id that the serializer is expected to use
    /// - Placeholder names are already mapped to public names using the provided mapper
    fn write(&self, messages: &[Message], locale: Option<&str>) -> Result<String, BundleError>;

    /// Load translations from serialized content
    fn load(&self, content: &str, url: &str) -> Result<I18nMessagesById, BundleError>;

    /// Compute digest for a message
    fn digest(&self, message: &Message) -> String;

    /// Creates a name mapper, see `PlaceholderMapper`
    /// Returning `None` means that no name mapping is used.
    fn create_name_mapper(&self, _message: &Message) -> Option<Box<dyn PlaceholderMapper>> {
        None
    }
}

/// A `PlaceholderMapper` converts placeholder names from internal to serialized representation
/// and back.
///
/// It should be used for serialization format that put constraints on the placeholder names.
pub trait PlaceholderMapper {
    fn to_public_name(&self, internal_name: &str) -> Option<String>;
    fn to_internal_name(&self, public_name: &str) -> Option<String>;
}

/// A simple mapper that takes a function to transform an internal name to a public name
///
/// Names are assigned in document order. When two internal names map to the
/// same public name, the later one gets a `_1`, `_2`, ... suffix.
#[derive(Debug, Clone, Default)]
pub struct SimplePlaceholderMapper {
    internal_to_public: HashMap<String, String>,
    public_to_next_id: HashMap<String, usize>,
    public_to_internal: HashMap<String, String>,
}

impl SimplePlaceholderMapper {
    pub fn new<F>(message: &Message, map_name: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        let mut mapper = SimplePlaceholderMapper::default();

        let mut visitor = MapperVisitor {
            mapper: &mut mapper,
            map_name,
        };
        i18n::visit_all(&mut visitor, &message.nodes);

        mapper
    }

    fn visit_placeholder_name<F>(&mut self, internal_name: &str, map_name: &F)
    where
        F: Fn(&str) -> String,
    {
        if internal_name.is_empty() || self.internal_to_public.contains_key(internal_name) {
            return;
        }

        let base_name = map_name(internal_name);
        let mut public_name = base_name.clone();

        // Create a new name when it has already been used
        while self.public_to_internal.contains_key(&public_name) {
            let next_id = self.public_to_next_id.entry(base_name.clone()).or_insert(1);
            public_name = format!("{}_{}", base_name, next_id);
            *next_id += 1;
        }
        self.public_to_next_id.entry(base_name).or_insert(1);

        trace!(internal_name, public_name = %public_name, "mapped placeholder name");
        self.internal_to_public
            .insert(internal_name.to_string(), public_name.clone());
        self.public_to_internal
            .insert(public_name, internal_name.to_string());
    }
}

impl PlaceholderMapper for SimplePlaceholderMapper {
    fn to_public_name(&self, internal_name: &str) -> Option<String> {
        self.internal_to_public.get(internal_name).cloned()
    }

    fn to_internal_name(&self, public_name: &str) -> Option<String> {
        self.public_to_internal.get(public_name).cloned()
    }
}

struct MapperVisitor<'a, F>
where
    F: Fn(&str) -> String,
{
    mapper: &'a mut SimplePlaceholderMapper,
    map_name: F,
}

impl<'a, F> Visitor for MapperVisitor<'a, F>
where
    F: Fn(&str) -> String,
{
    type Output = ();

    fn visit_text(&mut self, _text: &i18n::Text) {}

    fn visit_container(&mut self, container: &i18n::Container) {
        i18n::visit_all(self, &container.children);
    }

    fn visit_icu(&mut self, icu: &i18n::Icu) {
        for node in icu.cases.values() {
            node.visit(self);
        }
    }

    fn visit_tag_placeholder(&mut self, ph: &i18n::TagPlaceholder) {
        self.mapper.visit_placeholder_name(&ph.start_name, &self.map_name);
        i18n::visit_all(self, &ph.children);
        self.mapper.visit_placeholder_name(&ph.close_name, &self.map_name);
    }

    fn visit_placeholder(&mut self, ph: &i18n::Placeholder) {
        self.mapper.visit_placeholder_name(&ph.name, &self.map_name);
    }

    fn visit_icu_placeholder(&mut self, ph: &i18n::IcuPlaceholder) {
        self.mapper.visit_placeholder_name(&ph.name, &self.map_name);
    }
}

/// State of one loaded translation.
#[derive(Debug, Clone, PartialEq)]
pub enum LazyTranslation {
    /// Raw inner markup, converted on first access.
    Unresolved(String),
    Resolved(Vec<i18n::Node>),
}

/// Converts the raw markup of one translation into i18n nodes.
pub type TranslationConverter = fn(&str) -> Result<Vec<i18n::Node>, BundleError>;

/// Translations by message id, converted lazily and memoized.
///
/// A translation is converted the first time it is read. Entries whose
/// markup can not be converted only fail when they are accessed, which lets
/// a bundle carry messages from other tools.
pub struct I18nMessagesById {
    entries: RefCell<IndexMap<String, LazyTranslation>>,
    convert: TranslationConverter,
}

impl I18nMessagesById {
    pub fn new(convert: TranslationConverter) -> Self {
        I18nMessagesById {
            entries: RefCell::new(IndexMap::new()),
            convert,
        }
    }

    /// Register raw markup for `id`, replacing any previous entry.
    pub fn insert_unresolved(&mut self, id: impl Into<String>, raw: impl Into<String>) {
        self.entries
            .get_mut()
            .insert(id.into(), LazyTranslation::Unresolved(raw.into()));
    }

    /// The nodes of `id`, converting them on first access.
    ///
    /// A conversion error is returned for this id only and the entry stays
    /// unresolved.
    pub fn get(&self, id: &str) -> Result<Option<Vec<i18n::Node>>, BundleError> {
        let raw = match self.entries.borrow().get(id) {
            None => return Ok(None),
            Some(LazyTranslation::Resolved(nodes)) => return Ok(Some(nodes.clone())),
            Some(LazyTranslation::Unresolved(raw)) => raw.clone(),
        };

        let nodes = (self.convert)(&raw)?;
        debug!(id, nodes = nodes.len(), "resolved translation");
        self.entries
            .borrow_mut()
            .insert(id.to_string(), LazyTranslation::Resolved(nodes.clone()));
        Ok(Some(nodes))
    }

    /// Store resolved nodes for `id`. Resolved entries can not be overwritten.
    pub fn set(&mut self, id: &str, nodes: Vec<i18n::Node>) -> Result<(), BundleError> {
        let entries = self.entries.get_mut();
        if let Some(LazyTranslation::Resolved(_)) = entries.get(id) {
            return Err(BundleError::OverwriteResolved { id: id.to_string() });
        }
        entries.insert(id.to_string(), LazyTranslation::Resolved(nodes));
        Ok(())
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.borrow().contains_key(id)
    }

    pub fn is_resolved(&self, id: &str) -> bool {
        matches!(
            self.entries.borrow().get(id),
            Some(LazyTranslation::Resolved(_))
        )
    }

    /// Resolve every entry. All failures are reported together.
    pub fn resolve_all(&self) -> Result<IndexMap<String, Vec<i18n::Node>>, BundleError> {
        let mut resolved = IndexMap::new();
        let mut errors = Vec::new();

        for id in self.ids() {
            match self.get(&id) {
                Ok(Some(nodes)) => {
                    resolved.insert(id, nodes);
                }
                Ok(None) => {}
                Err(err) => errors.push(err.to_string()),
            }
        }

        if errors.is_empty() {
            Ok(resolved)
        } else {
            Err(BundleError::Parse(errors.join("\n")))
        }
    }
}

impl fmt::Debug for I18nMessagesById {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I18nMessagesById")
            .field("entries", &self.entries.borrow())
            .finish()
    }
}

/// Message tags of an existing bundle by id, as XML trees.
pub type XmlMessagesById = IndexMap<String, xml::Node>;

/// Result of `HtmlToXmlParser::parse`
#[derive(Debug)]
pub struct HtmlToXmlResult {
    pub xml_messages_by_id: XmlMessagesById,
    pub errors: Vec<ParseError>,
}

/// Extracts the message elements of a bundle as XML trees, so they can be
/// spliced into a new bundle verbatim.
pub struct HtmlToXmlParser {
    msg_tag: String,
    xml_messages_by_id: XmlMessagesById,
}

impl HtmlToXmlParser {
    pub fn new(msg_tag: impl Into<String>) -> Self {
        HtmlToXmlParser {
            msg_tag: msg_tag.into(),
            xml_messages_by_id: IndexMap::new(),
        }
    }

    pub fn parse(mut self, content: &str) -> HtmlToXmlResult {
        let parsed = XmlParser::new().parse(content, "", false);
        ml::visit_all(&mut self, &parsed.root_nodes);

        HtmlToXmlResult {
            xml_messages_by_id: self.xml_messages_by_id,
            errors: parsed.errors,
        }
    }

    fn to_xml_nodes(&self, nodes: &[ml::Node]) -> Vec<xml::Node> {
        nodes
            .iter()
            .filter_map(|node| match node {
                ml::Node::Element(el) => Some(self.to_xml_tag(el).into()),
                ml::Node::Text(text) => Some(xml::Node::text(text.value.clone())),
                _ => None,
            })
            .collect()
    }

    fn to_xml_tag(&self, el: &ml::Element) -> xml::Tag {
        let attrs: IndexMap<String, String> = el
            .attrs
            .iter()
            .map(|attr| (attr.name.clone(), attr.value.clone()))
            .collect();
        xml::Tag::new(el.name.clone(), attrs, self.to_xml_nodes(&el.children))
    }
}

impl ml::Visitor for HtmlToXmlParser {
    type Output = ();

    fn visit_element(&mut self, element: &ml::Element) {
        if element.name != self.msg_tag {
            ml::visit_all(self, &element.children);
            return;
        }

        if let Some(id) = element.attr("id") {
            let tag = self.to_xml_tag(element);
            self.xml_messages_by_id.insert(id.value.clone(), tag.into());
        }
    }

    fn visit_attribute(&mut self, _attribute: &ml::Attribute) {}

    fn visit_text(&mut self, _text: &ml::Text) {}

    fn visit_comment(&mut self, _comment: &ml::Comment) {}

    fn visit_expansion(&mut self, _expansion: &ml::Expansion) {}

    fn visit_expansion_case(&mut self, _expansion_case: &ml::ExpansionCase) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_util::ParseSourceSpan;

    fn text(value: &str) -> i18n::Node {
        i18n::Node::Text(i18n::Text::new(value.to_string(), ParseSourceSpan::empty("")))
    }

    fn upper(raw: &str) -> Result<Vec<i18n::Node>, BundleError> {
        if raw.contains("bad") {
            return Err(BundleError::Parse(format!("cannot convert {}", raw)));
        }
        Ok(vec![text(&raw.to_uppercase())])
    }

    #[test]
    fn test_get_memoizes_the_conversion() {
        let mut messages = I18nMessagesById::new(upper);
        messages.insert_unresolved("1", "hello");
        assert!(!messages.is_resolved("1"));
        assert_eq!(messages.get("1").unwrap(), Some(vec![text("HELLO")]));
        assert!(messages.is_resolved("1"));
        assert_eq!(messages.get("missing").unwrap(), None);
    }

    #[test]
    fn test_conversion_error_is_scoped_to_one_id() {
        let mut messages = I18nMessagesById::new(upper);
        messages.insert_unresolved("1", "bad");
        messages.insert_unresolved("2", "good");
        assert!(messages.get("1").is_err());
        assert!(!messages.is_resolved("1"));
        assert_eq!(messages.get("2").unwrap(), Some(vec![text("GOOD")]));
        let err = messages.resolve_all().unwrap_err();
        assert_eq!(err.to_string(), "cannot convert bad");
    }

    #[test]
    fn test_set_rejects_resolved_entries_only() {
        let mut messages = I18nMessagesById::new(upper);
        messages.insert_unresolved("1", "a");
        messages.set("1", vec![text("x")]).unwrap();
        assert_eq!(
            messages.set("1", vec![text("y")]),
            Err(BundleError::OverwriteResolved { id: "1".to_string() })
        );
        messages.set("2", vec![text("z")]).unwrap();
        assert_eq!(messages.ids(), vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_html_to_xml_collects_nested_messages() {
        let result = HtmlToXmlParser::new("msg")
            .parse("<messagebundle><msg id=\"a\">A &amp; <ph name=\"X\"/></msg><msg>no id</msg></messagebundle>");
        assert!(result.errors.is_empty());
        assert_eq!(result.xml_messages_by_id.len(), 1);
        assert_eq!(
            xml::serialize(&[result.xml_messages_by_id["a"].clone()]),
            "<msg id=\"a\">A &amp; <ph name=\"X\"/></msg>"
        );
    }
}
