//! I18n Serializers Module
//!
//! Bundle formats and the XML tree they are written with.

pub mod serializer;
pub mod xml_helper;
pub mod xmb;
pub mod xtb;

pub use serializer::{
    HtmlToXmlParser, I18nMessagesById, LazyTranslation, PlaceholderMapper, Serializer,
    SimplePlaceholderMapper, XmlMessagesById,
};
pub use xmb::{to_public_name, xmb_load_to_xml, xmb_mapper, xmb_write, xmb_write_with_config, Xmb};
pub use xtb::{xtb_load_to_i18n, xtb_mapper, Xtb};
