//! Translation bundle codec.
//!
//! Writes extracted i18n messages as XMB and reads translations back from
//! XTB files.

pub mod chars;
pub mod i18n;
pub mod ml_parser;
pub mod parse_util;

pub use i18n::serializers::{
    xmb_load_to_xml, xmb_write, xmb_write_with_config, xtb_load_to_i18n, I18nMessagesById,
    PlaceholderMapper, Serializer, SimplePlaceholderMapper, Xmb, Xtb,
};
pub use i18n::{decimal_digest, BundleConfig, BundleError, Message, MessageSpan};
