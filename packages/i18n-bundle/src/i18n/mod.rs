//! I18n Module
//!
//! Message trees, message ids and the XMB/XTB bundle formats.

pub mod config;
pub mod digest;
pub mod error;
pub mod i18n_ast;
pub mod serializers;

pub use config::BundleConfig;
pub use digest::{compute_decimal_digest, compute_msg_id, decimal_digest, fingerprint};
pub use error::BundleError;
pub use i18n_ast::{Message, MessageSpan};
