use crate::i18n::error::BundleError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Options for the XMB writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BundleConfig {
    /// Attributes put on the `messagebundle` root, in order.
    pub root_attrs: IndexMap<String, String>,
    /// Example text for placeholders that have no name.
    pub default_example: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        BundleConfig {
            root_attrs: IndexMap::new(),
            default_example: "...".to_string(),
        }
    }
}

impl BundleConfig {
    pub fn from_json(content: &str) -> Result<Self, BundleError> {
        let config: BundleConfig = serde_json::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config = BundleConfig::from_json(r#"{"rootAttrs": {"class": "app"}}"#).unwrap();
        assert_eq!(config.root_attrs.get("class").map(String::as_str), Some("app"));
        assert_eq!(config.default_example, "...");
    }

    #[test]
    fn test_invalid_json_is_a_config_error() {
        let err = BundleConfig::from_json("{").unwrap_err();
        assert!(matches!(err, BundleError::Config(_)));
    }
}
