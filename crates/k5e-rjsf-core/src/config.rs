//! Configuration for fetching and conversion.

use serde::{Deserialize, Serialize};

/// Placeholder shown by an empty dropdown.
pub const DEFAULT_PLACEHOLDER: &str = "選択してください";

/// Connection settings for [`crate::K5eClient`].
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `api-token`, `base-url`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientOptions {
    /// kintone domain, e.g. `example.cybozu.com`.
    pub domain: String,
    /// API token sent as `X-Cybozu-API-Token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Overrides `https://{domain}`; used to route through a local proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Label language requested from the API. Default: `default`.
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_lang() -> String {
    "default".to_string()
}

impl ClientOptions {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            api_token: None,
            base_url: None,
            lang: default_lang(),
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Base URL requests are issued against, without a trailing slash.
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.domain),
        }
    }
}

/// Options for schema conversion.
///
/// The defaults produce the canonical mapping. Every flag below switches on
/// an additional, opt-in part of the mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConvertOptions {
    /// Emit `minLength`/`maxLength` for text and `minimum`/`maximum` for numbers.
    pub include_constraints: bool,
    /// Emit `default` from each field's configured default value.
    pub include_defaults: bool,
    /// Convert `SUBTABLE` fields into arrays of objects instead of `null`.
    pub expand_subtables: bool,
    /// Add `ui:enumNames` to choice fields.
    pub enum_names: bool,
    /// `ui:placeholder` for dropdowns.
    pub placeholder: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            include_constraints: false,
            include_defaults: false,
            expand_subtables: false,
            enum_names: false,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_serde_round_trip() {
        let opts = ConvertOptions {
            include_constraints: true,
            expand_subtables: true,
            placeholder: "Please select".to_string(),
            ..ConvertOptions::default()
        };

        let json = serde_json::to_string(&opts).unwrap();
        assert!(json.contains("\"include-constraints\""));
        assert!(json.contains("\"expand-subtables\""));

        let deserialized: ConvertOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, opts);
    }

    #[test]
    fn test_convert_options_missing_fields_use_defaults() {
        let opts: ConvertOptions = serde_json::from_str(r#"{"enum-names": true}"#).unwrap();
        assert!(opts.enum_names);
        assert!(!opts.include_defaults);
        assert_eq!(opts.placeholder, DEFAULT_PLACEHOLDER);
    }

    #[test]
    fn test_resolved_base_url() {
        let opts = ClientOptions::new("example.cybozu.com");
        assert_eq!(opts.resolved_base_url(), "https://example.cybozu.com");

        let proxied = ClientOptions {
            base_url: Some("http://localhost:3000/kintone-api/".to_string()),
            ..opts
        };
        assert_eq!(proxied.resolved_base_url(), "http://localhost:3000/kintone-api");
    }
}
