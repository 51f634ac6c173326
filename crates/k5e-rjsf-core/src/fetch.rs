//! Field fetching: the [`FieldFetcher`] seam and normalization of the raw
//! form-fields payload into [`FieldCollection`]s.
//!
//! Normalization is kept separate from transport so that both the HTTP
//! client and offline callers (the CLI's `convert` command, tests) share
//! exactly one definition of how option lists are ordered and which
//! attributes survive.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::field::{DefaultValue, FieldCollection, FieldRecord, FieldType};

/// Source of an app's field definitions.
#[async_trait]
pub trait FieldFetcher: Send + Sync {
    /// Fetch the field definitions of `app_id`. Issues at most one request.
    async fn get_fields(&self, app_id: u64) -> Result<FieldCollection, FetchError>;
}

/// Body of `GET /k/v1/app/form/fields.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFormFields {
    pub properties: IndexMap<String, RawField>,
    #[serde(default)]
    pub revision: String,
}

/// One field descriptor as delivered by the REST API.
///
/// Only the attributes the converters use are captured; everything else in
/// the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub no_label: Option<bool>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub options: Option<IndexMap<String, RawOption>>,
    #[serde(default)]
    pub min_length: Option<Value>,
    #[serde(default)]
    pub max_length: Option<Value>,
    #[serde(default)]
    pub min_value: Option<Value>,
    #[serde(default)]
    pub max_value: Option<Value>,
    #[serde(default)]
    pub fields: Option<IndexMap<String, RawField>>,
}

/// A choice option. kintone sends `index` as a decimal string.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOption {
    pub label: String,
    #[serde(default)]
    pub index: Option<Value>,
}

/// Normalize a raw form-fields payload.
///
/// Choice options are sorted by ascending `index` and flattened to their
/// labels; option keys are discarded. A descriptor whose `code` disagrees
/// with its map key, or an option with a non-numeric index, makes the whole
/// response malformed.
pub fn normalize_fields(raw: RawFormFields, app_id: u64) -> Result<FieldCollection, FetchError> {
    let mut collection = FieldCollection::new(raw.revision);
    for (key, field) in raw.properties {
        collection.insert(normalize_field(&key, field, app_id)?);
    }
    tracing::debug!(
        app_id,
        fields = collection.len(),
        revision = %collection.revision,
        "normalized form fields"
    );
    Ok(collection)
}

fn normalize_field(key: &str, raw: RawField, app_id: u64) -> Result<FieldRecord, FetchError> {
    let code = if raw.code.is_empty() {
        key.to_string()
    } else if raw.code != key {
        return Err(malformed(format!(
            "field key '{key}' does not match its code '{}'",
            raw.code
        )));
    } else {
        raw.code
    };

    if raw.field_type == FieldType::Unknown {
        tracing::warn!(app_id, code = %code, "unrecognized field type");
    }

    let options = match raw.options {
        Some(options) if raw.field_type.has_options() => Some(sort_options(&code, options)?),
        _ => None,
    };

    let fields = match raw.fields {
        Some(inner) if raw.field_type == FieldType::Subtable => {
            let mut normalized = IndexMap::new();
            for (inner_key, inner_field) in inner {
                let record = normalize_field(&inner_key, inner_field, app_id)?;
                normalized.insert(inner_key, record);
            }
            Some(normalized)
        }
        _ => None,
    };

    Ok(FieldRecord {
        field_type: raw.field_type,
        label: raw.label,
        required: raw.required,
        no_label: raw.no_label,
        default_value: raw.default_value.and_then(to_default_value),
        options,
        min_length: raw.min_length.and_then(to_decimal_string),
        max_length: raw.max_length.and_then(to_decimal_string),
        min_value: raw.min_value.and_then(to_decimal_string),
        max_value: raw.max_value.and_then(to_decimal_string),
        fields,
        code,
    })
}

fn sort_options(
    code: &str,
    options: IndexMap<String, RawOption>,
) -> Result<Vec<String>, FetchError> {
    let mut indexed = Vec::with_capacity(options.len());
    for (position, (key, option)) in options.into_iter().enumerate() {
        let index = match &option.index {
            None | Some(Value::Null) => position as i64,
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| bad_index(code, &key, n))?,
            Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| bad_index(code, &key, s))?,
            Some(other) => return Err(bad_index(code, &key, other)),
        };
        indexed.push((index, option.label));
    }
    // Stable: equal indices keep source order.
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}

fn to_default_value(value: Value) -> Option<DefaultValue> {
    match value {
        Value::String(s) => Some(DefaultValue::Text(s)),
        Value::Number(n) => n.as_f64().map(DefaultValue::Number),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(DefaultValue::List),
        // User/organization defaults are entity objects; nothing the schema can express.
        _ => None,
    }
}

fn to_decimal_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn bad_index(code: &str, key: &str, index: impl std::fmt::Display) -> FetchError {
    malformed(format!(
        "option '{key}' of field '{code}' has a non-numeric index '{index}'"
    ))
}

fn malformed(detail: String) -> FetchError {
    FetchError::Api {
        message: format!("Malformed response: {detail}"),
    }
}
