//! JSON Schema generation.
//!
//! The mapping is a single exhaustive `match` over [`FieldType`]:
//!
//! | Field type                                     | Schema                                               |
//! |------------------------------------------------|------------------------------------------------------|
//! | `SINGLE_LINE_TEXT`, `MULTI_LINE_TEXT`, `RICH_TEXT` | `{type: string}`                                 |
//! | `NUMBER`                                       | `{type: number}`                                     |
//! | `CHECK_BOX`, `MULTI_SELECT`                    | `{type: array, uniqueItems, items: {type: string, enum}}` |
//! | `RADIO_BUTTON`, `DROP_DOWN`                    | `{type: string, enum}`                               |
//! | `DATE` / `TIME` / `DATETIME`                   | `{type: string, format: date / time / date-time}`    |
//! | `FILE`                                         | `{type: string, format: data-url}`                   |
//! | anything the support table rejects             | `{type: null}`                                       |
//!
//! Every converted field also carries its label as `title`.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Number, Value};

use crate::config::ConvertOptions;
use crate::error::ConvertError;
use crate::field::{DefaultValue, FieldCollection, FieldRecord, FieldType};

/// JSON Schema primitive type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    #[default]
    Null,
}

/// The subset of JSON Schema the form renderer needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

impl JsonSchema {
    /// `{type: "null"}`, emitted for field types the form cannot render.
    pub fn null() -> Self {
        Self::default()
    }

    fn of(schema_type: SchemaType, title: &str) -> Self {
        Self {
            schema_type,
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    fn formatted(title: &str, format: &str) -> Self {
        Self {
            format: Some(format.to_string()),
            ..Self::of(SchemaType::String, title)
        }
    }

    fn string_enum(options: &[String]) -> Self {
        Self {
            schema_type: SchemaType::String,
            enum_values: Some(options.to_vec()),
            ..Self::default()
        }
    }
}

/// Convert a whole collection into the root object schema.
///
/// `required` lists, in collection order, the codes of fields marked required.
/// The first field that fails to convert aborts the conversion; no partial
/// schema is returned.
pub fn to_json_schema(
    collection: &FieldCollection,
    options: &ConvertOptions,
) -> Result<JsonSchema, ConvertError> {
    let schema = object_schema(collection.iter(), options, false)?;
    tracing::debug!(
        fields = collection.len(),
        revision = %collection.revision,
        "converted collection to JSON Schema"
    );
    Ok(schema)
}

/// Convert one field record into its property schema.
pub fn field_to_schema(
    record: &FieldRecord,
    options: &ConvertOptions,
) -> Result<JsonSchema, ConvertError> {
    convert_field(record, options, false)
}

fn object_schema<'a>(
    fields: impl Iterator<Item = (&'a str, &'a FieldRecord)>,
    options: &ConvertOptions,
    nested: bool,
) -> Result<JsonSchema, ConvertError> {
    let mut required = Vec::new();
    let mut properties = IndexMap::new();

    for (code, record) in fields {
        if record.is_required() {
            required.push(code.to_string());
        }
        properties.insert(code.to_string(), convert_field(record, options, nested)?);
    }

    Ok(JsonSchema {
        schema_type: SchemaType::Object,
        required: Some(required),
        properties: Some(properties),
        ..JsonSchema::default()
    })
}

/// Whether `record` is converted, either through the support table or an
/// enabled extension. Shared with the UI-schema generator so both stages
/// always degrade the same fields.
pub(crate) fn is_converted(record: &FieldRecord, options: &ConvertOptions, nested: bool) -> bool {
    record.field_type.is_supported() || expands_subtable(record, options, nested)
}

pub(crate) fn expands_subtable(record: &FieldRecord, options: &ConvertOptions, nested: bool) -> bool {
    record.field_type == FieldType::Subtable && options.expand_subtables && !nested
}

fn convert_field(
    record: &FieldRecord,
    options: &ConvertOptions,
    nested: bool,
) -> Result<JsonSchema, ConvertError> {
    if !is_converted(record, options, nested) {
        tracing::warn!(
            code = %record.code,
            field_type = %record.field_type,
            reason = record.field_type.support().reason.unwrap_or_default(),
            "Skipping unsupported field type"
        );
        return Ok(JsonSchema::null());
    }

    let label = record.label.as_str();
    let mut schema = match record.field_type {
        FieldType::SingleLineText | FieldType::MultiLineText | FieldType::RichText => {
            JsonSchema::of(SchemaType::String, label)
        }
        FieldType::Number => JsonSchema::of(SchemaType::Number, label),
        FieldType::CheckBox | FieldType::MultiSelect => JsonSchema {
            unique_items: Some(true),
            items: Some(Box::new(JsonSchema::string_enum(record.option_labels()))),
            ..JsonSchema::of(SchemaType::Array, label)
        },
        FieldType::RadioButton | FieldType::DropDown => JsonSchema {
            enum_values: Some(record.option_labels().to_vec()),
            ..JsonSchema::of(SchemaType::String, label)
        },
        FieldType::Date => JsonSchema::formatted(label, "date"),
        FieldType::Time => JsonSchema::formatted(label, "time"),
        FieldType::DateTime => JsonSchema::formatted(label, "date-time"),
        FieldType::File => JsonSchema::formatted(label, "data-url"),
        FieldType::Subtable => {
            let inner = record
                .fields
                .as_ref()
                .map(|f| f.iter().map(|(code, inner)| (code.as_str(), inner)));
            let items = object_schema(inner.into_iter().flatten(), options, true)?;
            JsonSchema {
                items: Some(Box::new(items)),
                ..JsonSchema::of(SchemaType::Array, label)
            }
        }
        other => {
            return Err(ConvertError::UnsupportedFieldType {
                code: record.code.clone(),
                field_type: other,
            })
        }
    };

    if options.include_constraints {
        apply_constraints(&mut schema, record)?;
    }
    if options.include_defaults {
        apply_default(&mut schema, record)?;
    }

    Ok(schema)
}

fn apply_constraints(schema: &mut JsonSchema, record: &FieldRecord) -> Result<(), ConvertError> {
    match record.field_type {
        FieldType::SingleLineText | FieldType::MultiLineText => {
            schema.min_length = parse_length(record, record.min_length.as_deref())?;
            schema.max_length = parse_length(record, record.max_length.as_deref())?;
        }
        FieldType::Number => {
            schema.minimum = parse_number(record, record.min_value.as_deref())?;
            schema.maximum = parse_number(record, record.max_value.as_deref())?;
        }
        _ => {}
    }
    Ok(())
}

fn apply_default(schema: &mut JsonSchema, record: &FieldRecord) -> Result<(), ConvertError> {
    let Some(default) = record.default_value.as_ref().filter(|d| !d.is_empty()) else {
        return Ok(());
    };

    let value = match (schema.schema_type, default) {
        (SchemaType::Array, DefaultValue::List(items)) => Value::from(items.clone()),
        (SchemaType::Array, DefaultValue::Text(s)) => Value::from(vec![s.clone()]),
        (SchemaType::Number, DefaultValue::Text(s)) => match parse_number(record, Some(s.as_str()))? {
            Some(n) => Value::Number(n),
            None => return Ok(()),
        },
        (SchemaType::Number, DefaultValue::Number(n)) => float_value(record, *n)?,
        (SchemaType::String, DefaultValue::Text(s)) => Value::String(s.clone()),
        (SchemaType::String, DefaultValue::Number(n)) => Value::String(n.to_string()),
        (_, DefaultValue::List(_)) => {
            return Err(invalid(record, "a list default needs a multi-choice field"))
        }
        _ => return Ok(()),
    };
    schema.default = Some(value);
    Ok(())
}

fn parse_length(record: &FieldRecord, raw: Option<&str>) -> Result<Option<u64>, ConvertError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|_| invalid(record, &format!("'{s}' is not a valid length"))),
    }
}

fn parse_number(record: &FieldRecord, raw: Option<&str>) -> Result<Option<Number>, ConvertError> {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(i) = s.parse::<i64>() {
        return Ok(Some(Number::from(i)));
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Some)
        .ok_or_else(|| invalid(record, &format!("'{s}' is not a valid number")))
}

fn float_value(record: &FieldRecord, n: f64) -> Result<Value, ConvertError> {
    Number::from_f64(n)
        .map(Value::Number)
        .ok_or_else(|| invalid(record, "default is not a finite number"))
}

fn invalid(record: &FieldRecord, message: &str) -> ConvertError {
    ConvertError::InvalidValue {
        code: record.code.clone(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn convert(record: &FieldRecord) -> Value {
        let schema = field_to_schema(record, &ConvertOptions::default()).unwrap();
        serde_json::to_value(schema).unwrap()
    }

    fn with_opts(record: &FieldRecord, options: ConvertOptions) -> Result<Value, ConvertError> {
        field_to_schema(record, &options).map(|s| serde_json::to_value(s).unwrap())
    }

    #[test]
    fn test_text_types() {
        for t in [
            FieldType::SingleLineText,
            FieldType::MultiLineText,
            FieldType::RichText,
        ] {
            let out = convert(&FieldRecord::new(t, "t", "Text"));
            assert_eq!(out, json!({ "type": "string", "title": "Text" }), "{t}");
        }
    }

    #[test]
    fn test_number() {
        let out = convert(&FieldRecord::new(FieldType::Number, "n", "Amount"));
        assert_eq!(out, json!({ "type": "number", "title": "Amount" }));
    }

    #[test]
    fn test_multi_choice_types() {
        for t in [FieldType::CheckBox, FieldType::MultiSelect] {
            let record = FieldRecord::new(t, "c", "Pick").with_options(["A", "B"]);
            assert_eq!(
                convert(&record),
                json!({
                    "type": "array",
                    "title": "Pick",
                    "uniqueItems": true,
                    "items": { "type": "string", "enum": ["A", "B"] }
                }),
                "{t}"
            );
        }
    }

    #[test]
    fn test_single_choice_types() {
        for t in [FieldType::RadioButton, FieldType::DropDown] {
            let record = FieldRecord::new(t, "r", "One").with_options(["O1", "O2", "O3"]);
            assert_eq!(
                convert(&record),
                json!({ "type": "string", "title": "One", "enum": ["O1", "O2", "O3"] }),
                "{t}"
            );
        }
    }

    #[test]
    fn test_choice_without_options_has_empty_enum() {
        let out = convert(&FieldRecord::new(FieldType::DropDown, "d", "D"));
        assert_eq!(out["enum"], json!([]));
    }

    #[test]
    fn test_formatted_strings() {
        let cases = [
            (FieldType::Date, "date"),
            (FieldType::Time, "time"),
            (FieldType::DateTime, "date-time"),
            (FieldType::File, "data-url"),
        ];
        for (t, format) in cases {
            let out = convert(&FieldRecord::new(t, "x", "X"));
            assert_eq!(out, json!({ "type": "string", "title": "X", "format": format }));
        }
    }

    #[test]
    fn test_unsupported_types_degrade_to_null() {
        for t in FieldType::ALL.iter().filter(|t| !t.is_supported()) {
            let record = FieldRecord::new(*t, "sys", "System").required(true);
            assert_eq!(convert(&record), json!({ "type": "null" }), "{t}");
        }
        assert_eq!(
            convert(&FieldRecord::new(FieldType::Unknown, "u", "U")),
            json!({ "type": "null" })
        );
    }

    #[test]
    fn test_empty_collection() {
        let schema = to_json_schema(&FieldCollection::new("1"), &ConvertOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_value(schema).unwrap(),
            json!({ "type": "object", "required": [], "properties": {} })
        );
    }

    #[test]
    fn test_required_in_collection_order() {
        let collection = FieldCollection::new("1")
            .with_field(FieldRecord::new(FieldType::Number, "z", "Z").required(true))
            .with_field(FieldRecord::new(FieldType::Number, "a", "A").required(false))
            .with_field(FieldRecord::new(FieldType::Number, "m", "M").required(true))
            .with_field(FieldRecord::new(FieldType::Creator, "c", "C").required(true));

        let schema = to_json_schema(&collection, &ConvertOptions::default()).unwrap();
        assert_eq!(
            schema.required,
            Some(vec!["z".to_string(), "m".to_string(), "c".to_string()])
        );
        let keys: Vec<_> = schema
            .properties
            .as_ref()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["z", "a", "m", "c"]);
    }

    #[test]
    fn test_constraints_extension() {
        let options = ConvertOptions {
            include_constraints: true,
            ..ConvertOptions::default()
        };

        let mut text = FieldRecord::new(FieldType::SingleLineText, "t", "T");
        text.min_length = Some("2".into());
        text.max_length = Some("64".into());
        let out = with_opts(&text, options.clone()).unwrap();
        assert_eq!(out["minLength"], json!(2));
        assert_eq!(out["maxLength"], json!(64));

        let mut number = FieldRecord::new(FieldType::Number, "n", "N");
        number.min_value = Some("-10".into());
        number.max_value = Some("99.5".into());
        let out = with_opts(&number, options.clone()).unwrap();
        assert_eq!(out["minimum"], json!(-10));
        assert_eq!(out["maximum"], json!(99.5));

        // Off by default.
        assert!(convert(&number).get("minimum").is_none());

        number.max_value = Some("lots".into());
        assert!(matches!(
            with_opts(&number, options),
            Err(ConvertError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_defaults_extension() {
        let options = ConvertOptions {
            include_defaults: true,
            ..ConvertOptions::default()
        };

        let number = FieldRecord::new(FieldType::Number, "n", "N")
            .with_default(DefaultValue::Text("42".into()));
        assert_eq!(with_opts(&number, options.clone()).unwrap()["default"], json!(42));

        let multi = FieldRecord::new(FieldType::MultiSelect, "m", "M")
            .with_options(["a", "b", "c"])
            .with_default(DefaultValue::List(vec!["a".into(), "c".into()]));
        assert_eq!(
            with_opts(&multi, options.clone()).unwrap()["default"],
            json!(["a", "c"])
        );

        let empty = FieldRecord::new(FieldType::SingleLineText, "t", "T")
            .with_default(DefaultValue::Text(String::new()));
        assert!(with_opts(&empty, options.clone()).unwrap().get("default").is_none());

        let bad = FieldRecord::new(FieldType::Number, "n", "N")
            .with_default(DefaultValue::Text("abc".into()));
        assert_eq!(
            with_opts(&bad, options).unwrap_err(),
            ConvertError::InvalidValue {
                code: "n".into(),
                message: "'abc' is not a valid number".into()
            }
        );
    }

    #[test]
    fn test_subtable_expansion() {
        let mut inner = IndexMap::new();
        inner.insert(
            "item".to_string(),
            FieldRecord::new(FieldType::SingleLineText, "item", "Item").required(true),
        );
        inner.insert(
            "qty".to_string(),
            FieldRecord::new(FieldType::Number, "qty", "Qty"),
        );
        inner.insert(
            "who".to_string(),
            FieldRecord::new(FieldType::UserSelect, "who", "Who"),
        );
        let mut table = FieldRecord::new(FieldType::Subtable, "lines", "Lines");
        table.fields = Some(inner);

        // Canonical path: unsupported.
        assert_eq!(convert(&table), json!({ "type": "null" }));

        let options = ConvertOptions {
            expand_subtables: true,
            ..ConvertOptions::default()
        };
        assert_eq!(
            with_opts(&table, options).unwrap(),
            json!({
                "type": "array",
                "title": "Lines",
                "items": {
                    "type": "object",
                    "required": ["item"],
                    "properties": {
                        "item": { "type": "string", "title": "Item" },
                        "qty": { "type": "number", "title": "Qty" },
                        "who": { "type": "null" }
                    }
                }
            })
        );
    }
}
