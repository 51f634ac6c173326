//! UI Schema generation: widget choice and rendering hints per field.
//!
//! Independent of the JSON Schema; keyed off the same field-type tag.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::ConvertOptions;
use crate::error::ConvertError;
use crate::field::{FieldCollection, FieldRecord, FieldType};
use crate::schema::{expands_subtable, is_converted};

const MULTI_LINE_ROWS: u32 = 5;
const RICH_TEXT_ROWS: u32 = 8;

/// Renderer widget names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Widget {
    Textarea,
    Radio,
    Checkboxes,
    Select,
    Date,
    Time,
    File,
}

/// Contents of `ui:options`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UiOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<bool>,
}

/// UI hints for one field. An all-`None` value serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UiHints {
    #[serde(rename = "ui:widget", skip_serializing_if = "Option::is_none")]
    pub widget: Option<Widget>,
    #[serde(rename = "ui:options", skip_serializing_if = "Option::is_none")]
    pub options: Option<UiOptions>,
    #[serde(rename = "ui:placeholder", skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(rename = "ui:readonly", skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
    #[serde(rename = "ui:enumNames", skip_serializing_if = "Option::is_none")]
    pub enum_names: Option<Vec<String>>,
    /// Per-column hints of an expanded subtable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<IndexMap<String, UiHints>>,
}

impl UiHints {
    fn widget(widget: Widget) -> Self {
        Self {
            widget: Some(widget),
            ..Self::default()
        }
    }

    fn with_options(widget: Widget, options: UiOptions) -> Self {
        Self {
            options: Some(options),
            ..Self::widget(widget)
        }
    }

    fn textarea(rows: u32) -> Self {
        Self::with_options(
            Widget::Textarea,
            UiOptions {
                rows: Some(rows),
                ..UiOptions::default()
            },
        )
    }

    fn inline(widget: Widget) -> Self {
        Self::with_options(
            widget,
            UiOptions {
                inline: Some(true),
                ..UiOptions::default()
            },
        )
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// UI hints keyed by field code, in collection order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct UiSchema(pub IndexMap<String, UiHints>);

impl UiSchema {
    pub fn get(&self, code: &str) -> Option<&UiHints> {
        self.0.get(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UiHints)> {
        self.0.iter().map(|(code, hints)| (code.as_str(), hints))
    }
}

/// Generate UI hints for every field of the collection.
pub fn to_ui_schema(
    collection: &FieldCollection,
    options: &ConvertOptions,
) -> Result<UiSchema, ConvertError> {
    let mut hints = IndexMap::new();
    for (code, record) in collection.iter() {
        hints.insert(code.to_string(), ui_hints(record, options, false)?);
    }
    Ok(UiSchema(hints))
}

/// UI hints for a single field.
pub fn field_to_ui_hints(
    record: &FieldRecord,
    options: &ConvertOptions,
) -> Result<UiHints, ConvertError> {
    ui_hints(record, options, false)
}

fn ui_hints(
    record: &FieldRecord,
    options: &ConvertOptions,
    nested: bool,
) -> Result<UiHints, ConvertError> {
    if !is_converted(record, options, nested) {
        // Debug only: the JSON Schema stage already warns for this field.
        tracing::debug!(
            code = %record.code,
            field_type = %record.field_type,
            "no UI hints for unsupported field type"
        );
        return Ok(UiHints::default());
    }

    let mut hints = match record.field_type {
        FieldType::MultiLineText => UiHints::textarea(MULTI_LINE_ROWS),
        FieldType::RichText => UiHints::textarea(RICH_TEXT_ROWS),
        FieldType::RadioButton => UiHints::inline(Widget::Radio),
        FieldType::CheckBox | FieldType::MultiSelect => UiHints::inline(Widget::Checkboxes),
        FieldType::DropDown => UiHints {
            placeholder: Some(options.placeholder.clone()),
            ..UiHints::widget(Widget::Select)
        },
        FieldType::Date => UiHints::widget(Widget::Date),
        FieldType::Time => UiHints::widget(Widget::Time),
        FieldType::File => UiHints::widget(Widget::File),
        FieldType::Subtable if expands_subtable(record, options, nested) => {
            let mut columns = IndexMap::new();
            for (code, inner) in record.fields.iter().flat_map(|f| f.iter()) {
                columns.insert(code.clone(), ui_hints(inner, options, true)?);
            }
            UiHints {
                items: Some(columns),
                ..UiHints::default()
            }
        }
        // DATETIME and single-line text/number use the renderer's default widget.
        _ => UiHints::default(),
    };

    if options.enum_names && record.field_type.has_options() {
        hints.enum_names = Some(record.option_labels().to_vec());
    }

    Ok(hints)
}
