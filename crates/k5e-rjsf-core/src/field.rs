//! kintone field model: the closed set of field-type tags, the support table,
//! and the normalized field records the converters consume.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A kintone field-type tag.
///
/// Serialized with the REST API's wire tag (`SINGLE_LINE_TEXT`, `DATETIME`, ...).
/// Tags this crate does not know deserialize to [`FieldType::Unknown`], which the
/// support table marks as unsupported, so a newly introduced kintone field type
/// degrades instead of breaking the whole form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    SingleLineText,
    MultiLineText,
    RichText,
    Number,
    Calc,
    CheckBox,
    RadioButton,
    DropDown,
    MultiSelect,
    Date,
    Time,
    DateTime,
    File,
    Link,
    UserSelect,
    OrganizationSelect,
    GroupSelect,
    ReferenceTable,
    Subtable,
    Group,
    Category,
    Status,
    StatusAssignee,
    RecordNumber,
    Creator,
    CreatedTime,
    Modifier,
    UpdatedTime,
    Unknown,
}

/// Whether a field type is converted, and why not if it isn't.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSupport {
    pub supported: bool,
    pub reason: Option<&'static str>,
}

impl FieldSupport {
    const fn supported() -> Self {
        Self {
            supported: true,
            reason: None,
        }
    }

    const fn unsupported(reason: &'static str) -> Self {
        Self {
            supported: false,
            reason: Some(reason),
        }
    }
}

impl FieldType {
    /// Every known tag, in the order kintone documents them.
    pub const ALL: [FieldType; 28] = [
        FieldType::SingleLineText,
        FieldType::MultiLineText,
        FieldType::RichText,
        FieldType::Number,
        FieldType::Calc,
        FieldType::CheckBox,
        FieldType::RadioButton,
        FieldType::DropDown,
        FieldType::MultiSelect,
        FieldType::Date,
        FieldType::Time,
        FieldType::DateTime,
        FieldType::File,
        FieldType::Link,
        FieldType::UserSelect,
        FieldType::OrganizationSelect,
        FieldType::GroupSelect,
        FieldType::ReferenceTable,
        FieldType::Subtable,
        FieldType::Group,
        FieldType::Category,
        FieldType::Status,
        FieldType::StatusAssignee,
        FieldType::RecordNumber,
        FieldType::Creator,
        FieldType::CreatedTime,
        FieldType::Modifier,
        FieldType::UpdatedTime,
    ];

    /// The REST API wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::SingleLineText => "SINGLE_LINE_TEXT",
            FieldType::MultiLineText => "MULTI_LINE_TEXT",
            FieldType::RichText => "RICH_TEXT",
            FieldType::Number => "NUMBER",
            FieldType::Calc => "CALC",
            FieldType::CheckBox => "CHECK_BOX",
            FieldType::RadioButton => "RADIO_BUTTON",
            FieldType::DropDown => "DROP_DOWN",
            FieldType::MultiSelect => "MULTI_SELECT",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::DateTime => "DATETIME",
            FieldType::File => "FILE",
            FieldType::Link => "LINK",
            FieldType::UserSelect => "USER_SELECT",
            FieldType::OrganizationSelect => "ORGANIZATION_SELECT",
            FieldType::GroupSelect => "GROUP_SELECT",
            FieldType::ReferenceTable => "REFERENCE_TABLE",
            FieldType::Subtable => "SUBTABLE",
            FieldType::Group => "GROUP",
            FieldType::Category => "CATEGORY",
            FieldType::Status => "STATUS",
            FieldType::StatusAssignee => "STATUS_ASSIGNEE",
            FieldType::RecordNumber => "RECORD_NUMBER",
            FieldType::Creator => "CREATOR",
            FieldType::CreatedTime => "CREATED_TIME",
            FieldType::Modifier => "MODIFIER",
            FieldType::UpdatedTime => "UPDATED_TIME",
            FieldType::Unknown => "UNKNOWN",
        }
    }

    /// Parse a wire tag. Unrecognized tags map to [`FieldType::Unknown`].
    pub fn from_tag(tag: &str) -> Self {
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == tag)
            .unwrap_or(FieldType::Unknown)
    }

    /// Look up this type in the support table.
    pub fn support(&self) -> FieldSupport {
        match self {
            FieldType::SingleLineText
            | FieldType::MultiLineText
            | FieldType::RichText
            | FieldType::Number
            | FieldType::CheckBox
            | FieldType::RadioButton
            | FieldType::DropDown
            | FieldType::MultiSelect
            | FieldType::Date
            | FieldType::Time
            | FieldType::DateTime
            | FieldType::File => FieldSupport::supported(),
            FieldType::Group | FieldType::Subtable => {
                FieldSupport::unsupported("Complex nested structure")
            }
            FieldType::Calc => FieldSupport::unsupported("Calculation-based field"),
            FieldType::Category
            | FieldType::CreatedTime
            | FieldType::Creator
            | FieldType::Modifier
            | FieldType::RecordNumber
            | FieldType::UpdatedTime => FieldSupport::unsupported("System field"),
            FieldType::GroupSelect | FieldType::OrganizationSelect | FieldType::UserSelect => {
                FieldSupport::unsupported("Organization-related field")
            }
            FieldType::ReferenceTable | FieldType::Link => {
                FieldSupport::unsupported("Complex data structure")
            }
            FieldType::Status | FieldType::StatusAssignee => {
                FieldSupport::unsupported("Process management field")
            }
            FieldType::Unknown => FieldSupport::unsupported("Unrecognized field type"),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.support().supported
    }

    /// Whether fields of this type carry an option list.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            FieldType::CheckBox
                | FieldType::RadioButton
                | FieldType::DropDown
                | FieldType::MultiSelect
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(FieldType::from_tag(&tag))
    }
}

/// A field's configured default value.
///
/// Text-like and single-choice fields deliver a string, multi-choice fields a
/// list of option labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

impl DefaultValue {
    /// True for `""` and `[]`, which kintone sends when no default is set.
    pub fn is_empty(&self) -> bool {
        match self {
            DefaultValue::Text(s) => s.is_empty(),
            DefaultValue::Number(_) => false,
            DefaultValue::List(items) => items.is_empty(),
        }
    }
}

/// One normalized field definition.
///
/// Constraint attributes are kept as the decimal strings the REST API sends;
/// the schema converter parses them only when constraints are requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub code: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_label: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    /// Option labels in display order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
    /// Inner fields of a `SUBTABLE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<IndexMap<String, FieldRecord>>,
}

impl FieldRecord {
    pub fn new(field_type: FieldType, code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field_type,
            code: code.into(),
            label: label.into(),
            required: None,
            no_label: None,
            default_value: None,
            options: None,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            fields: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_default(mut self, value: DefaultValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    /// Option labels, or an empty slice when the field has none.
    pub fn option_labels(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }
}

/// An app's form definition at one revision.
///
/// `properties` is keyed by field code; [`FieldCollection::insert`] keys each
/// record by its own code so the two never disagree. Deserialization rejects
/// a key that differs from its record's `code`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "CollectionRepr")]
pub struct FieldCollection {
    pub properties: IndexMap<String, FieldRecord>,
    pub revision: String,
}

#[derive(Deserialize)]
struct CollectionRepr {
    properties: IndexMap<String, FieldRecord>,
    revision: String,
}

impl TryFrom<CollectionRepr> for FieldCollection {
    type Error = String;

    fn try_from(repr: CollectionRepr) -> Result<Self, Self::Error> {
        if let Some((key, record)) = repr.properties.iter().find(|(k, r)| **k != r.code) {
            return Err(format!(
                "field key '{key}' does not match its code '{}'",
                record.code
            ));
        }
        Ok(Self {
            properties: repr.properties,
            revision: repr.revision,
        })
    }
}

impl FieldCollection {
    pub fn new(revision: impl Into<String>) -> Self {
        Self {
            properties: IndexMap::new(),
            revision: revision.into(),
        }
    }

    pub fn insert(&mut self, record: FieldRecord) {
        self.properties.insert(record.code.clone(), record);
    }

    pub fn with_field(mut self, record: FieldRecord) -> Self {
        self.insert(record);
        self
    }

    pub fn get(&self, code: &str) -> Option<&FieldRecord> {
        self.properties.get(code)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRecord)> {
        self.properties
            .iter()
            .map(|(code, record)| (code.as_str(), record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tags_round_trip() {
        for t in FieldType::ALL {
            assert_eq!(FieldType::from_tag(t.as_str()), t);
        }
        assert_eq!(FieldType::from_tag("SPACER"), FieldType::Unknown);
    }

    #[test]
    fn test_support_table() {
        let supported: Vec<_> = FieldType::ALL
            .iter()
            .filter(|t| t.is_supported())
            .map(|t| t.as_str())
            .collect();
        assert_eq!(
            supported,
            vec![
                "SINGLE_LINE_TEXT",
                "MULTI_LINE_TEXT",
                "RICH_TEXT",
                "NUMBER",
                "CHECK_BOX",
                "RADIO_BUTTON",
                "DROP_DOWN",
                "MULTI_SELECT",
                "DATE",
                "TIME",
                "DATETIME",
                "FILE",
            ]
        );

        for t in FieldType::ALL.iter().filter(|t| !t.is_supported()) {
            assert!(t.support().reason.is_some(), "{t} should carry a reason");
        }
        assert_eq!(FieldType::Calc.support().reason, Some("Calculation-based field"));
        assert!(!FieldType::Unknown.is_supported());
    }

    #[test]
    fn test_collection_deserialization_checks_codes() {
        let collection = FieldCollection::new("2")
            .with_field(FieldRecord::new(FieldType::Number, "qty", "Qty"));
        let json = serde_json::to_value(&collection).unwrap();
        let back: FieldCollection = serde_json::from_value(json).unwrap();
        assert_eq!(back, collection);

        let err = serde_json::from_value::<FieldCollection>(serde_json::json!({
            "properties": {
                "qty": { "type": "NUMBER", "code": "amount", "label": "Qty" }
            },
            "revision": "2"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("does not match its code 'amount'"));
    }

    #[test]
    fn test_record_deserializes_camel_case() {
        let record: FieldRecord = serde_json::from_value(serde_json::json!({
            "type": "DROP_DOWN",
            "code": "dd",
            "label": "Dropdown",
            "noLabel": true,
            "defaultValue": "A",
            "options": ["A", "B"]
        }))
        .unwrap();

        assert_eq!(record.field_type, FieldType::DropDown);
        assert_eq!(record.no_label, Some(true));
        assert_eq!(record.default_value, Some(DefaultValue::Text("A".into())));
        assert_eq!(record.option_labels(), ["A", "B"]);
        assert!(!record.is_required());
    }

    #[test]
    fn test_collection_keys_by_code() {
        let collection = FieldCollection::new("3")
            .with_field(FieldRecord::new(FieldType::Number, "b", "B"))
            .with_field(FieldRecord::new(FieldType::Date, "a", "A"));

        let codes: Vec<_> = collection.iter().map(|(code, _)| code).collect();
        assert_eq!(codes, vec!["b", "a"]);
        assert_eq!(collection.get("a").map(|r| r.field_type), Some(FieldType::Date));
    }
}
