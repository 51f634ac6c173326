//! The conversion seam used by [`crate::FormSchemaGenerator`].

use crate::config::ConvertOptions;
use crate::error::ConvertError;
use crate::field::FieldCollection;
use crate::schema::{self, JsonSchema};
use crate::ui_schema::{self, UiSchema};

/// Turns a field collection into the two halves of a form schema.
pub trait SchemaConverter: Send + Sync {
    fn to_json_schema(&self, collection: &FieldCollection) -> Result<JsonSchema, ConvertError>;

    fn to_ui_schema(&self, collection: &FieldCollection) -> Result<UiSchema, ConvertError>;
}

/// The table-driven converter for react-jsonschema-form.
#[derive(Debug, Clone, Default)]
pub struct RjsfConverter {
    options: ConvertOptions,
}

impl RjsfConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }
}

impl SchemaConverter for RjsfConverter {
    fn to_json_schema(&self, collection: &FieldCollection) -> Result<JsonSchema, ConvertError> {
        schema::to_json_schema(collection, &self.options)
    }

    fn to_ui_schema(&self, collection: &FieldCollection) -> Result<UiSchema, ConvertError> {
        ui_schema::to_ui_schema(collection, &self.options)
    }
}
