//! Orchestration: fetch → JSON Schema → UI Schema.

use serde::Serialize;

use crate::client::K5eClient;
use crate::config::{ClientOptions, ConvertOptions};
use crate::converter::{RjsfConverter, SchemaConverter};
use crate::error::Error;
use crate::fetch::FieldFetcher;
use crate::schema::JsonSchema;
use crate::ui_schema::UiSchema;

/// The schema pair handed to the form renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub json_schema: JsonSchema,
    pub ui_schema: UiSchema,
}

/// Generates a [`FormSchema`] for an app.
///
/// Holds no state between calls; one instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct FormSchemaGenerator<F, C> {
    fetcher: F,
    converter: C,
}

impl FormSchemaGenerator<K5eClient, RjsfConverter> {
    /// The REST client paired with the table-driven converter.
    pub fn from_client_options(client: &ClientOptions, convert: ConvertOptions) -> Self {
        Self::new(K5eClient::new(client), RjsfConverter::new(convert))
    }
}

impl<F: FieldFetcher, C: SchemaConverter> FormSchemaGenerator<F, C> {
    pub fn new(fetcher: F, converter: C) -> Self {
        Self { fetcher, converter }
    }

    /// Fetch the app's fields and convert them.
    ///
    /// Stops at the first failing stage and returns its error unchanged in
    /// kind; later stages are not run.
    pub async fn generate_form_schema(&self, app_id: u64) -> Result<FormSchema, Error> {
        let fields = self.fetcher.get_fields(app_id).await?;
        let json_schema = self.converter.to_json_schema(&fields)?;
        let ui_schema = self.converter.to_ui_schema(&fields)?;

        tracing::info!(
            app_id,
            revision = %fields.revision,
            fields = fields.len(),
            "generated form schema"
        );

        Ok(FormSchema {
            json_schema,
            ui_schema,
        })
    }
}
