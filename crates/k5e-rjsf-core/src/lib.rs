//! # k5e-rjsf-core
//!
//! Convert a kintone app's form field definitions into a JSON Schema plus a
//! UI Schema for [react-jsonschema-form](https://rjsf-team.github.io/react-jsonschema-form/).
//!
//! The pipeline has three stages:
//!
//! 1. **Fetch** ([`FieldFetcher`], [`K5eClient`]): one call to
//!    `/k/v1/app/form/fields.json`, normalized into a [`FieldCollection`].
//! 2. **Schema** ([`to_json_schema`]): each field type maps to a fixed
//!    JSON Schema fragment; unsupported types degrade to `{type: "null"}`.
//! 3. **UI Schema** ([`to_ui_schema`]): each field type maps to fixed
//!    widget hints; unsupported types get `{}`.
//!
//! [`FormSchemaGenerator`] runs the stages in order and stops at the first failure.
//!
//! ```no_run
//! use k5e_rjsf_core::{ClientOptions, ConvertOptions, FormSchemaGenerator};
//!
//! # async fn run() -> Result<(), k5e_rjsf_core::Error> {
//! let client = ClientOptions::new("example.cybozu.com").with_api_token("token");
//! let generator = FormSchemaGenerator::from_client_options(&client, ConvertOptions::default());
//! let form = generator.generate_form_schema(42).await?;
//! println!("{}", serde_json::to_string_pretty(&form).unwrap());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod converter;
pub mod error;
pub mod fetch;
pub mod field;
pub mod form;
pub mod schema;
pub mod ui_schema;

pub use client::K5eClient;
pub use config::{ClientOptions, ConvertOptions};
pub use converter::{RjsfConverter, SchemaConverter};
pub use error::{ConvertError, Error, ErrorCode, FetchError};
pub use fetch::{normalize_fields, FieldFetcher, RawFormFields};
pub use field::{DefaultValue, FieldCollection, FieldRecord, FieldSupport, FieldType};
pub use form::{FormSchema, FormSchemaGenerator};
pub use schema::{field_to_schema, to_json_schema, JsonSchema, SchemaType};
pub use ui_schema::{field_to_ui_hints, to_ui_schema, UiHints, UiOptions, UiSchema, Widget};
