//! Error types for fetching and converting form definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field::FieldType;

/// Stable, machine-readable error codes.
///
/// The serialized `snake_case` strings are part of the public contract; the
/// CLI prints them and callers may match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// The requested app does not exist.
    NotFound,
    /// The credentials were rejected.
    AuthError,
    /// Any other transport or response failure.
    ApiError,
    /// Field metadata could not be converted.
    ConversionError,
}

/// Failure while retrieving an app's field definitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("App ID {app_id} not found")]
    NotFound { app_id: u64 },

    #[error("Authentication failed. Please check your API token.")]
    Auth,

    #[error("API error: {message}")]
    Api { message: String },
}

impl FetchError {
    /// Map a free-form failure message onto the error taxonomy.
    ///
    /// Used for failures that only surface as text (e.g. a transport error
    /// whose message embeds the status line). A message mentioning `404`
    /// means the app is missing, `403` means the token was refused; anything
    /// else is passed through verbatim.
    pub fn classify(app_id: u64, message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("404") {
            FetchError::NotFound { app_id }
        } else if message.contains("403") {
            FetchError::Auth
        } else {
            FetchError::Api { message }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            FetchError::NotFound { .. } => ErrorCode::NotFound,
            FetchError::Auth => ErrorCode::AuthError,
            FetchError::Api { .. } => ErrorCode::ApiError,
        }
    }
}

/// Failure while converting field records into schema fragments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// A supported field type reached a branch with no mapping.
    #[error("Unsupported field type: {field_type} (field '{code}')")]
    UnsupportedFieldType { code: String, field_type: FieldType },

    /// A constraint or default value could not be interpreted.
    #[error("Invalid value for field '{code}': {message}")]
    InvalidValue { code: String, message: String },
}

impl ConvertError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::ConversionError
    }
}

/// Any failure surfaced by [`crate::FormSchemaGenerator::generate_form_schema`].
///
/// Wraps the stage error unchanged so callers can still tell a missing app
/// from a rejected token from a conversion problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Fetch(e) => e.code(),
            Error::Convert(e) => e.code(),
        }
    }
}
