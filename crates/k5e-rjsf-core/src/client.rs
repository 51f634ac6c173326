//! HTTP implementation of [`FieldFetcher`] against the kintone REST API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::ClientOptions;
use crate::error::FetchError;
use crate::fetch::{normalize_fields, FieldFetcher, RawFormFields};
use crate::field::FieldCollection;

/// Header carrying the app-scoped API token.
pub const API_TOKEN_HEADER: &str = "X-Cybozu-API-Token";

/// Path of the form-fields endpoint, relative to the base URL.
pub const FORM_FIELDS_PATH: &str = "/k/v1/app/form/fields.json";

/// kintone REST client. One request per [`FieldFetcher::get_fields`] call, no retries.
#[derive(Debug, Clone)]
pub struct K5eClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    lang: String,
}

/// Error body returned by kintone, e.g. `{"code": "GAIA_AP01", "message": "..."}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl K5eClient {
    pub fn new(options: &ClientOptions) -> Self {
        Self::with_http_client(reqwest::Client::new(), options)
    }

    /// Build a client around an existing `reqwest::Client` (shared pools,
    /// custom timeouts, proxies).
    pub fn with_http_client(http: reqwest::Client, options: &ClientOptions) -> Self {
        Self {
            http,
            base_url: options.resolved_base_url(),
            api_token: options.api_token.clone(),
            lang: options.lang.clone(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, FORM_FIELDS_PATH)
    }
}

#[async_trait]
impl FieldFetcher for K5eClient {
    async fn get_fields(&self, app_id: u64) -> Result<FieldCollection, FetchError> {
        if app_id == 0 {
            return Err(FetchError::Api {
                message: "App ID must be a positive integer".to_string(),
            });
        }

        let url = self.endpoint();
        tracing::debug!(app_id, url = %url, lang = %self.lang, "fetching form fields");

        let mut request = self
            .http
            .get(&url)
            .query(&[("app", app_id.to_string()), ("lang", self.lang.clone())]);
        if let Some(token) = &self.api_token {
            request = request.header(API_TOKEN_HEADER, token);
        }

        // Transport failures carry the request URL, which includes the app id;
        // only the status code decides NotFound and Auth.
        let response = request.send().await.map_err(|e| {
            tracing::error!(app_id, error = %e, "error fetching fields");
            FetchError::Api {
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = status_error(app_id, status, &body);
            tracing::error!(app_id, status = status.as_u16(), error = %err, "error fetching fields");
            return Err(err);
        }

        let raw: RawFormFields = response
            .json()
            .await
            .map_err(|e| FetchError::Api {
                message: e.to_string(),
            })?;

        normalize_fields(raw, app_id)
    }
}

/// Map a non-success status onto the error taxonomy.
fn status_error(app_id: u64, status: StatusCode, body: &str) -> FetchError {
    match status {
        StatusCode::NOT_FOUND => FetchError::NotFound { app_id },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Auth,
        _ => {
            let message = match serde_json::from_str::<ApiErrorBody>(body) {
                Ok(ApiErrorBody {
                    code: Some(code),
                    message,
                }) => format!("HTTP {}: [{code}] {message}", status.as_u16()),
                Ok(ApiErrorBody { code: None, message }) => {
                    format!("HTTP {}: {message}", status.as_u16())
                }
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            FetchError::Api { message }
        }
    }
}
