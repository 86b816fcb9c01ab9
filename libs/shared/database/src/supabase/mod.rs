pub mod appointments;
pub mod directory;

pub use appointments::SupabaseAppointmentStore;
pub use directory::SupabaseDirectory;

use reqwest::{
    Client, Response,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};
use urlencoding::encode;

use shared_config::AppConfig;

use crate::error::StoreError;

/// Postgres error code for a unique-constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Thin PostgREST client authenticated with the service key.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();

        let key = HeaderValue::from_str(&self.service_key)
            .map_err(|_| StoreError::Unavailable("service key is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.service_key))
            .map_err(|_| StoreError::Unavailable("service key is not a valid header value".to_string()))?;

        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, StoreError>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, StoreError>
    where T: DeserializeOwned {
        let response = self.send(method, path, body, extra_headers).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Sends a request whose response body is not needed.
    pub async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> Result<(), StoreError> {
        self.send(method, path, body, None).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<Response, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        error!("API error ({}): {}", status, error_text);

        let code = serde_json::from_str::<Value>(&error_text)
            .ok()
            .and_then(|v| v.get("code").and_then(Value::as_str).map(str::to_string));

        Err(match (status.as_u16(), code.as_deref()) {
            (_, Some(UNIQUE_VIOLATION)) | (409, None) => StoreError::Conflict(error_text),
            (400..=499, _) => StoreError::Rejected(format!("{}: {}", status, error_text)),
            _ => StoreError::Unavailable(format!("{}: {}", status, error_text)),
        })
    }
}

/// `imatch` filter value matching `value` anywhere in the column,
/// case-insensitively and with every character taken literally.
pub(crate) fn contains_filter(value: &str) -> String {
    format!("imatch.{}", encode(&escape_regex(value)))
}

/// `imatch` filter value matching the whole column against `value`,
/// case-insensitively and literally.
pub(crate) fn equals_filter(value: &str) -> String {
    format!("imatch.{}", encode(&format!("^{}$", escape_regex(value))))
}

fn escape_regex(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if "\\.^$|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Headers asking PostgREST to echo written rows back.
pub(crate) fn return_representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}
