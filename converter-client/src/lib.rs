//! # Converter Client SDK
//!
//! A typed Rust client for the Currency Converter API.

use converter_types::{ConversionResponse, ConvertRequest, USER_ID_HEADER};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("A user id is required for this call")]
    MissingUserId,
}

/// Currency Converter API client.
pub struct ConverterClient {
    base_url: String,
    user_id: Option<String>,
    http: Client,
}

impl ConverterClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: None,
            http: Client::new(),
        }
    }

    /// Sets the identity sent in the `user-id` header.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/healthcheck", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Converts `value` of `source` into `target` on behalf of the configured user.
    pub async fn convert(
        &self,
        source: &str,
        value: f64,
        target: &str,
    ) -> Result<ConversionResponse, ClientError> {
        let user_id = self.user_id.as_deref().ok_or(ClientError::MissingUserId)?;
        let req = ConvertRequest {
            source_currency_code: source.to_string(),
            source_currency_value: value,
            target_currency_code: target.to_string(),
        };

        let resp = self
            .http
            .post(format!("{}/currencyConverter/v1/convert", self.base_url))
            .header(USER_ID_HEADER, user_id)
            .json(&req)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Lists conversions, all of them or only `user_id`'s.
    pub async fn list_conversions(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<ConversionResponse>, ClientError> {
        let mut req = self
            .http
            .get(format!("{}/currencyConverter/v1/conversions", self.base_url));
        if let Some(user_id) = user_id {
            req = req.query(&[("user_id", user_id)]);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
