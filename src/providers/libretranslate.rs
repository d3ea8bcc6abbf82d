/*!
 * LibreTranslate client.
 *
 * Talks to a LibreTranslate (or Argos-compatible) server over its JSON API:
 * `POST /translate` and `GET /languages`.
 */

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;

use super::{LanguageInfo, Provider, TranslatedText, TranslationRequest};

/// Request body for `POST /translate`
#[derive(Debug, Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    format: &'static str,
    source: &'a str,
    target: &'a str,
    alternatives: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

/// Response body of `POST /translate`
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    #[serde(default)]
    alternatives: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// LibreTranslate client
#[derive(Debug)]
pub struct LibreTranslate {
    /// Service root, always ending with a slash
    base_url: Url,
    api_key: Option<String>,
    client: Client,
    /// Extra attempts after a failed request
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl LibreTranslate {
    /// Client for `endpoint` with a 30 second timeout and no retries
    pub fn new(endpoint: &str) -> Result<Self, ProviderError> {
        Self::new_with_config(endpoint, None, 30, 0, 1000)
    }

    pub fn new_with_config(
        endpoint: &str,
        api_key: Option<String>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ProviderError> {
        let mut base_url = Url::parse(endpoint)
            .map_err(|e| ProviderError::InvalidRequest(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(Self {
            base_url,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::InvalidRequest(format!("invalid path '{}': {}", path, e)))
    }

    /// Send a request, retrying connection failures and server errors
    async fn send_with_retry(&self, build: impl Fn() -> reqwest::RequestBuilder) -> Result<String, ProviderError> {
        let mut attempt = 0;

        loop {
            let error = match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .map_err(|e| ProviderError::RequestFailed(format!("failed to read response body: {}", e)))?;

                    if status.is_success() {
                        return Ok(body);
                    }

                    let error = ProviderError::ApiError {
                        status_code: status.as_u16(),
                        message: error_message(&body, status),
                    };
                    if !is_retryable(status) {
                        error!("LibreTranslate rejected the request: {}", error);
                        return Err(error);
                    }
                    error
                }
                Err(e) if e.is_timeout() || e.is_connect() => ProviderError::ConnectionError(e.to_string()),
                Err(e) => ProviderError::RequestFailed(e.to_string()),
            };

            if attempt >= self.max_retries {
                return Err(error);
            }

            let delay = self.backoff_base_ms.saturating_mul(1u64 << attempt.min(16));
            warn!(
                "LibreTranslate request failed (attempt {}/{}): {}. Retrying in {} ms",
                attempt + 1,
                self.max_retries + 1,
                error,
                delay
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
            attempt += 1;
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// The service's `{"error": ...}` message, else the raw body, else the status text
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse a `/translate` response body
fn parse_translation(body: &str) -> Result<TranslatedText, ProviderError> {
    let response: TranslateResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;

    match response.translated_text {
        Some(text) if !text.trim().is_empty() => Ok(TranslatedText {
            primary: text,
            alternatives: response.alternatives,
        }),
        _ => Err(ProviderError::InvalidResponse("missing translatedText".to_string())),
    }
}

#[async_trait]
impl Provider for LibreTranslate {
    async fn translate(&self, request: TranslationRequest) -> Result<TranslatedText, ProviderError> {
        let url = self.endpoint("translate")?;
        let body = TranslateBody {
            q: &request.text,
            format: "text",
            source: &request.source_language,
            target: &request.target_language,
            alternatives: request.alternatives,
            api_key: self.api_key.as_deref(),
        };

        debug!(
            "Translating {} chars {} -> {}",
            request.text.chars().count(),
            request.source_language,
            request.target_language
        );
        let response = self.send_with_retry(|| self.client.post(url.clone()).json(&body)).await?;
        parse_translation(&response)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.languages().await.map(|_| ())
    }

    async fn languages(&self) -> Result<Vec<LanguageInfo>, ProviderError> {
        let url = self.endpoint("languages")?;
        let body = self.send_with_retry(|| self.client.get(url.clone())).await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    fn name(&self) -> &str {
        "LibreTranslate"
    }
}
