use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::utils::error::{AppError, Result};
use crate::utils::HttpClient;

/// Third-party machine translation
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Translate `text` into `target_lang` (ISO-639 code such as "es" or "zh-CN")
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GoogleTranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct GoogleTranslateResponse {
    data: GoogleTranslateData,
}

#[derive(Debug, Deserialize)]
struct GoogleTranslateData {
    translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleTranslation {
    translated_text: String,
}

/// Google Cloud Translation, v2 REST API
pub struct GoogleTranslateProvider {
    http: HttpClient,
    endpoint: String,
    api_key: String,
}

impl GoogleTranslateProvider {
    pub fn new(http: HttpClient, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    fn request_url(&self) -> String {
        format!("{}?key={}", self.endpoint, self.api_key)
    }
}

/// Pull the first translation out of a v2 response body
fn extract_translation(body: &str) -> Result<String> {
    let response: GoogleTranslateResponse = serde_json::from_str(body).map_err(|e| {
        AppError::UpstreamTranslationFailure(format!("Unexpected translation response: {}", e))
    })?;

    response
        .data
        .translations
        .into_iter()
        .next()
        .map(|t| t.translated_text)
        .ok_or_else(|| {
            AppError::UpstreamTranslationFailure("Translation response was empty".to_string())
        })
}

#[async_trait]
impl TranslationProvider for GoogleTranslateProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        let body = GoogleTranslateRequest {
            q: text,
            target: target_lang,
            format: "text",
        };

        debug!(
            "🌐 Sending {} bytes to Google Translate (target: {})",
            text.len(),
            target_lang
        );

        let response = self.http.post_json(&self.request_url(), &body).await?;
        let status = response.status();
        let payload = response.text().await?;

        if !status.is_success() {
            error!("❌ Translation API error ({}): {}", status, payload);
            return Err(AppError::UpstreamTranslationFailure(format!(
                "Translation API returned {}",
                status
            )));
        }

        extract_translation(&payload)
    }
}
