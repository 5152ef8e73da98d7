use super::types::{Content, GenerateContentRequest, GenerateContentResponse};
use crate::ai::GenerationService;
use crate::error::upstream_message;
use crate::models::DEFAULT_GEMINI_BASE_URL;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Lightweight Gemini REST client.
///
/// The model and credential are chosen per call so a single client can serve
/// every candidate of the fallback list.
#[derive(Debug, Clone)]
pub struct GeminiHttpClient {
    client: Client,
    base_url: String,
}

impl GeminiHttpClient {
    pub fn new() -> Self {
        Self::new_with_client(Client::new())
    }

    pub fn new_with_client(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn generate_content_url(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

impl Default for GeminiHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationService for GeminiHttpClient {
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        contents: &[Content],
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.generate_content_url(model))
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(&GenerateContentRequest { contents })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await?;
            let details = serde_json::from_str(&error_text)
                .unwrap_or(serde_json::Value::String(error_text));
            tracing::debug!(
                "Gemini API error (status {}): {}",
                status,
                upstream_message(&details)
            );
            return Err(Error::Upstream { status, details });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::Serialization(e)
        })
    }
}
