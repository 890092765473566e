use crate::credential::Credential;
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Where and how a Gemini adapter reaches the provider.
#[derive(Debug, Clone)]
pub struct GeminiEndpoint {
    pub base_url: String,
    model: String,
    pub timeout: Duration,
}

impl GeminiEndpoint {
    /// `model` may be given bare (`gemini-2.5-flash`) or `models/`-prefixed.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let model = model.into();
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model,
            timeout,
        }
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build a client handle authorized by `credential`.
    ///
    /// Fails with [`Error::MissingCredential`] for an empty or blank key.
    /// Nothing is sent over the network here.
    pub fn connect(&self, credential: &Credential, client: Client) -> Result<GeminiHttpClient> {
        if credential.is_blank() {
            tracing::warn!("Refusing to build Gemini client without an API key");
            return Err(Error::MissingCredential);
        }
        Ok(GeminiHttpClient {
            client,
            api_key: credential.expose().to_string(),
            endpoint: self.clone(),
        })
    }
}

/// Credentialed Gemini REST handle used by the dialogue and image adapters.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    endpoint: GeminiEndpoint,
}

impl GeminiHttpClient {
    pub fn model(&self) -> &str {
        self.endpoint.model()
    }

    async fn post_to_url<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: String,
        request: &Req,
    ) -> Result<Resp> {
        let response = self
            .client
            .post(&url)
            .timeout(self.endpoint.timeout)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse Gemini response: {}", e))
        })
    }

    /// Calls `generateContent` for structured text generation.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.base_url,
            self.model()
        );
        self.post_to_url(url, request).await
    }

    /// Calls `predict`, the Imagen image generation endpoint.
    pub async fn predict<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:predict",
            self.endpoint.base_url,
            self.model()
        );
        self.post_to_url(url, request).await
    }
}
