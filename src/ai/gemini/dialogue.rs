use super::client::GeminiEndpoint;
use super::types::{Content, GenerateContentResponse};
use crate::ai::{classify, ensure_within_limit, DialogueService};
use crate::credential::Credential;
use crate::error::Stage;
use crate::models::{Config, DialogueLine, DEFAULT_BASE_URL, DEFAULT_MAX_SCENARIO_BYTES};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const TEMPERATURE: f32 = 0.8;
const TOP_P: f32 = 0.95;

#[derive(Debug, Serialize)]
struct DialogueRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: DialogueGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DialogueGenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
    temperature: f32,
    top_p: f32,
}

/// Declared output shape: array of `{character, dialogue}` string objects.
pub fn dialogue_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "character": {
                    "type": "STRING",
                    "description": "The name of the character speaking."
                },
                "dialogue": {
                    "type": "STRING",
                    "description": "The line of dialogue spoken by the character."
                }
            },
            "required": ["character", "dialogue"]
        }
    })
}

/// Validate raw provider text and decode it into a script.
///
/// The payload must be a JSON array (after trimming) of at least one object
/// carrying string `character` and `dialogue` fields.
pub fn decode_dialogue(text: &str) -> Result<Vec<DialogueLine>> {
    let text = text.trim();
    if !text.starts_with('[') {
        return Err(Error::InvalidResponseFormat(
            "expected a JSON array".to_string(),
        ));
    }

    let lines: Vec<DialogueLine> = serde_json::from_str(text).map_err(|e| {
        tracing::debug!("Dialogue payload failed validation: {}", e);
        Error::InvalidResponseFormat(e.to_string())
    })?;

    if lines.is_empty() {
        return Err(Error::InvalidResponseFormat(
            "dialogue array is empty".to_string(),
        ));
    }

    Ok(lines)
}

/// Gemini implementation of [`DialogueService`].
pub struct GeminiDialogueClient {
    client: reqwest::Client,
    endpoint: GeminiEndpoint,
    max_scenario_bytes: usize,
}

impl GeminiDialogueClient {
    pub fn new(model: String) -> Self {
        Self::new_with_client(model, reqwest::Client::new())
    }

    pub fn new_with_client(model: String, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: GeminiEndpoint::new(DEFAULT_BASE_URL, model, Duration::from_secs(30)),
            max_scenario_bytes: DEFAULT_MAX_SCENARIO_BYTES,
        }
    }

    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: GeminiEndpoint::new(
                config.base_url.clone(),
                config.dialogue_model.clone(),
                config.dialogue_timeout,
            ),
            max_scenario_bytes: config.max_scenario_bytes,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.endpoint = GeminiEndpoint::new(base_url, self.endpoint.model(), self.endpoint.timeout);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.endpoint.timeout = timeout;
        self
    }

    pub fn with_max_scenario_bytes(mut self, max_scenario_bytes: usize) -> Self {
        self.max_scenario_bytes = max_scenario_bytes;
        self
    }

    async fn request_dialogue(
        &self,
        credential: &Credential,
        scenario: &str,
    ) -> Result<Vec<DialogueLine>> {
        let http = self.endpoint.connect(credential, self.client.clone())?;
        ensure_within_limit(scenario, self.max_scenario_bytes)?;

        let request = DialogueRequest {
            contents: vec![Content::user_text(prompts::dialogue_prompt(scenario))],
            generation_config: DialogueGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: dialogue_schema(),
                temperature: TEMPERATURE,
                top_p: TOP_P,
            },
        };

        tracing::debug!(
            "Requesting dialogue from Gemini (model: {}, scenario: {} bytes)",
            http.model(),
            scenario.len()
        );
        let response: GenerateContentResponse = http.generate_content(&request).await?;

        let text = response
            .text()
            .ok_or_else(|| Error::InvalidResponseFormat(response.missing_text_reason()))?;

        let lines = decode_dialogue(&text)?;
        tracing::info!("Generated {} dialogue lines", lines.len());
        Ok(lines)
    }
}

#[async_trait]
impl DialogueService for GeminiDialogueClient {
    async fn generate_dialogue(
        &self,
        credential: &Credential,
        scenario: &str,
    ) -> Result<Vec<DialogueLine>> {
        self.request_dialogue(credential, scenario)
            .await
            .map_err(|e| classify(Stage::Dialogue, e))
    }
}
