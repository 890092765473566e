use super::client::GeminiEndpoint;
use super::types::{OutputOptions, PredictInstance, PredictParameters, PredictRequest, PredictResponse};
use crate::ai::{classify, ensure_within_limit, SceneImageService};
use crate::credential::Credential;
use crate::error::Stage;
use crate::models::{
    Config, SceneImage, DEFAULT_BASE_URL, DEFAULT_MAX_SCENARIO_BYTES, SCENE_IMAGE_MIME,
};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

const ASPECT_RATIO: &str = "16:9";

/// Pull the single scene image out of an Imagen reply.
///
/// The base64 payload is kept exactly as received. A reply without
/// predictions, or whose first prediction carries an empty payload, has
/// nothing usable and yields [`Error::EmptyResult`].
pub fn decode_scene_image(response: PredictResponse) -> Result<SceneImage> {
    let prediction = response.predictions.into_iter().next().ok_or_else(|| {
        tracing::warn!("Imagen returned no predictions");
        Error::EmptyResult
    })?;

    if let Some(reason) = &prediction.rai_filtered_reason {
        tracing::warn!("Imagen filtered the generated image: {}", reason);
    }
    if let Some(mime_type) = &prediction.mime_type {
        tracing::debug!("Imagen returned image with mime_type: {}", mime_type);
    }

    let encoded = prediction
        .bytes_base64_encoded
        .filter(|b64| !b64.trim().is_empty())
        .ok_or(Error::EmptyResult)?;

    Ok(SceneImage::new(encoded, SCENE_IMAGE_MIME))
}

/// Imagen implementation of [`SceneImageService`].
pub struct GeminiSceneImageClient {
    client: reqwest::Client,
    endpoint: GeminiEndpoint,
    max_scenario_bytes: usize,
}

impl GeminiSceneImageClient {
    pub fn new(model: String) -> Self {
        Self::new_with_client(model, reqwest::Client::new())
    }

    pub fn new_with_client(model: String, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: GeminiEndpoint::new(DEFAULT_BASE_URL, model, Duration::from_secs(120)),
            max_scenario_bytes: DEFAULT_MAX_SCENARIO_BYTES,
        }
    }

    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: GeminiEndpoint::new(
                config.base_url.clone(),
                config.image_model.clone(),
                config.image_timeout,
            ),
            max_scenario_bytes: config.max_scenario_bytes,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.endpoint = GeminiEndpoint::new(base_url, self.endpoint.model(), self.endpoint.timeout);
        self
    }

    pub fn with_max_scenario_bytes(mut self, max_scenario_bytes: usize) -> Self {
        self.max_scenario_bytes = max_scenario_bytes;
        self
    }

    async fn request_scene_image(
        &self,
        credential: &Credential,
        scenario: &str,
    ) -> Result<SceneImage> {
        let http = self.endpoint.connect(credential, self.client.clone())?;
        ensure_within_limit(scenario, self.max_scenario_bytes)?;

        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompts::scene_image_prompt(scenario),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: ASPECT_RATIO.to_string(),
                output_options: OutputOptions {
                    mime_type: SCENE_IMAGE_MIME.to_string(),
                },
            },
        };

        tracing::debug!(
            "Requesting scene image from Imagen (model: {}, scenario: {} bytes)",
            http.model(),
            scenario.len()
        );
        let response: PredictResponse = http.predict(&request).await?;

        let image = decode_scene_image(response)?;
        tracing::info!(
            "Generated scene image ({} base64 chars)",
            image.base64().len()
        );
        Ok(image)
    }
}

#[async_trait]
impl SceneImageService for GeminiSceneImageClient {
    async fn generate_scene_image(
        &self,
        credential: &Credential,
        scenario: &str,
    ) -> Result<SceneImage> {
        self.request_scene_image(credential, scenario)
            .await
            .map_err(|e| classify(Stage::Image, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use base64::Engine as _;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "imagen-3.0-generate-002";

    fn make_client(server: &MockServer) -> GeminiSceneImageClient {
        GeminiSceneImageClient::new(DEFAULT_MODEL.to_string()).with_base_url(server.uri())
    }

    fn prediction_response(b64: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "predictions": [{
                "bytesBase64Encoded": b64,
                "mimeType": "image/jpeg"
            }]
        }))
    }

    #[tokio::test]
    async fn test_generate_scene_image_returns_data_uri() {
        let server = MockServer::start().await;

        let fake_jpeg: Vec<u8> = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let b64 = base64::engine::general_purpose::STANDARD.encode(&fake_jpeg);

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(prediction_response(&b64))
            .expect(1)
            .mount(&server)
            .await;

        let image = make_client(&server)
            .generate_scene_image(&Credential::new("key"), "A glowing ruin")
            .await
            .unwrap();

        assert_eq!(image.base64(), b64);
        assert_eq!(image.decode_bytes().unwrap(), fake_jpeg);
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.to_data_uri(), format!("data:image/jpeg;base64,{}", b64));
    }

    #[tokio::test]
    async fn test_request_asks_for_one_jpeg_in_16_9() {
        let server = MockServer::start().await;
        let b64 = base64::engine::general_purpose::STANDARD.encode([0xFFu8, 0xD8]);

        Mock::given(method("POST"))
            .and(path("/v1beta/models/imagen-3.0-generate-002:predict"))
            .and(body_string_contains("\"sampleCount\":1"))
            .and(body_string_contains("\"aspectRatio\":\"16:9\""))
            .and(body_string_contains("\"mimeType\":\"image/jpeg\""))
            .and(body_string_contains("A glowing ruin"))
            .and(body_string_contains("Avoid depicting specific characters"))
            .respond_with(prediction_response(&b64))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server)
            .generate_scene_image(&Credential::new("key"), "A glowing ruin")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = make_client(&server)
            .generate_scene_image(&Credential::new(""), "scenario")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
    }

    #[tokio::test]
    async fn test_zero_predictions_is_empty_result() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "predictions": [] })),
            )
            .mount(&server)
            .await;

        let err = make_client(&server)
            .generate_scene_image(&Credential::new("key"), "scenario")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyResult));
    }

    #[tokio::test]
    async fn test_filtered_response_without_predictions_is_empty_result() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .generate_scene_image(&Credential::new("key"), "scenario")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyResult));
    }

    #[test]
    fn test_decode_rejects_missing_and_empty_bytes() {
        let missing: PredictResponse = serde_json::from_value(serde_json::json!({
            "predictions": [{ "raiFilteredReason": "blocked" }]
        }))
        .unwrap();
        assert!(matches!(decode_scene_image(missing), Err(Error::EmptyResult)));

        let empty: PredictResponse = serde_json::from_value(serde_json::json!({
            "predictions": [{ "bytesBase64Encoded": "" }]
        }))
        .unwrap();
        assert!(matches!(decode_scene_image(empty), Err(Error::EmptyResult)));
    }

    #[test]
    fn test_decode_passes_unpadded_payload_through() {
        let response: PredictResponse = serde_json::from_value(serde_json::json!({
            "predictions": [{ "bytesBase64Encoded": "/9j/4A" }]
        }))
        .unwrap();
        let image = decode_scene_image(response).unwrap();
        assert_eq!(image.to_data_uri(), "data:image/jpeg;base64,/9j/4A");
        assert_eq!(image.decode_bytes().unwrap(), vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn test_decode_passes_wrapped_payload_through() {
        let response: PredictResponse = serde_json::from_value(serde_json::json!({
            "predictions": [{ "bytesBase64Encoded": "/9j/\n4AAQ" }]
        }))
        .unwrap();
        let image = decode_scene_image(response).unwrap();
        assert_eq!(image.to_data_uri(), "data:image/jpeg;base64,/9j/\n4AAQ");
    }

    #[tokio::test]
    async fn test_api_error_is_provider_error_with_stage_prefix() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .generate_scene_image(&Credential::new("key"), "scenario")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Provider {
                stage: Stage::Image,
                ..
            }
        ));
        let message = err.to_string();
        assert!(message.starts_with("Failed to generate image from AI: "));
        assert!(message.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_oversized_scenario_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = make_client(&server)
            .with_max_scenario_bytes(3)
            .generate_scene_image(&Credential::new("key"), "four")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InputTooLarge { len: 4, max: 3 }));
    }
}
