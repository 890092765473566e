use super::{DialogueService, SceneImageService};
use crate::credential::Credential;
use crate::error::Stage;
use crate::models::{DialogueLine, SceneImage, SCENE_IMAGE_MIME};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted outcome for one mock call; failures become [`Error::Provider`].
type Scripted<T> = std::result::Result<T, String>;

#[derive(Clone)]
pub struct MockDialogueClient {
    responses: Arc<Mutex<Vec<Scripted<Vec<DialogueLine>>>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockDialogueClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_dialogue_response(self, lines: Vec<DialogueLine>) -> Self {
        self.responses.lock().unwrap().push(Ok(lines));
        self
    }

    pub fn with_provider_failure(self, message: &str) -> Self {
        self.responses.lock().unwrap().push(Err(message.to_string()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockDialogueClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DialogueService for MockDialogueClient {
    async fn generate_dialogue(
        &self,
        credential: &Credential,
        scenario: &str,
    ) -> Result<Vec<DialogueLine>> {
        if credential.is_blank() {
            return Err(Error::MissingCredential);
        }

        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response
            return Ok(vec![
                DialogueLine::new("Narrator", format!("It begins: {}", scenario)),
                DialogueLine::new("Stranger", "Who goes there?"),
            ]);
        }

        let index = (*count - 1) % responses.len();
        responses[index].clone().map_err(|message| Error::Provider {
            stage: Stage::Dialogue,
            message,
        })
    }
}

#[derive(Clone)]
pub struct MockSceneImageClient {
    responses: Arc<Mutex<Vec<Scripted<Vec<u8>>>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockSceneImageClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image_response(self, bytes: Vec<u8>) -> Self {
        self.responses.lock().unwrap().push(Ok(bytes));
        self
    }

    pub fn with_provider_failure(self, message: &str) -> Self {
        self.responses.lock().unwrap().push(Err(message.to_string()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockSceneImageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SceneImageService for MockSceneImageClient {
    async fn generate_scene_image(
        &self,
        credential: &Credential,
        _scenario: &str,
    ) -> Result<SceneImage> {
        if credential.is_blank() {
            return Err(Error::MissingCredential);
        }

        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // JPEG SOI + APP0 marker
            return Ok(SceneImage::from_bytes(
                &[0xFF, 0xD8, 0xFF, 0xE0],
                SCENE_IMAGE_MIME,
            ));
        }

        let index = (*count - 1) % responses.len();
        responses[index]
            .clone()
            .map(|bytes| SceneImage::from_bytes(&bytes, SCENE_IMAGE_MIME))
            .map_err(|message| Error::Provider {
                stage: Stage::Image,
                message,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_dialogue_default_mentions_scenario() {
        let client = MockDialogueClient::new();
        let lines = client
            .generate_dialogue(&Credential::new("key"), "a misty harbor")
            .await
            .unwrap();
        assert!(lines[0].dialogue.contains("a misty harbor"));
    }

    #[tokio::test]
    async fn test_mock_dialogue_cycles_responses() {
        let client = MockDialogueClient::new()
            .with_dialogue_response(vec![DialogueLine::new("A", "one")])
            .with_provider_failure("boom");
        let credential = Credential::new("key");

        assert!(client.generate_dialogue(&credential, "").await.is_ok());
        let err = client.generate_dialogue(&credential, "").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate dialogue from AI: boom");
        assert!(client.generate_dialogue(&credential, "").await.is_ok());
        assert_eq!(client.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mocks_refuse_blank_credentials_without_counting() {
        let dialogue = MockDialogueClient::new();
        let image = MockSceneImageClient::new();
        let blank = Credential::new("");

        assert!(matches!(
            dialogue.generate_dialogue(&blank, "s").await,
            Err(Error::MissingCredential)
        ));
        assert!(matches!(
            image.generate_scene_image(&blank, "s").await,
            Err(Error::MissingCredential)
        ));
        assert_eq!(dialogue.get_call_count(), 0);
        assert_eq!(image.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_image_custom_response() {
        let client = MockSceneImageClient::new().with_image_response(vec![1, 2, 3]);
        let image = client
            .generate_scene_image(&Credential::new("key"), "s")
            .await
            .unwrap();
        assert_eq!(image.decode_bytes().unwrap(), vec![1, 2, 3]);
        assert_eq!(client.get_call_count(), 1);
    }
}
