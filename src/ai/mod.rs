//! AI service integration for dialogue and scene image generation
//!
//! Each service call builds its own credentialed provider handle, sends one
//! request and decodes the reply into domain types. Whatever goes wrong is
//! reported through the classified variants of [`crate::Error`].

pub mod gemini;
pub mod mock;

pub use gemini::{GeminiDialogueClient, GeminiSceneImageClient};
pub use mock::{MockDialogueClient, MockSceneImageClient};

use crate::credential::Credential;
use crate::error::Stage;
use crate::models::{DialogueLine, SceneImage};
use crate::{Error, Result};
use async_trait::async_trait;

#[async_trait]
pub trait DialogueService: Send + Sync {
    /// Produce an ordered, non-empty script for `scenario`.
    async fn generate_dialogue(
        &self,
        credential: &Credential,
        scenario: &str,
    ) -> Result<Vec<DialogueLine>>;
}

#[async_trait]
pub trait SceneImageService: Send + Sync {
    /// Produce exactly one illustration of the setting in `scenario`.
    async fn generate_scene_image(
        &self,
        credential: &Credential,
        scenario: &str,
    ) -> Result<SceneImage>;
}

/// Fold any failure raised inside an adapter into the caller-facing taxonomy.
///
/// Classified variants pass through untouched. Transport and provider-side
/// failures become [`Error::Provider`] tagged with `stage`; everything else
/// becomes [`Error::Unknown`].
pub fn classify(stage: Stage, err: Error) -> Error {
    let classified = match err {
        Error::MissingCredential
        | Error::InputTooLarge { .. }
        | Error::InvalidResponseFormat(_)
        | Error::EmptyResult
        | Error::Provider { .. }
        | Error::Unknown(_) => err,
        Error::Http(e) => Error::Provider {
            stage,
            message: e.to_string(),
        },
        Error::AiProvider(message) => Error::Provider { stage, message },
        other => {
            tracing::error!("Unclassified {} generation failure: {}", stage, other);
            Error::Unknown(stage)
        }
    };
    tracing::error!("Error generating {}: {}", stage, classified);
    classified
}

/// Reject scenarios above `max_bytes` before anything is sent.
pub fn ensure_within_limit(scenario: &str, max_bytes: usize) -> Result<()> {
    if scenario.len() > max_bytes {
        return Err(Error::InputTooLarge {
            len: scenario.len(),
            max: max_bytes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_wraps_provider_message_with_stage() {
        let err = classify(
            Stage::Image,
            Error::AiProvider("Gemini API error (status 503): overloaded".to_string()),
        );
        match &err {
            Error::Provider { stage, message } => {
                assert_eq!(*stage, Stage::Image);
                assert!(message.contains("overloaded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err
            .to_string()
            .starts_with("Failed to generate image from AI: Gemini API error"));
    }

    #[test]
    fn test_classify_keeps_classified_variants() {
        assert!(matches!(
            classify(Stage::Dialogue, Error::MissingCredential),
            Error::MissingCredential
        ));
        assert!(matches!(
            classify(Stage::Image, Error::EmptyResult),
            Error::EmptyResult
        ));
        assert!(matches!(
            classify(
                Stage::Dialogue,
                Error::InvalidResponseFormat("nope".to_string())
            ),
            Error::InvalidResponseFormat(_)
        ));
    }

    #[test]
    fn test_classify_normalizes_everything_else_to_unknown() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = classify(Stage::Dialogue, Error::Io(io));
        assert!(matches!(err, Error::Unknown(Stage::Dialogue)));
        assert!(!err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_ensure_within_limit() {
        assert!(ensure_within_limit("abcd", 4).is_ok());
        let err = ensure_within_limit("abcde", 4).unwrap_err();
        assert!(matches!(err, Error::InputTooLarge { len: 5, max: 4 }));
    }
}
