//! Caller-side orchestration: session credential, input checks, generation
//! and optional export of the results.

use crate::ai::{DialogueService, GeminiDialogueClient, GeminiSceneImageClient, SceneImageService};
use crate::credential::{Credential, CredentialStore};
use crate::export;
use crate::models::{Config, DialogueLine, SceneImage};
use crate::{Error, Result};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// What a single run should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generate {
    Dialogue,
    Image,
    Both,
}

impl Generate {
    fn wants_dialogue(self) -> bool {
        matches!(self, Generate::Dialogue | Generate::Both)
    }

    fn wants_image(self) -> bool {
        matches!(self, Generate::Image | Generate::Both)
    }
}

/// Independent results of one run. A failure in one slot never clears the
/// other, and a failed save never clears a generated result.
#[derive(Debug, Default)]
pub struct SceneOutcome {
    pub dialogue: Option<Result<Vec<DialogueLine>>>,
    pub image: Option<Result<SceneImage>>,
    pub saved: Vec<PathBuf>,
    pub save_errors: Vec<Error>,
}

impl SceneOutcome {
    pub fn is_success(&self) -> bool {
        self.dialogue.as_ref().map_or(true, |r| r.is_ok())
            && self.image.as_ref().map_or(true, |r| r.is_ok())
            && self.save_errors.is_empty()
    }

    /// True when the scene image was written to disk during this run.
    pub fn image_saved(&self) -> bool {
        self.saved
            .iter()
            .any(|path| path.ends_with(export::SCENE_IMAGE_FILE_NAME))
    }
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub dialogue: Box<dyn DialogueService>,
    pub scene_image: Box<dyn SceneImageService>,
}

pub struct App {
    dialogue: Box<dyn DialogueService>,
    scene_image: Box<dyn SceneImageService>,
    credentials: CredentialStore,
    output_dir: Option<PathBuf>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(
        services: AppServices,
        credentials: CredentialStore,
        output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            dialogue: services.dialogue,
            scene_image: services.scene_image,
            credentials,
            output_dir,
        }
    }

    /// Build an app talking to Gemini, seeding the session credential from
    /// `config.api_key` when present.
    pub fn new(config: &Config, output_dir: Option<PathBuf>) -> Result<Self> {
        let credentials = CredentialStore::new();
        if let Some(api_key) = &config.api_key {
            credentials.set(api_key.clone())?;
        }

        // Reuse one HTTP connection pool across both adapters.
        let http_client = reqwest::Client::new();

        info!(
            "Dialogue model: {}, image model: {}",
            config.dialogue_model, config.image_model
        );

        Ok(Self::with_services(
            AppServices {
                dialogue: Box::new(GeminiDialogueClient::from_config(config, http_client.clone())),
                scene_image: Box::new(GeminiSceneImageClient::from_config(config, http_client)),
            },
            credentials,
            output_dir,
        ))
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    fn ready_credential(&self, scenario: &str) -> Result<Credential> {
        let credential = self.credentials.current().ok_or_else(|| {
            warn!("Generation requested without a session credential");
            Error::CredentialNotSet
        })?;
        if scenario.trim().is_empty() {
            return Err(Error::EmptyScenario);
        }
        Ok(credential)
    }

    pub async fn generate_dialogue(&self, scenario: &str) -> Result<Vec<DialogueLine>> {
        let credential = self.ready_credential(scenario)?;
        info!("Generating dialogue");
        self.dialogue.generate_dialogue(&credential, scenario).await
    }

    pub async fn generate_scene_image(&self, scenario: &str) -> Result<SceneImage> {
        let credential = self.ready_credential(scenario)?;
        info!("Generating scene image");
        self.scene_image
            .generate_scene_image(&credential, scenario)
            .await
    }

    /// Run the requested generations, concurrently when both are asked for,
    /// then save successful results if an output directory is configured.
    ///
    /// Generation and save failures are both reported inside the outcome.
    pub async fn run(&self, target: Generate, scenario: &str) -> SceneOutcome {
        let dialogue = async {
            if target.wants_dialogue() {
                Some(self.generate_dialogue(scenario).await)
            } else {
                None
            }
        };
        let image = async {
            if target.wants_image() {
                Some(self.generate_scene_image(scenario).await)
            } else {
                None
            }
        };
        let (dialogue, image) = tokio::join!(dialogue, image);

        if let Some(Err(e)) = &dialogue {
            error!("Dialogue generation failed: {}", e);
        }
        if let Some(Err(e)) = &image {
            error!("Scene image generation failed: {}", e);
        }

        let mut outcome = SceneOutcome {
            dialogue,
            image,
            ..SceneOutcome::default()
        };

        if let Some(dir) = &self.output_dir {
            if let Some(Ok(lines)) = &outcome.dialogue {
                match export::save_dialogue(dir, lines) {
                    Ok(Some(path)) => outcome.saved.push(path),
                    Ok(None) => {}
                    Err(e) => {
                        error!("Failed to save dialogue: {}", e);
                        outcome.save_errors.push(e);
                    }
                }
            }
            if let Some(Ok(image)) = &outcome.image {
                match export::save_scene_image(dir, image) {
                    Ok(path) => outcome.saved.push(path),
                    Err(e) => {
                        error!("Failed to save scene image: {}", e);
                        outcome.save_errors.push(e);
                    }
                }
            }
        }

        outcome
    }
}
