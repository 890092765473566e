//! Error handling and custom error types
//!
//! Every generation failure that reaches a caller is one of the classified
//! variants (`MissingCredential`, `InputTooLarge`, `InvalidResponseFormat`,
//! `EmptyResult`, `Provider`, `Unknown`). Internal adapter failures are folded
//! into that taxonomy by [`crate::ai::classify`]. The app layer adds its own
//! input checks (`CredentialNotSet`, `EmptyScenario`) and export failures.

use std::fmt;
use thiserror::Error;

/// Which adapter produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dialogue,
    Image,
}

impl Stage {
    /// Noun used in "Failed to generate {noun} from AI" messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Stage::Dialogue => "dialogue",
            Stage::Image => "image",
        }
    }

    fn unknown_subject(&self) -> &'static str {
        match self {
            Stage::Dialogue => "dialogue",
            Stage::Image => "the image",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("API key is missing. Please provide a valid API key.")]
    MissingCredential,

    #[error("Scenario is too large ({len} bytes, limit is {max} bytes)")]
    InputTooLarge { len: usize, max: usize },

    #[error("Failed to generate dialogue from AI: AI returned an invalid response format ({0})")]
    InvalidResponseFormat(String),

    #[error("Failed to generate image from AI: The AI did not return a valid image.")]
    EmptyResult,

    #[error("Failed to generate {stage} from AI: {message}")]
    Provider { stage: Stage, message: String },

    #[error("An unknown error occurred while generating {}.", .0.unknown_subject())]
    Unknown(Stage),

    #[error("Please set your Google Gemini API key before generating content.")]
    CredentialNotSet,

    #[error("Please enter a scenario description.")]
    EmptyScenario,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Scene image payload is not valid base64: {0}")]
    ImageDecode(#[from] base64::DecodeError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures the user can only resolve by supplying a credential.
    pub fn needs_credential(&self) -> bool {
        matches!(self, Error::MissingCredential | Error::CredentialNotSet)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
