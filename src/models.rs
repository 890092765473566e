//! Data models and structures
//!
//! Defines the dialogue and scene image values returned to callers, plus the
//! runtime configuration loaded from the environment.

use crate::credential::Credential;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// MIME type of every scene image requested from the provider.
pub const SCENE_IMAGE_MIME: &str = "image/jpeg";

/// One spoken line of a generated script.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DialogueLine {
    pub character: String,
    pub dialogue: String,
}

impl DialogueLine {
    pub fn new(character: impl Into<String>, dialogue: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            dialogue: dialogue.into(),
        }
    }
}

impl fmt::Display for DialogueLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.character, self.dialogue)
    }
}

/// Render a script in reading order, one `Character: line` per row.
pub fn render_script(lines: &[DialogueLine]) -> String {
    lines
        .iter()
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes provider payloads whether or not they carry `=` padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A single generated scene illustration.
///
/// Holds the provider's base64 payload as received so the data URI carries
/// exactly those characters. Raw bytes are only decoded when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneImage {
    base64: String,
    mime_type: String,
}

impl SceneImage {
    pub fn new(base64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            base64: base64.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(STANDARD.encode(bytes), mime_type)
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Decode the payload, ignoring line breaks and missing padding.
    pub fn decode_bytes(&self) -> crate::Result<Vec<u8>> {
        let compact: String = self
            .base64
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        Ok(LENIENT_BASE64.decode(compact)?)
    }

    /// Directly displayable `data:` URI for the image.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

// Configuration
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_DIALOGUE_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";
pub const DEFAULT_MAX_SCENARIO_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<Credential>,
    pub base_url: String,
    pub dialogue_model: String,
    pub image_model: String,
    pub max_scenario_bytes: usize,
    pub dialogue_timeout: Duration,
    pub image_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            dialogue_model: DEFAULT_DIALOGUE_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            max_scenario_bytes: DEFAULT_MAX_SCENARIO_BYTES,
            dialogue_timeout: Duration::from_secs(30),
            image_timeout: Duration::from_secs(120),
        }
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_scenario_bytes = match non_empty("MAX_SCENARIO_BYTES") {
            Some(raw) => parse_positive(&raw, "MAX_SCENARIO_BYTES")?,
            None => defaults.max_scenario_bytes,
        };
        let dialogue_timeout = match non_empty("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive(&raw, "REQUEST_TIMEOUT_SECS")? as u64),
            None => defaults.dialogue_timeout,
        };

        Ok(Self {
            api_key: non_empty("GEMINI_API_KEY").map(Credential::new),
            base_url: non_empty("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            dialogue_model: non_empty("DIALOGUE_MODEL").unwrap_or(defaults.dialogue_model),
            image_model: non_empty("IMAGE_MODEL").unwrap_or(defaults.image_model),
            max_scenario_bytes,
            dialogue_timeout,
            image_timeout: defaults.image_timeout,
        })
    }
}

fn parse_positive(raw: &str, key: &str) -> crate::Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(crate::Error::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}
