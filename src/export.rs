//! Saving generated content on explicit request.
//!
//! Mirrors the two download buttons of the browser front end: the script as
//! pretty-printed JSON and the scene as a JPEG file.

use crate::models::{DialogueLine, SceneImage};
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const DIALOGUE_FILE_NAME: &str = "dialogue.json";
pub const SCENE_IMAGE_FILE_NAME: &str = "narrative-scene.jpeg";

/// Write `lines` as `dialogue.json` in `dir`.
///
/// Returns `None` without touching the filesystem when there is nothing to save.
pub fn save_dialogue(dir: &Path, lines: &[DialogueLine]) -> Result<Option<PathBuf>> {
    if lines.is_empty() {
        return Ok(None);
    }
    fs::create_dir_all(dir)?;
    let path = dir.join(DIALOGUE_FILE_NAME);
    fs::write(&path, serde_json::to_string_pretty(lines)?)?;
    tracing::info!("Saved dialogue to {}", path.display());
    Ok(Some(path))
}

/// Write the decoded scene image as `narrative-scene.jpeg` in `dir`.
///
/// The payload is decoded before anything is created, so an undecodable
/// image leaves `dir` untouched.
pub fn save_scene_image(dir: &Path, image: &SceneImage) -> Result<PathBuf> {
    let bytes = image.decode_bytes()?;
    fs::create_dir_all(dir)?;
    let path = dir.join(SCENE_IMAGE_FILE_NAME);
    fs::write(&path, bytes)?;
    tracing::info!("Saved scene image to {}", path.display());
    Ok(path)
}
