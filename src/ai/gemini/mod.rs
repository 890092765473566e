pub mod client;
pub mod dialogue;
pub mod image;
pub mod types;

pub use client::{GeminiEndpoint, GeminiHttpClient};
pub use dialogue::GeminiDialogueClient;
pub use image::GeminiSceneImageClient;
