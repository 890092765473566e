//! Scene and dialogue generator backed by Google Gemini and Imagen
//!
//! Turns a free-text RPG scenario into a short multi-character script and an
//! atmospheric illustration of the setting.

pub mod ai;
pub mod app;
pub mod credential;
pub mod error;
pub mod export;
pub mod models;
pub mod prompts;

pub use error::{Error, Result};
