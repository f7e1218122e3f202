//! Generative-AI provider seam.
//!
//! The chat widget needs two things from the hosted provider: a streamed
//! text answer for a prompt plus system instruction, and a single image for
//! a prompt at a fixed aspect ratio. Both sit behind traits so the chat
//! session and the visual endpoints can run against the real Gemini API or
//! an in-process script.
//!
//! # Drivers
//!
//! - [`GeminiDriver`]: Google Gemini REST API (`streamGenerateContent`, `generateContent`)
//! - [`ScriptedDriver`]: replays canned chunks and images, used by tests and offline runs

pub mod gemini;
pub mod prompt;
pub mod scripted;

pub use gemini::GeminiDriver;
pub use scripted::ScriptedDriver;

use std::fmt;
use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Model answering chat turns.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
/// Model producing visuals.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Provider connection and generation settings.
#[derive(Clone)]
pub struct GenAiSettings {
    /// Base URL of the REST API, without the version segment.
    pub base_url: String,
    /// API key sent as `x-goog-api-key`.
    pub api_key: Option<String>,
    /// Text model identifier.
    pub model: String,
    /// Image model identifier.
    pub image_model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Zero disables model-side thinking.
    pub thinking_budget: u32,
}

impl fmt::Debug for GenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenAiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("image_model", &self.image_model)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("temperature", &self.temperature)
            .field("thinking_budget", &self.thinking_budget)
            .finish()
    }
}

impl Default for GenAiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            max_output_tokens: 800,
            temperature: 0.6,
            thinking_budget: 0,
        }
    }
}

/// One text-generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    /// The user's prompt, already trimmed.
    pub prompt: String,
    /// Fixed instruction framing every answer.
    pub system_instruction: String,
}

/// One incremental piece of generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
}

/// Stream of generated text chunks.
pub type TextStream = Pin<Box<dyn Stream<Item = anyhow::Result<TextChunk>> + Send>>;

/// Aspect ratios accepted by the image model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[default]
    #[serde(rename = "16:9")]
    Wide16x9,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "9:16")]
    Tall9x16,
}

impl AspectRatio {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape4x3 => "4:3",
            Self::Wide16x9 => "16:9",
            Self::Portrait3x4 => "3:4",
            Self::Tall9x16 => "9:16",
        }
    }
}

/// Errors raised by provider drivers.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    #[error("no API key configured for the AI provider")]
    MissingApiKey,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("malformed provider payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("provider response carried no image data")]
    NoImage,
}

/// Streaming text generation.
///
/// Implementations return the stream once the provider has accepted the
/// request; failures before that point are returned as `Err`, failures
/// afterwards arrive as `Err` items.
#[async_trait::async_trait]
pub trait TextStreamer: Send + Sync {
    async fn stream_text(&self, req: TextRequest) -> anyhow::Result<TextStream>;
}

/// Single-shot image generation.
#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one image and return it as a `data:` URL.
    async fn generate_image(&self, prompt: &str, aspect: AspectRatio) -> anyhow::Result<String>;
}
