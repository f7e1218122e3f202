//! Slashtech marketing site
//!
//! A bilingual single-page site for a digital-systems consultancy, served
//! as plain HTML, with a chat widget that streams answers from a hosted
//! generative-AI model and renders structured panels from them.
//!
//! # Architecture
//!
//! - **Server**: Axum-based HTTP server with SSE streaming
//! - **Chat**: per-visitor history, single-flight turns, annotation parsing
//! - **GenAI**: Gemini streaming text and image generation behind traits
//! - **UI**: server-rendered page shell, panels and Markdown prose
//!
//! # Modules
//!
//! - [`chat`]: chat sessions, messages and the `[SYSTEM_UI: ...]` annotation
//! - [`content`]: bilingual site copy
//! - [`events`]: streaming event model for chat turns
//! - [`genai`]: provider traits and drivers
//! - [`store`]: per-visitor key/value storage
//! - [`visuals`]: card visuals with fallback

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod chat;
pub mod config;
pub mod content;
pub mod events;
pub mod genai;
pub mod rate_limit;
pub mod server;
pub mod store;
pub mod telemetry;
pub mod ui;
pub mod visuals;

use crate::chat::ChatSessions;
use crate::config::AppConfig;
use crate::content::SiteContent;
use crate::genai::TextStreamer;
use crate::rate_limit::SimpleRateLimiter;
use crate::visuals::VisualService;

use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live chat sessions keyed by visitor id.
    pub sessions: ChatSessions,
    /// Text provider answering chat turns.
    pub streamer: Arc<dyn TextStreamer>,
    /// Card visual generation.
    pub visuals: VisualService,
    /// Site copy in both languages.
    pub content: Arc<SiteContent>,
    /// Global Rate Limiter
    pub rate_limiter: Arc<SimpleRateLimiter>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
