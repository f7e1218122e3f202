//! Events streamed to the chat widget during a turn.
//!
//! A turn always ends with [`ChatEvent::Done`]. In between the widget sees
//! either a run of [`ChatEvent::MessageDelta`]s, a single
//! [`ChatEvent::MessageFailed`], or both (partial answer, then failure).
//!
//! # Example
//!
//! ```rust
//! use slashtech_site::events::{ChatEvent, sse_event};
//!
//! let event = ChatEvent::MessageDelta {
//!     text: "lo".to_string(),
//!     full_text: "Hello".to_string(),
//! };
//! let sse = sse_event(&event);
//! assert!(sse.starts_with("event: message.delta\n"));
//! ```

use serde::{Deserialize, Serialize};

use crate::chat::ReplyView;

/// Why a send did not start a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Input was empty after trimming.
    EmptyInput,
    /// A turn is already in flight for this visitor.
    Busy,
}

/// Streaming events of one chat turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum ChatEvent {
    /// The user message was accepted and appended.
    #[serde(rename = "chat.start")]
    Start {
        request_id: String,
        visitor_id: String,
        /// The appended (trimmed) user text.
        user_text: String,
    },

    /// The AI message grew by `text`; `full_text` is the whole answer so far.
    #[serde(rename = "message.delta")]
    MessageDelta { text: String, full_text: String },

    /// The answer is complete; carries the prose/panel split of the final text.
    #[serde(rename = "message.complete")]
    MessageComplete { reply: ReplyView },

    /// The turn failed; `text` is the localized failure message that was appended.
    #[serde(rename = "message.failed")]
    MessageFailed { text: String },

    /// The send was a no-op.
    #[serde(rename = "rejected")]
    Rejected { reason: RejectReason },

    #[serde(rename = "done")]
    Done,
}

/// Get the SSE event name for a [`ChatEvent`].
pub fn event_name(evt: &ChatEvent) -> &'static str {
    match evt {
        ChatEvent::Start { .. } => "chat.start",
        ChatEvent::MessageDelta { .. } => "message.delta",
        ChatEvent::MessageComplete { .. } => "message.complete",
        ChatEvent::MessageFailed { .. } => "message.failed",
        ChatEvent::Rejected { .. } => "rejected",
        ChatEvent::Done => "done",
    }
}

/// Convert a [`ChatEvent`] to an SSE-formatted string with an `event:` line
/// and a `data:` line holding the JSON payload.
pub fn sse_event(evt: &ChatEvent) -> String {
    let json = serde_json::to_string(evt).unwrap_or_else(|e| {
        serde_json::json!({ "type": "error", "data": { "message": e.to_string() } }).to_string()
    });

    format!("event: {}\ndata: {json}\n\n", event_name(evt))
}
