//! The chat widget's server side.
//!
//! # Architecture
//!
//! - [`Message`]: one history entry (`user` or `ai`)
//! - [`ChatSession`]: a visitor's history, busy flag and streaming turn logic
//! - [`ChatSessions`]: registry of live sessions keyed by visitor id
//! - [`split_reply`]: prose / panel split of an AI answer
//!
//! # Example
//!
//! ```rust
//! use slashtech_site::chat::split_reply;
//!
//! let view = split_reply(r#"Done. [SYSTEM_UI: {"type":"ROADMAP","title":"Plan","data":{}}]"#);
//! assert_eq!(view.prose, "Done.");
//! assert_eq!(view.panel.unwrap().title, "Plan");
//! ```

mod annotation;
mod message;
mod session;

pub use annotation::{
    Metric, Node, PanelKind, PanelPayload, ReplyView, RoadmapStep, SystemUiData, split_reply,
};
pub use message::{Message, Role};
pub use session::{
    CHAT_HISTORY_KEY, ChatSession, ChatSessions, DEFAULT_IDLE_TIMEOUT, SendOutcome, TurnStream,
};
