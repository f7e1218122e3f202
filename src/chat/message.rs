//! Chat messages as stored in the history.

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

/// One entry of the chat history.
///
/// Serialized as `{"role": "user" | "ai", "text": "..."}`, the same shape
/// the widget keeps in its history key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_string(&Message::ai("Hello")).unwrap();
        assert_eq!(json, r#"{"role":"ai","text":"Hello"}"#);

        let parsed: Vec<Message> =
            serde_json::from_str(r#"[{"role":"user","text":"Hi"},{"role":"ai","text":""}]"#)
                .unwrap();
        assert_eq!(parsed, vec![Message::user("Hi"), Message::ai("")]);
    }
}
