//! Rendered chat history, as swapped into the widget on load.

use crate::chat::{Message, Role, split_reply};
use crate::content::Language;

use super::{escape, markdown, panel};

/// Render every message of a history.
///
/// User messages are shown as escaped plain text. AI messages are split
/// into Markdown prose and an optional panel. An empty history renders the
/// localized empty state.
#[must_use]
pub fn render(messages: &[Message], lang: Language) -> String {
    if messages.is_empty() {
        return format!(
            r#"<div class="chat-empty">{}</div>"#,
            escape(lang.widget_strings().empty_state)
        );
    }

    let mut out = String::new();
    for message in messages {
        out.push_str(&render_message(message));
        out.push('\n');
    }
    out
}

/// Render one message bubble.
#[must_use]
pub fn render_message(message: &Message) -> String {
    match message.role {
        Role::User => format!(
            r#"<div class="chat-msg chat-msg--user"><p>{}</p></div>"#,
            escape(&message.text)
        ),
        Role::Ai => {
            let view = split_reply(&message.text);
            let panel = view.panel.as_ref().map(panel::render).unwrap_or_default();
            format!(
                r#"<div class="chat-msg chat-msg--ai"><div class="prose">{}</div>{panel}</div>"#,
                markdown::render(&view.prose)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_shows_empty_state() {
        let html = render(&[], Language::Id);
        assert!(html.contains("chat-empty"));
        assert!(html.contains(&escape(Language::Id.widget_strings().empty_state)));
    }

    #[test]
    fn test_ai_message_with_panel() {
        let messages = vec![
            Message::user("<b>hi</b>"),
            Message::ai(
                r#"**Sure.** [SYSTEM_UI: {"type":"ROADMAP","title":"Plan","data":{"steps":[{"step":"Audit","desc":"x"}]}}]"#,
            ),
        ];
        let html = render(&messages, Language::En);

        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(html.contains("<strong>Sure.</strong>"));
        assert!(html.contains(r#"data-panel="roadmap""#));
        assert!(!html.contains("SYSTEM_UI"));
    }
}
