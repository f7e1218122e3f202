//! Server-rendered HTML.
//!
//! # Structure
//!
//! - [`page`]: page shell with the bilingual sections and the chat widget mount
//! - [`panel`]: structured panels parsed from AI answers
//! - [`markdown`]: Markdown prose to HTML
//! - [`reveal`]: scroll-reveal presets attached to sections
//! - [`history`]: rendered chat history fragment

pub mod history;
pub mod markdown;
pub mod page;
pub mod panel;
pub mod reveal;

/// Escape text for HTML element content and double-quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
