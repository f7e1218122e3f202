//! Active UI language and the fixed strings that depend on it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language of the page and the chat widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// English.
    #[default]
    #[serde(rename = "EN", alias = "en")]
    En,
    /// Bahasa Indonesia.
    #[serde(rename = "ID", alias = "id")]
    Id,
}

impl Language {
    /// Both languages, in toggle order.
    pub const ALL: [Self; 2] = [Self::En, Self::Id];

    /// Upper-case language code as used in URLs and payloads.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "EN",
            Self::Id => "ID",
        }
    }

    /// BCP-47 tag for the `lang` attribute of the page.
    #[must_use]
    pub fn html_tag(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Id => "id",
        }
    }

    /// The other language.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::En => Self::Id,
            Self::Id => Self::En,
        }
    }

    /// Text of the single AI message appended when a chat turn fails.
    #[must_use]
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::En => "Network interruption.",
            Self::Id => "Gangguan jaringan.",
        }
    }

    /// Prompts offered as chips under the chat window.
    #[must_use]
    pub fn suggested_prompts(self) -> &'static [&'static str] {
        match self {
            Self::En => &[
                "What services do you offer?",
                "How do you monitor 400+ BTS?",
                "Dashboard for logistics?",
                "How do I start a project?",
                "Tech stack used",
            ],
            Self::Id => &[
                "Layanan apa saja?",
                "Bagaimana monitor 400+ BTS?",
                "Dashboard logistik?",
                "Cara mulai proyek?",
                "Teknologi yang digunakan",
            ],
        }
    }

    /// Strings used by the chat widget chrome.
    #[must_use]
    pub fn widget_strings(self) -> WidgetStrings {
        match self {
            Self::En => WidgetStrings {
                placeholder: "Request system data...",
                thinking: "Processing digital nodes...",
                empty_state: "Query Slashtech intelligence protocol for system architecture data.",
                clear_confirmation: "Wipe intelligence history?",
            },
            Self::Id => WidgetStrings {
                placeholder: "Minta data sistem...",
                thinking: "Memproses simpul data...",
                empty_state: "Kueri protokol intelijen Slashtech untuk data arsitektur sistem.",
                clear_confirmation: "Hapus riwayat kecerdasan?",
            },
        }
    }
}

/// Localized chrome of the chat widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WidgetStrings {
    pub placeholder: &'static str,
    pub thinking: &'static str,
    pub empty_state: &'static str,
    pub clear_confirmation: &'static str,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a language code is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language code: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EN" => Ok(Self::En),
            "ID" => Ok(Self::Id),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!(" ID ".parse::<Language>().unwrap(), Language::Id);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_serde_uses_upper_case_codes() {
        let json = serde_json::to_string(&Language::Id).unwrap();
        assert_eq!(json, "\"ID\"");
        let parsed: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Language::En);
    }

    #[test]
    fn test_failure_message_per_language() {
        assert_eq!(Language::En.failure_message(), "Network interruption.");
        assert_eq!(Language::Id.failure_message(), "Gangguan jaringan.");
    }

    #[test]
    fn test_five_prompts_each() {
        for lang in Language::ALL {
            assert_eq!(lang.suggested_prompts().len(), 5);
        }
        assert_eq!(Language::En.toggled(), Language::Id);
    }
}
