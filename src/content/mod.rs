//! Static bilingual site copy.
//!
//! The copy tree is read once at startup from YAML (the embedded
//! `content/site.yaml` unless a path is configured) and shared read-only
//! afterwards.
//!
//! # Example
//!
//! ```rust
//! use slashtech_site::content::{Language, SiteContent};
//!
//! let site = SiteContent::embedded().unwrap();
//! assert_eq!(site.get(Language::En).nav.contact, "Contact");
//! ```

mod lang;

pub use lang::{Language, UnknownLanguage, WidgetStrings};

use std::path::Path;

use serde::{Deserialize, Serialize};

const EMBEDDED_CONTENT: &str = include_str!("../../content/site.yaml");

/// Errors raised while loading the copy tree.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read content file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid content document: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Copy for both languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteContent {
    #[serde(rename = "EN")]
    pub en: Content,
    #[serde(rename = "ID")]
    pub id: Content,
}

impl SiteContent {
    /// Parse the copy bundled into the binary.
    pub fn embedded() -> Result<Self, ContentError> {
        Self::from_yaml(EMBEDDED_CONTENT)
    }

    /// Parse a YAML document holding `EN` and `ID` trees.
    pub fn from_yaml(source: &str) -> Result<Self, ContentError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Load from `path` when given, otherwise fall back to the embedded copy.
    pub fn load(path: Option<&Path>) -> Result<Self, ContentError> {
        let Some(path) = path else {
            return Self::embedded();
        };
        let source = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&source)
    }

    /// Copy tree for one language.
    #[must_use]
    pub fn get(&self, lang: Language) -> &Content {
        match lang {
            Language::En => &self.en,
            Language::Id => &self.id,
        }
    }
}

/// Copy tree of one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub nav: Nav,
    pub hero: Hero,
    pub about_us: AboutUs,
    pub problem: Problem,
    pub solutions: Solutions,
    pub how_it_works: HowItWorks,
    pub impact: Impact,
    pub industry: Industry,
    pub portfolio: Portfolio,
    pub why_choose: WhyChoose,
    pub testimonials: Testimonials,
    pub partnership: Partnership,
    pub final_cta: FinalCta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nav {
    pub solutions: String,
    pub work: String,
    pub about: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub headline: String,
    pub subheadline: String,
    pub value_statement: String,
    pub cta1: String,
    pub cta2: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutUs {
    pub title: String,
    pub subtitle: String,
    pub mission: TitledText,
    pub vision: TitledText,
    pub values: Values,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitledText {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Values {
    pub title: String,
    pub items: Vec<ValueItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueItem {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub title: String,
    pub copy: String,
    pub challenges: Vec<String>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solutions {
    pub title: String,
    pub copy: String,
    pub items: Vec<String>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HowItWorks {
    pub title: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub title: String,
    pub outcomes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Industry {
    pub title: String,
    pub sectors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub title: String,
    pub projects: Vec<Project>,
}

/// A case study card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub metric: String,
    pub metric_label: String,
    /// Static image URL; an empty string asks the client to generate one.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhyChoose {
    pub title: String,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonials {
    pub title: String,
    pub items: Vec<Testimonial>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub logo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partnership {
    pub title: String,
    pub copy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalCta {
    pub title: String,
    pub copy: String,
    pub cta1: String,
    pub cta2: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_content_parses() {
        let site = SiteContent::embedded().unwrap();
        assert_eq!(site.en.nav.solutions, "Solutions");
        assert_eq!(site.id.nav.solutions, "Solusi");
    }

    #[test]
    fn test_languages_share_structure() {
        let site = SiteContent::embedded().unwrap();
        assert_eq!(
            site.en.portfolio.projects.len(),
            site.id.portfolio.projects.len()
        );
        assert_eq!(
            site.en.how_it_works.steps.len(),
            site.id.how_it_works.steps.len()
        );
        let en_ids: Vec<_> = site.en.portfolio.projects.iter().map(|p| &p.id).collect();
        let id_ids: Vec<_> = site.id.portfolio.projects.iter().map(|p| &p.id).collect();
        assert_eq!(en_ids, id_ids);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = SiteContent::load(Some(Path::new("does/not/exist.yaml"))).unwrap_err();
        assert!(matches!(err, ContentError::Io { .. }));
    }

    #[test]
    fn test_serializes_camel_case() {
        let site = SiteContent::embedded().unwrap();
        let json = serde_json::to_value(site.get(Language::En)).unwrap();
        assert!(json.get("aboutUs").is_some());
        assert!(json["hero"].get("valueStatement").is_some());
    }
}
