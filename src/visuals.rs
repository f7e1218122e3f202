//! On-demand visuals for portfolio and service cards.
//!
//! Each "regenerate visual" action is one independent image request. There
//! is no queue and no cap on concurrent requests. A failed request degrades
//! to a static fallback image without surfacing an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::genai::{AspectRatio, ImageGenerator};

/// Image shown when generation fails.
pub const FALLBACK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1518770660439-4636190af475?auto=format&fit=crop&q=80&w=1000";

/// A card visual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visual {
    /// `data:` URL of a generated image, or [`FALLBACK_IMAGE_URL`].
    pub url: String,
    /// Whether `url` is a freshly generated image.
    pub generated: bool,
}

impl Visual {
    fn fallback() -> Self {
        Self {
            url: FALLBACK_IMAGE_URL.to_string(),
            generated: false,
        }
    }
}

/// Prompt for a portfolio project visual.
#[must_use]
pub fn project_prompt(title: &str, category: &str) -> String {
    format!(
        "A professional, cinematic, hyper-realistic architectural or data visualization shot for a project titled '{title}' in the '{category}' industry. Style: Sophisticated tech aesthetic, depth of field, 8k resolution, clean and modern corporate portfolio photography."
    )
}

/// Prompt for a service card visual.
#[must_use]
pub fn service_prompt(service_name: &str) -> String {
    format!(
        "A high-end, professional, minimalistic abstract digital art representation of '{service_name}' for a corporate technology website. Style: Blueprint, dark mode, cinematic lighting, ultra-sharp details, vector aesthetic, tech-driven."
    )
}

/// Generates card visuals through an [`ImageGenerator`].
#[derive(Clone)]
pub struct VisualService {
    generator: Arc<dyn ImageGenerator>,
}

impl std::fmt::Debug for VisualService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualService").finish_non_exhaustive()
    }
}

impl VisualService {
    #[must_use]
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self { generator }
    }

    /// 4:3 visual for a portfolio project.
    pub async fn project_visual(&self, title: &str, category: &str) -> Visual {
        self.generate(&project_prompt(title, category), AspectRatio::Landscape4x3)
            .await
    }

    /// 16:9 visual for a service card.
    pub async fn service_visual(&self, service_name: &str) -> Visual {
        self.generate(&service_prompt(service_name), AspectRatio::Wide16x9)
            .await
    }

    async fn generate(&self, prompt: &str, aspect: AspectRatio) -> Visual {
        match self.generator.generate_image(prompt, aspect).await {
            Ok(url) => {
                tracing::info!(name: "visual.generated", aspect = aspect.as_str(), "Visual generated");
                Visual {
                    url,
                    generated: true,
                }
            }
            Err(e) => {
                tracing::warn!(
                    name: "visual.fallback",
                    aspect = aspect.as_str(),
                    error = %e,
                    "Visual generation failed, using fallback image"
                );
                Visual::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::ScriptedDriver;

    #[tokio::test]
    async fn test_project_visual_uses_landscape_ratio() {
        let driver = Arc::new(ScriptedDriver::replying(Vec::<String>::new()).with_image("aGVsbG8="));
        let service = VisualService::new(driver.clone());

        let visual = service
            .project_visual("Telco Network Monitoring", "Infrastructure")
            .await;

        assert!(visual.generated);
        assert_eq!(visual.url, "data:image/png;base64,aGVsbG8=");
        let (prompt, aspect) = &driver.image_prompts()[0];
        assert_eq!(*aspect, AspectRatio::Landscape4x3);
        assert!(prompt.contains("'Telco Network Monitoring'"));
        assert!(prompt.contains("'Infrastructure' industry"));
    }

    #[tokio::test]
    async fn test_failure_degrades_to_fallback() {
        let driver = Arc::new(ScriptedDriver::replying(Vec::<String>::new()));
        let service = VisualService::new(driver.clone());

        let visual = service.service_visual("Data & Analytics Platforms").await;

        assert_eq!(
            visual,
            Visual {
                url: FALLBACK_IMAGE_URL.to_string(),
                generated: false,
            }
        );
        assert_eq!(driver.image_prompts()[0].1, AspectRatio::Wide16x9);
    }
}
