//! Fire-once entrance presets for page sections.
//!
//! A preset is plain data emitted as `data-reveal-*` attributes. The client
//! script plays each entrance once when the section crosses its `start`
//! threshold; nothing is tracked server side.

use serde::Serialize;

/// Entrance tween for one section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevealPreset {
    /// Starting opacity.
    pub opacity: f32,
    /// Starting vertical offset in pixels.
    pub translate_y: i32,
    /// Seconds.
    pub duration: f32,
    pub ease: &'static str,
    /// Scroll trigger threshold, e.g. `top 70%`.
    pub start: &'static str,
    /// Delay between child elements, in seconds.
    pub stagger: Option<f32>,
}

impl RevealPreset {
    /// Header fade-up.
    pub const HEADER: Self = Self {
        opacity: 0.0,
        translate_y: 30,
        duration: 1.0,
        ease: "power3.out",
        start: "top 70%",
        stagger: Some(0.2),
    };

    /// Card grid, staggered.
    pub const CARDS: Self = Self {
        opacity: 0.0,
        translate_y: 50,
        duration: 0.8,
        ease: "power2.out",
        start: "top 80%",
        stagger: Some(0.15),
    };

    /// Single block, no stagger.
    pub const FADE: Self = Self {
        opacity: 0.0,
        translate_y: 20,
        duration: 1.2,
        ease: "power2.out",
        start: "top 85%",
        stagger: None,
    };

    /// `data-reveal-*` attributes, with a leading space.
    #[must_use]
    pub fn data_attributes(&self) -> String {
        let mut attrs = format!(
            r#" data-reveal data-reveal-opacity="{}" data-reveal-y="{}" data-reveal-duration="{}" data-reveal-ease="{}" data-reveal-start="{}""#,
            self.opacity, self.translate_y, self.duration, self.ease, self.start
        );
        if let Some(stagger) = self.stagger {
            attrs.push_str(&format!(r#" data-reveal-stagger="{stagger}""#));
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes() {
        let attrs = RevealPreset::HEADER.data_attributes();
        assert!(attrs.starts_with(" data-reveal "));
        assert!(attrs.contains(r#"data-reveal-y="30""#));
        assert!(attrs.contains(r#"data-reveal-start="top 70%""#));
        assert!(attrs.contains(r#"data-reveal-stagger="0.2""#));

        assert!(!RevealPreset::FADE.data_attributes().contains("stagger"));
    }
}
