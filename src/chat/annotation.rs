//! Extraction of the `[SYSTEM_UI: {...}]` panel annotation from AI answers.
//!
//! The model is instructed, but not guaranteed, to end an answer with a
//! bracketed JSON object describing a structured panel. The first
//! `[SYSTEM_UI: {` opening is located and exactly one JSON object is read
//! from it, so nested arrays such as `[{"status":"up"}]` do not end the
//! annotation early. When the object parses as a panel and is closed by
//! `]`, the annotation is cut from the prose and the panel is returned
//! separately. Otherwise the prose is left exactly as received and no panel
//! is produced.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

static SYSTEM_UI_OPENING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[SYSTEM_UI:\s*\{").expect("annotation pattern is valid")
});

/// Kind of structured panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PanelKind {
    /// Metrics with an up/down status and a bar chart.
    Dashboard,
    /// Node health grid with a global load figure.
    Infrastructure,
    /// Numbered project steps.
    Roadmap,
}

/// Panel description parsed out of an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemUiData {
    #[serde(rename = "type")]
    pub kind: PanelKind,
    #[serde(default, deserialize_with = "stringish")]
    pub title: String,
    /// Raw payload; see [`SystemUiData::payload`] for the typed view.
    #[serde(default)]
    pub data: Value,
}

impl SystemUiData {
    /// Typed view of `data` for this panel kind.
    ///
    /// Decoding is per field: a field that is missing or has the wrong
    /// shape comes back empty instead of discarding the panel.
    #[must_use]
    pub fn payload(&self) -> PanelPayload {
        match self.kind {
            PanelKind::Dashboard => PanelPayload::Dashboard {
                metrics: field(&self.data, "metrics"),
                chart: field(&self.data, "chart"),
            },
            PanelKind::Infrastructure => PanelPayload::Infrastructure {
                nodes: field(&self.data, "nodes"),
                load: field(&self.data, "load"),
            },
            PanelKind::Roadmap => PanelPayload::Roadmap {
                steps: field(&self.data, "steps"),
            },
        }
    }
}

/// Typed panel payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelPayload {
    Dashboard { metrics: Vec<Metric>, chart: Vec<f64> },
    Infrastructure { nodes: Vec<Node>, load: Option<f64> },
    Roadmap { steps: Vec<RoadmapStep> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(default, deserialize_with = "stringish")]
    pub label: String,
    #[serde(default, deserialize_with = "stringish")]
    pub value: String,
    #[serde(default, deserialize_with = "stringish")]
    pub status: String,
}

impl Metric {
    /// Anything other than `"up"` renders as down.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.status == "up"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, deserialize_with = "stringish")]
    pub name: String,
    #[serde(default, deserialize_with = "stringish")]
    pub status: String,
}

impl Node {
    /// Anything other than `"active"` renders as alerting.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapStep {
    #[serde(default, deserialize_with = "stringish")]
    pub step: String,
    #[serde(default, deserialize_with = "stringish")]
    pub desc: String,
}

/// An AI answer split into display prose and an optional panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyView {
    pub prose: String,
    pub panel: Option<SystemUiData>,
}

/// Split `text` into prose and panel.
///
/// - no annotation: prose is `text`, no panel;
/// - parseable annotation: prose is `text` without the annotation, trimmed;
/// - unparseable annotation: prose is `text` unmodified, no panel.
#[must_use]
pub fn split_reply(text: &str) -> ReplyView {
    match locate_annotation(text) {
        Some((start, end, panel)) => {
            let mut prose = String::with_capacity(text.len());
            prose.push_str(&text[..start]);
            prose.push_str(&text[end..]);
            ReplyView {
                prose: prose.trim().to_string(),
                panel: Some(panel),
            }
        }
        None => ReplyView {
            prose: text.to_string(),
            panel: None,
        },
    }
}

/// Byte range of the first well-formed annotation and its parsed panel.
fn locate_annotation(text: &str) -> Option<(usize, usize, SystemUiData)> {
    let opening = SYSTEM_UI_OPENING.find(text)?;
    let json_start = opening.end() - 1;
    let rest = &text[json_start..];

    let mut values = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
    let value = match values.next()? {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unparseable SYSTEM_UI annotation");
            return None;
        }
    };
    let json_len = values.byte_offset();

    let after = &rest[json_len..];
    let closing = after.trim_start();
    if !closing.starts_with(']') {
        return None;
    }
    let end = json_start + json_len + (after.len() - closing.len()) + 1;

    match serde_json::from_value::<SystemUiData>(value) {
        Ok(panel) => Some((opening.start(), end, panel)),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring SYSTEM_UI annotation with unknown shape");
            None
        }
    }
}

fn field<T: DeserializeOwned + Default>(data: &Value, key: &str) -> T {
    data.get(key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

/// Accept strings, numbers and booleans where the panel expects text.
fn stringish<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_annotation_keeps_text() {
        let view = split_reply("Plain **markdown** answer.");
        assert_eq!(view.prose, "Plain **markdown** answer.");
        assert!(view.panel.is_none());
    }

    #[test]
    fn test_dashboard_annotation_is_stripped() {
        let text = r#"Here is the overview.
[SYSTEM_UI: {"type":"DASHBOARD","title":"X","data":{}}]"#;
        let view = split_reply(text);
        assert_eq!(view.prose, "Here is the overview.");
        assert!(!view.prose.contains("SYSTEM_UI"));
        let panel = view.panel.unwrap();
        assert_eq!(panel.title, "X");
        assert_eq!(panel.kind, PanelKind::Dashboard);
    }

    #[test]
    fn test_malformed_annotation_leaves_prose_untouched() {
        let text = r#"Answer text [SYSTEM_UI: {"type":"DASHBOARD","title":}] trailing"#;
        let view = split_reply(text);
        assert_eq!(view.prose, text);
        assert!(view.panel.is_none());
    }

    #[test]
    fn test_unknown_kind_is_a_parse_failure() {
        let text = r#"Hi [SYSTEM_UI: {"type":"CHART","title":"Y","data":{}}]"#;
        let view = split_reply(text);
        assert_eq!(view.prose, text);
        assert!(view.panel.is_none());
    }

    #[test]
    fn test_only_first_annotation_is_used() {
        let text = concat!(
            r#"A [SYSTEM_UI: {"type":"ROADMAP","title":"First","data":{}}] "#,
            r#"B [SYSTEM_UI: {"type":"ROADMAP","title":"Second","data":{}}]"#
        );
        let view = split_reply(text);
        assert_eq!(view.panel.unwrap().title, "First");
        assert!(view.prose.starts_with("A  B"));
        assert!(view.prose.contains("Second"));
    }

    #[test]
    fn test_unclosed_annotation_is_ignored() {
        let text = r#"Intro [SYSTEM_UI: {"type":"ROADMAP","title":"T","data":{}} and more"#;
        let view = split_reply(text);
        assert_eq!(view.prose, text);
        assert!(view.panel.is_none());
    }

    #[test]
    fn test_nested_arrays_do_not_end_annotation() {
        let text = r#"Done. [SYSTEM_UI: {"type":"INFRASTRUCTURE","title":"Grid","data":{"nodes":[{"name":"BTS-1","status":"active"},{"name":"BTS-2","status":"alert"}],"load":72}}]"#;
        let view = split_reply(text);
        assert_eq!(view.prose, "Done.");
        let PanelPayload::Infrastructure { nodes, load } = view.panel.unwrap().payload() else {
            panic!("expected infrastructure payload");
        };
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].is_active());
        assert!(!nodes[1].is_active());
        assert_eq!(load, Some(72.0));
    }

    #[test]
    fn test_dashboard_payload_is_lenient() {
        let panel: SystemUiData = serde_json::from_str(
            r#"{"type":"DASHBOARD","title":"Ops","data":{"metrics":[{"label":"Uptime","value":99.9,"status":"up"}],"chart":"oops"}}"#,
        )
        .unwrap();
        let PanelPayload::Dashboard { metrics, chart } = panel.payload() else {
            panic!("expected dashboard payload");
        };
        assert_eq!(metrics[0].value, "99.9");
        assert!(metrics[0].is_up());
        assert!(chart.is_empty());
    }

    #[test]
    fn test_roadmap_payload() {
        let panel: SystemUiData = serde_json::from_str(
            r#"{"type":"ROADMAP","title":"Plan","data":{"steps":[{"step":"Discover","desc":"Map data"},{"step":"Build"}]}}"#,
        )
        .unwrap();
        let PanelPayload::Roadmap { steps } = panel.payload() else {
            panic!("expected roadmap payload");
        };
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].desc, "");
    }

    #[test]
    fn test_numeric_title_is_accepted() {
        let view = split_reply(r#"Plan below. [SYSTEM_UI: {"type":"ROADMAP","title":2025,"data":{}}]"#);
        assert_eq!(view.prose, "Plan below.");
        assert_eq!(view.panel.unwrap().title, "2025");

        let panel: SystemUiData =
            serde_json::from_str(r#"{"type":"DASHBOARD","title":null}"#).unwrap();
        assert_eq!(panel.title, "");
    }
}
