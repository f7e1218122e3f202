//! HTML for structured panels.

use std::fmt::Write;

use crate::chat::{Metric, Node, PanelKind, PanelPayload, RoadmapStep, SystemUiData};

use super::escape;

/// Render a panel card for an AI answer.
#[must_use]
pub fn render(panel: &SystemUiData) -> String {
    let body = match panel.payload() {
        PanelPayload::Dashboard { metrics, chart } => dashboard(&metrics, &chart),
        PanelPayload::Infrastructure { nodes, load } => infrastructure(&nodes, load),
        PanelPayload::Roadmap { steps } => roadmap(&steps),
    };

    format!(
        r#"<div class="system-panel" data-panel="{kind}">
  <div class="system-panel__head">
    <h5 class="system-panel__title">{title}</h5>
    <span class="system-panel__badge">Live System</span>
  </div>
{body}
  <div class="system-panel__foot">Request full specification</div>
</div>"#,
        kind = kind_attr(panel),
        title = escape(&panel.title),
    )
}

fn kind_attr(panel: &SystemUiData) -> &'static str {
    match panel.kind {
        PanelKind::Dashboard => "dashboard",
        PanelKind::Infrastructure => "infrastructure",
        PanelKind::Roadmap => "roadmap",
    }
}

fn dashboard(metrics: &[Metric], chart: &[f64]) -> String {
    let mut out = String::from("  <div class=\"panel-metrics\">\n");
    for m in metrics {
        let _ = writeln!(
            out,
            r#"    <div class="panel-metric"><p class="panel-metric__label">{}</p><span class="panel-metric__value">{}</span><i class="dot {}"></i></div>"#,
            escape(&m.label),
            escape(&m.value),
            if m.is_up() { "dot--up" } else { "dot--down" },
        );
    }
    out.push_str("  </div>\n  <div class=\"panel-chart\">\n");
    for v in chart {
        let _ = writeln!(
            out,
            r#"    <div class="panel-chart__bar" style="height: {}%"></div>"#,
            v.clamp(0.0, 100.0),
        );
    }
    out.push_str("  </div>");
    out
}

fn infrastructure(nodes: &[Node], load: Option<f64>) -> String {
    let load = load.map_or_else(String::new, |l| l.to_string());
    let mut out = format!(
        "  <div class=\"panel-load\"><span>Global Load</span><strong>{load}%</strong></div>\n  <div class=\"panel-nodes\">\n"
    );
    for n in nodes {
        let _ = writeln!(
            out,
            r#"    <div class="panel-node"><i class="dot {}"></i><span>{}</span></div>"#,
            if n.is_active() { "dot--active" } else { "dot--alert" },
            escape(&n.name),
        );
    }
    out.push_str("  </div>");
    out
}

fn roadmap(steps: &[RoadmapStep]) -> String {
    let mut out = String::from("  <ol class=\"panel-roadmap\">\n");
    for (i, s) in steps.iter().enumerate() {
        let _ = writeln!(
            out,
            r#"    <li><span class="panel-roadmap__num">{}</span><h6>{}</h6><p>{}</p></li>"#,
            i + 1,
            escape(&s.step),
            escape(&s.desc),
        );
    }
    out.push_str("  </ol>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::split_reply;

    fn panel_of(text: &str) -> SystemUiData {
        split_reply(text).panel.expect("panel parses")
    }

    #[test]
    fn test_dashboard_status_dots() {
        let panel = panel_of(
            r#"[SYSTEM_UI: {"type":"DASHBOARD","title":"Ops","data":{"metrics":[{"label":"Uptime","value":"99.9%","status":"up"},{"label":"Errors","value":"12","status":"down"}],"chart":[40,120]}}]"#,
        );
        let html = render(&panel);

        assert!(html.contains(r#"data-panel="dashboard""#));
        assert!(html.contains("Uptime"));
        assert!(html.contains("dot--up"));
        assert!(html.contains("dot--down"));
        assert!(html.contains("height: 40%"));
        assert!(html.contains("height: 100%"));
    }

    #[test]
    fn test_infrastructure_non_active_is_alert() {
        let panel = panel_of(
            r#"[SYSTEM_UI: {"type":"INFRASTRUCTURE","title":"Grid","data":{"load":73,"nodes":[{"name":"jkt-1","status":"active"},{"name":"sby-2","status":"degraded"}]}}]"#,
        );
        let html = render(&panel);

        assert!(html.contains("<strong>73%</strong>"));
        assert!(html.contains("dot--active"));
        assert!(html.contains("dot--alert"));
    }

    #[test]
    fn test_roadmap_is_numbered_and_escaped() {
        let panel = panel_of(
            r#"[SYSTEM_UI: {"type":"ROADMAP","title":"<Plan>","data":{"steps":[{"step":"Audit","desc":"Map systems"},{"step":"Build","desc":"A & B"}]}}]"#,
        );
        let html = render(&panel);

        assert!(html.contains("&lt;Plan&gt;"));
        assert!(html.contains(r#"<span class="panel-roadmap__num">2</span><h6>Build</h6><p>A &amp; B</p>"#));
    }
}
