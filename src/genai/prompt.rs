//! Fixed instructions sent with every chat turn.

use crate::content::Language;

/// Opening tag of the panel annotation the model is asked to append.
pub const SYSTEM_UI_TAG: &str = "SYSTEM_UI";

fn company_context(lang: Language) -> &'static str {
    match lang {
        Language::En => {
            "Slashtech: Professional system architects.
Specialties: ERP/CRM Integration, BTS/Telco Monitoring, Public Service Analytics, AI Consulting.
Approach: Functional, resilient, transparent.
Projects: 400+ BTS nodes monitored for Telco; 32% efficiency gain for Gov Analytics."
        }
        Language::Id => {
            "Slashtech: Arsitek sistem profesional.
Spesialisasi: Integrasi ERP/CRM, Monitoring BTS/Telko, Analitik Layanan Publik, Konsultasi AI.
Pendekatan: Fungsional, tangguh, transparan.
Proyek: 400+ node BTS dipantau; 32% peningkatan efisiensi analitik pemerintah."
        }
    }
}

/// System instruction for a chat turn in `lang`.
///
/// Describes the company, the answer register, and the trailing
/// `[SYSTEM_UI: {...}]` annotation with its three panel shapes.
#[must_use]
pub fn system_instruction(lang: Language) -> String {
    let context = company_context(lang);
    format!(
        r#"You are the Slashtech Intelligence Core.
{context}
- Be authoritative, technical yet accessible, and professional.
- Format responses with Markdown (use bolding for emphasis, headers for structure).
- If explaining a system or use case, YOU MUST append a UI block in JSON syntax:
  [{SYSTEM_UI_TAG}: {{"type": "DASHBOARD" | "INFRASTRUCTURE" | "ROADMAP", "title": "System Name", "data": {{...}}}}]

UI Type Rules:
1. DASHBOARD: Use for metrics. Data: {{"metrics": [{{"label": "Name", "value": "Val", "status": "up"|"down"}}], "chart": [numbers]}}
2. INFRASTRUCTURE: Use for health/monitoring. Data: {{"nodes": [{{"name": "Node A", "status": "active"|"alert"}}], "load": number}}
3. ROADMAP: Use for project steps. Data: {{"steps": [{{"step": "Step 1", "desc": "Info"}}]}}
- Keep the UI block on a single line at the very end of the answer."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_carries_language_context() {
        let en = system_instruction(Language::En);
        let id = system_instruction(Language::Id);
        assert!(en.contains("Professional system architects"));
        assert!(id.contains("Arsitek sistem profesional"));
    }

    #[test]
    fn test_instruction_describes_annotation_protocol() {
        let text = system_instruction(Language::En);
        assert!(text.contains("[SYSTEM_UI: {\"type\""));
        for kind in ["DASHBOARD", "INFRASTRUCTURE", "ROADMAP"] {
            assert!(text.contains(kind));
        }
    }
}
