//! Presentation of a lesson plan: labeled sections, a Markdown view, and a
//! paginated PDF export.

pub mod layout;
pub mod pdf;

pub use layout::{Page, PageLayout, TextLine, paginate};
pub use pdf::write_pdf;

use crate::plan::LessonPlan;

/// Document title shown above the sections.
pub const DOCUMENT_TITLE: &str = "Plano de Aula";

pub const TITLE_OBJECTIVE: &str = "Objetivo da Aula";
pub const TITLE_STRUCTURE: &str = "Estrutura da Aula";
pub const TITLE_MAIN_ACTIVITY: &str = "Atividade Principal";
pub const TITLE_QUICK_ASSESSMENT: &str = "Avaliação Rápida";
pub const TITLE_TEACHER_NOTES: &str = "Observações para o Professor";

/// A labeled group of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// Phase heading inside the structure section.
    Subheading(String),
    Paragraph(String),
}

/// Group a plan into sections.
///
/// Objective and structure are always present. The main activity, quick
/// assessment and teacher notes are skipped when empty or absent.
pub fn sections(plan: &LessonPlan) -> Vec<Section> {
    let mut out = Vec::with_capacity(5);

    out.push(Section {
        title: TITLE_OBJECTIVE.to_string(),
        items: vec![Item::Paragraph(plan.objective().unwrap_or_default())],
    });

    let mut structure = Vec::new();
    for phase in plan.phases() {
        structure.push(Item::Subheading(phase_heading(&phase.label, &phase.minutes)));
        structure.push(Item::Paragraph(phase.description));
    }
    out.push(Section {
        title: TITLE_STRUCTURE.to_string(),
        items: structure,
    });

    let optional = [
        (TITLE_MAIN_ACTIVITY, plan.main_activity()),
        (TITLE_QUICK_ASSESSMENT, plan.quick_assessment()),
        (TITLE_TEACHER_NOTES, plan.teacher_notes()),
    ];
    for (title, text) in optional {
        if let Some(text) = text {
            out.push(Section {
                title: title.to_string(),
                items: vec![Item::Paragraph(text)],
            });
        }
    }

    out
}

fn phase_heading(label: &str, minutes: &str) -> String {
    if minutes.is_empty() {
        label.to_string()
    } else {
        format!("{label} ({minutes} min)")
    }
}

/// Render sections as Markdown for on-screen display.
pub fn to_markdown(sections: &[Section]) -> String {
    let mut md = format!("# {DOCUMENT_TITLE}\n");
    for section in sections {
        md.push_str(&format!("\n## {}\n", section.title));
        for item in section.items.iter().filter(|i| !item_is_blank(i)) {
            match item {
                Item::Subheading(text) => md.push_str(&format!("\n### {text}\n")),
                Item::Paragraph(text) => md.push_str(&format!("\n{text}\n")),
            }
        }
    }
    md
}

/// Render a plan straight to PDF bytes with the default A4 layout.
pub fn export_pdf(plan: &LessonPlan) -> Vec<u8> {
    let layout = PageLayout::default();
    let pages = paginate(&sections(plan), &layout);
    write_pdf(&pages, &layout)
}

fn item_is_blank(item: &Item) -> bool {
    match item {
        Item::Subheading(t) | Item::Paragraph(t) => t.trim().is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan(value: serde_json::Value) -> LessonPlan {
        LessonPlan::from_value(value).unwrap()
    }

    #[test]
    fn minimal_plan_has_required_sections_only() {
        let s = sections(&plan(json!({ "objetivo_da_aula": "x", "estrutura": [] })));
        let titles: Vec<&str> = s.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec![TITLE_OBJECTIVE, TITLE_STRUCTURE]);
        assert_eq!(s[0].items, vec![Item::Paragraph("x".to_string())]);
        assert!(s[1].items.is_empty());
    }

    #[test]
    fn optional_sections_appear_when_filled() {
        let s = sections(&plan(json!({
            "objetivo_da_aula": "x",
            "estrutura": [],
            "atividade_principal": "Jogo",
            "avaliacao_rapida": "",
            "observacoes_para_o_professor": "Notas",
        })));
        let titles: Vec<&str> = s.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![TITLE_OBJECTIVE, TITLE_STRUCTURE, TITLE_MAIN_ACTIVITY, TITLE_TEACHER_NOTES]
        );
    }

    #[test]
    fn phases_become_headed_paragraphs() {
        let s = sections(&plan(json!({
            "estrutura": [
                { "etapa": "Abertura", "tempo_minutos": "10", "descricao": "Roda de conversa" },
                { "etapa": "Fechamento", "descricao": "Síntese" }
            ]
        })));
        assert_eq!(
            s[1].items,
            vec![
                Item::Subheading("Abertura (10 min)".to_string()),
                Item::Paragraph("Roda de conversa".to_string()),
                Item::Subheading("Fechamento".to_string()),
                Item::Paragraph("Síntese".to_string()),
            ]
        );
    }

    #[test]
    fn markdown_view() {
        let s = sections(&plan(json!({
            "objetivo_da_aula": "Entender frações",
            "estrutura": [{ "etapa": "Abertura", "tempo_minutos": 5, "descricao": "Pergunta" }],
            "avaliacao_rapida": "Três perguntas",
        })));
        let md = to_markdown(&s);
        assert!(md.starts_with("# Plano de Aula\n"));
        assert!(md.contains("\n## Objetivo da Aula\n\nEntender frações\n"));
        assert!(md.contains("\n### Abertura (5 min)\n\nPergunta\n"));
        assert!(md.contains("\n## Avaliação Rápida\n\nTrês perguntas\n"));
        assert!(!md.contains("Atividade Principal"));
    }

    #[test]
    fn export_pdf_produces_document() {
        let pdf = export_pdf(&plan(json!({ "objetivo_da_aula": "x", "estrutura": [] })));
        assert!(pdf.starts_with(b"%PDF-"));
        assert!(pdf.ends_with(b"%%EOF\n"));
    }
}
