//! Prompt synthesis.
//!
//! Renders a [`NormalizedRequest`] into the single user message sent to the
//! model. Pure and deterministic: the same request always produces the same
//! bytes.

use crate::sanitize::{ClassSize, NormalizedRequest};

/// Role preamble and the general guidance that applies to every plan.
const PREAMBLE: &str = r#"Você é um assistente pedagógico especializado na realidade da escola pública brasileira.

Crie planos de aula REALISTAS considerando:
- Pouco tempo de preparo
- Recursos variáveis (use apenas os recursos informados)
- Diferentes níveis de engajamento e leitura

IMPORTANTE:
- Não assuma automaticamente que a turma é grande ou pequena. Use o "Perfil da turma" informado.
- Caso o usuário informe "nenhum recurso além do professor" ou nenhum recurso seja selecionado, proponha atividades usando APENAS a presença do professor e sua voz (sem quadro, sem materiais, sem recursos físicos).
- Se o tamanho da turma NÃO estiver informado, faça um plano escalável (funciona tanto para turma pequena quanto numerosa), descrevendo rapidamente como adaptar a dinâmica para cada caso.
"#;

/// Output contract: the exact JSON shape the extractor expects back.
pub const LESSON_PLAN_SCHEMA: &str = r#"RESPONDA EXCLUSIVAMENTE EM JSON, SEM TEXTO EXTRA:

{
  "objetivo_da_aula": "",
  "estrutura": [
    { "etapa": "Abertura", "tempo_minutos": "", "descricao": "" },
    { "etapa": "Desenvolvimento", "tempo_minutos": "", "descricao": "" },
    { "etapa": "Fechamento", "tempo_minutos": "", "descricao": "" }
  ],
  "atividade_principal": "",
  "avaliacao_rapida": "",
  "observacoes_para_o_professor": ""
}"#;

/// Class-size clause used when the profile names neither size.
pub const UNSPECIFIED_CLASS_SIZE_CLAUSE: &str = "Não informado (não assuma). \
Faça um plano escalável, que funcione tanto para turma pequena quanto para turma numerosa, \
e ofereça alternativas para os dois casos (\"se turma pequena...\" / \"se turma numerosa...\").";

pub const SMALL_CLASS_CLAUSE: &str = "Turma pequena.";
pub const LARGE_CLASS_CLAUSE: &str = "Turma numerosa.";

/// Class-size clause for the prompt's context section.
pub fn class_size_clause(size: ClassSize) -> &'static str {
    match size {
        ClassSize::Small => SMALL_CLASS_CLAUSE,
        ClassSize::Large => LARGE_CLASS_CLAUSE,
        ClassSize::Unspecified => UNSPECIFIED_CLASS_SIZE_CLAUSE,
    }
}

/// Build the full prompt for a normalized request.
///
/// The resources clause, the class-size clause, the restated duration and
/// the JSON schema block are always present.
pub fn build_prompt(req: &NormalizedRequest) -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str(PREAMBLE);
    prompt.push('\n');

    // Context.
    prompt.push_str("CONTEXTO:\n");
    prompt.push_str(&format!("Assunto da aula: {}\n\n", req.subject));
    prompt.push_str(&format!("Série: {}\n", req.grade));
    prompt.push_str(&format!("Duração: {} minutos\n", req.duration_minutes));
    prompt.push_str(&format!("Objetivos pedagógicos: {}\n\n", req.objectives_text));
    prompt.push_str(&format!("Recursos disponíveis:\n{}\n\n", req.resources.clause()));
    prompt.push_str(&format!("Perfil da turma:\n{}\n\n", req.profile_text));
    prompt.push_str(&format!(
        "Tamanho da turma:\n{}\n\n",
        class_size_clause(req.class_size)
    ));

    // Rules.
    prompt.push_str("REGRAS:\n");
    prompt.push_str("- Identifique a disciplina e o tema a partir do \"Assunto da aula\" informado\n");
    prompt.push_str("- Use SOMENTE os recursos informados em \"Recursos disponíveis\"; não use recursos não informados\n");
    if req.resources.is_instructor_only() {
        prompt.push_str(
            "- Não há recursos além do professor: use APENAS a presença do professor e sua voz \
             (sem quadro, sem materiais físicos, sem recursos adicionais)\n",
        );
    }
    prompt.push_str("- Não exija internet ou celular se não disponíveis\n");
    prompt.push_str("- Linguagem simples e direta\n");
    prompt.push_str(
        "- Adeque o formato das atividades ao \"Perfil da turma\" \
         (ex.: turma pequena permite mais diálogo; turma grande exige mais organização)\n",
    );
    if req.class_size == ClassSize::Unspecified {
        prompt.push_str(
            "- Como o tamanho da turma não foi informado, evite formatos que dependem do tamanho \
             (ex.: círculo/roda obrigatória). Prefira estratégias neutras e inclua alternativas \
             (\"se turma pequena...\" / \"se turma numerosa...\").\n",
        );
    }
    prompt.push_str(&format!(
        "- Plano compatível com o tempo informado ({} minutos)\n",
        req.duration_minutes
    ));
    prompt.push_str("- Considere todos os objetivos pedagógicos selecionados\n\n");

    prompt.push_str(LESSON_PLAN_SCHEMA);

    prompt
}
