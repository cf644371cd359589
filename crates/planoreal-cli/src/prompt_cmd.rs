use std::path::Path;

use anyhow::{Context, bail};
use serde_json::Value;

use planoreal_core::prepare_prompt;

/// Print the prompt a lesson request would send, without calling the model.
pub fn run_prompt(path: &Path) -> anyhow::Result<()> {
    let prompt = render_prompt(path)?;
    println!("{prompt}");
    Ok(())
}

fn render_prompt(path: &Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read request file: {}", path.display()))?;
    let body: Value = serde_json::from_str(&text)
        .with_context(|| format!("request file is not JSON: {}", path.display()))?;

    match prepare_prompt(&body) {
        Ok(prompt) => Ok(prompt),
        Err(errors) => {
            let lines: Vec<String> = errors.details.iter().map(|d| format!("  - {d}")).collect();
            bail!("invalid lesson request:\n{}", lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn request_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn renders_prompt_from_file() {
        let file = request_file(
            r#"{"subject":"Frações","gradeLevel":"5º ano EF","duration":"50","objectives":["Introdução"]}"#,
        );
        let prompt = render_prompt(file.path()).unwrap();
        assert!(prompt.contains("Frações"));
        assert!(prompt.contains("50 minutos"));
    }

    #[test]
    fn lists_every_validation_error() {
        let file = request_file(r#"{"subject":"Frações"}"#);
        let err = render_prompt(file.path()).unwrap_err().to_string();
        assert!(err.starts_with("invalid lesson request:"));
        assert!(err.contains("  - Série é obrigatória"));
        assert!(err.contains("  - Duração é obrigatória"));
        assert!(err.contains("  - Pelo menos um objetivo pedagógico é obrigatório"));
    }

    #[test]
    fn rejects_non_json_file() {
        let file = request_file("assunto: frações");
        let err = format!("{:#}", render_prompt(file.path()).unwrap_err());
        assert!(err.contains("request file is not JSON"), "unexpected: {err}");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = render_prompt(Path::new("/nonexistent/request.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read request file"));
    }
}
