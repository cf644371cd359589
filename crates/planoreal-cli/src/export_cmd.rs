use std::path::Path;

use anyhow::Context;

use planoreal_core::extract_plan;
use planoreal_core::render::{export_pdf, sections, to_markdown};

/// Default output file for `planoreal export`.
pub const DEFAULT_OUTPUT: &str = "plano-de-aula.pdf";

/// Render a saved lesson plan as PDF, or as Markdown on stdout.
///
/// The input may be a bare plan object or a full model reply; the plan is
/// extracted the same way the server extracts it.
pub fn run_export(input: &Path, output: Option<&Path>, markdown: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("cannot read plan file: {}", input.display()))?;
    let plan = extract_plan(&text)
        .with_context(|| format!("no lesson plan found in {}", input.display()))?;

    if markdown {
        print!("{}", to_markdown(&sections(&plan)));
        return Ok(());
    }

    let output = output.unwrap_or(Path::new(DEFAULT_OUTPUT));
    let pdf = export_pdf(&plan);
    std::fs::write(output, &pdf)
        .with_context(|| format!("cannot write output file: {}", output.display()))?;
    println!("Exported lesson plan to {} ({} bytes)", output.display(), pdf.len());
    Ok(())
}
