//! Minimal PDF 1.4 writer for laid-out pages.
//!
//! Produces one content stream per page using the standard Helvetica and
//! Helvetica-Bold fonts with WinAnsi encoding, which covers Portuguese
//! text. Characters outside WinAnsi are written as `?`.

use std::fmt::Write as _;

use super::layout::{MM_PER_PT, Page, PageLayout};

/// Object numbers of the fixed objects.
const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_REGULAR_ID: usize = 3;
const FONT_BOLD_ID: usize = 4;
const FIRST_PAGE_ID: usize = 5;

/// Serialize pages into a complete PDF document.
pub fn write_pdf(pages: &[Page], layout: &PageLayout) -> Vec<u8> {
    let width_pt = layout.page_width / MM_PER_PT;
    let height_pt = layout.page_height / MM_PER_PT;

    let page_ids: Vec<usize> = (0..pages.len()).map(|i| FIRST_PAGE_ID + 2 * i).collect();
    let mut objects: Vec<Vec<u8>> = Vec::with_capacity(4 + 2 * pages.len());

    objects.push(format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").into_bytes());

    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} /MediaBox [0 0 {} {}] >>",
            pages.len(),
            number(width_pt),
            number(height_pt)
        )
        .into_bytes(),
    );

    objects.push(font_dict("Helvetica"));
    objects.push(font_dict("Helvetica-Bold"));

    for (page, page_id) in pages.iter().zip(&page_ids) {
        let content_id = page_id + 1;
        objects.push(
            format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R \
                 /Resources << /Font << /F1 {FONT_REGULAR_ID} 0 R /F2 {FONT_BOLD_ID} 0 R >> >> \
                 /Contents {content_id} 0 R >>"
            )
            .into_bytes(),
        );

        let stream = content_stream(page, height_pt);
        let mut obj = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        obj.extend_from_slice(&stream);
        obj.extend_from_slice(b"\nendstream");
        objects.push(obj);
    }

    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in &offsets {
        let _ = write!(xref, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root {CATALOG_ID} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    );
    out.extend_from_slice(xref.as_bytes());
    out
}

fn font_dict(base: &str) -> Vec<u8> {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>")
        .into_bytes()
}

fn content_stream(page: &Page, height_pt: f64) -> Vec<u8> {
    let mut stream = Vec::new();
    for line in &page.lines {
        let font = if line.bold { "F2" } else { "F1" };
        let x = line.x / MM_PER_PT;
        let y = height_pt - line.y / MM_PER_PT;
        stream.extend_from_slice(
            format!(
                "BT /{font} {} Tf {} {} Td (",
                number(line.size),
                number(x),
                number(y)
            )
            .as_bytes(),
        );
        stream.extend_from_slice(&escape_text(&line.text));
        stream.extend_from_slice(b") Tj ET\n");
    }
    stream
}

/// Format a coordinate with two decimals, trimming trailing zeros.
fn number(v: f64) -> String {
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Encode text as WinAnsi bytes for a PDF literal string.
fn escape_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            _ => out.push(winansi_byte(c)),
        }
    }
    out
}

fn winansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '\t' => b' ',
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        _ => b'?',
    }
}
