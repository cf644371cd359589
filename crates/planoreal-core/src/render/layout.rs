//! Page layout for the exported document.
//!
//! Sections are laid out top to bottom as wrapped text lines. A new page
//! starts whenever the cursor passes the body limit; headings use an earlier
//! limit so they are not stranded at the bottom of a page. All distances are
//! millimetres measured from the top-left corner of the page.

use super::{DOCUMENT_TITLE, Item, Section};

/// Millimetres per typographic point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Geometry and typography of the exported document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    pub title_size: f64,
    pub heading_size: f64,
    pub subheading_size: f64,
    pub body_size: f64,
    /// Vertical advance after the document title.
    pub title_advance: f64,
    pub heading_advance: f64,
    pub subheading_advance: f64,
    /// Vertical advance per body line.
    pub line_height: f64,
    /// Last baseline at which a body line may still be placed.
    pub body_limit: f64,
    /// Last baseline at which a heading may still be placed.
    pub heading_limit: f64,
    pub paragraph_gap: f64,
    pub section_gap: f64,
    /// Average glyph width as a fraction of the font size (Helvetica).
    pub average_char_em: f64,
}

impl Default for PageLayout {
    /// A4 portrait with 20 mm margins.
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 20.0,
            title_size: 18.0,
            heading_size: 14.0,
            subheading_size: 12.0,
            body_size: 11.0,
            title_advance: 10.0,
            heading_advance: 8.0,
            subheading_advance: 7.0,
            line_height: 6.0,
            body_limit: 270.0,
            heading_limit: 260.0,
            paragraph_gap: 3.0,
            section_gap: 2.0,
            average_char_em: 0.5,
        }
    }
}

impl PageLayout {
    pub fn text_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// How many characters of the given size fit on one line.
    pub fn chars_per_line(&self, size: f64) -> usize {
        let glyph = size * MM_PER_PT * self.average_char_em;
        ((self.text_width() / glyph).floor() as usize).max(1)
    }
}

/// One positioned run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f64,
    /// Baseline, measured from the top of the page.
    pub y: f64,
    pub size: f64,
    pub bold: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub lines: Vec<TextLine>,
}

struct Cursor<'a> {
    layout: &'a PageLayout,
    pages: Vec<Page>,
    y: f64,
}

impl<'a> Cursor<'a> {
    fn new(layout: &'a PageLayout) -> Self {
        Self {
            layout,
            pages: vec![Page::default()],
            y: layout.margin,
        }
    }

    fn break_past(&mut self, limit: f64) {
        if self.y > limit {
            self.pages.push(Page::default());
            self.y = self.layout.margin;
        }
    }

    fn emit(&mut self, text: &str, size: f64, bold: bool, advance: f64) {
        if !text.is_empty() {
            let line = TextLine {
                x: self.layout.margin,
                y: self.y,
                size,
                bold,
                text: text.to_string(),
            };
            if let Some(page) = self.pages.last_mut() {
                page.lines.push(line);
            }
        }
        self.y += advance;
    }
}

/// Lay out sections into pages. Always returns at least one page.
pub fn paginate(sections: &[Section], layout: &PageLayout) -> Vec<Page> {
    let mut cur = Cursor::new(layout);

    cur.emit(DOCUMENT_TITLE, layout.title_size, true, layout.title_advance);

    for section in sections {
        cur.break_past(layout.heading_limit);
        cur.emit(&section.title, layout.heading_size, true, layout.heading_advance);

        for item in &section.items {
            match item {
                Item::Subheading(text) => {
                    cur.break_past(layout.heading_limit);
                    cur.emit(text, layout.subheading_size, true, layout.subheading_advance);
                }
                Item::Paragraph(text) => {
                    let width = layout.chars_per_line(layout.body_size);
                    for line in wrap(text, width) {
                        cur.break_past(layout.body_limit);
                        cur.emit(&line, layout.body_size, false, layout.line_height);
                    }
                    cur.y += layout.paragraph_gap;
                }
            }
        }
        cur.y += layout.section_gap;
    }

    cur.pages
}

/// Greedy word wrap to at most `width` characters per line.
///
/// Explicit newlines are kept as line breaks, and words longer than `width`
/// are split. Blank text yields no lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in raw.split_whitespace() {
            for piece in split_long(word, width) {
                let len = piece.chars().count();
                if current_len > 0 && current_len + 1 + len > width {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(&piece);
                current_len += len;
            }
        }
        lines.push(current);
    }
    lines
}

fn split_long(word: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph_section(title: &str, text: &str) -> Section {
        Section {
            title: title.to_string(),
            items: vec![Item::Paragraph(text.to_string())],
        }
    }

    #[test]
    fn default_layout_is_a4() {
        let layout = PageLayout::default();
        assert_eq!(layout.text_width(), 170.0);
        let cpl = layout.chars_per_line(11.0);
        assert!((80..=95).contains(&cpl), "unexpected chars per line: {cpl}");
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("um dois tres quatro cinco", 9);
        assert_eq!(lines, vec!["um dois", "tres", "quatro", "cinco"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 9));
    }

    #[test]
    fn wrap_keeps_newlines_and_splits_long_words() {
        assert_eq!(wrap("a\nb", 10), vec!["a", "b"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn wrap_counts_characters_not_bytes() {
        let lines = wrap("ação ação", 9);
        assert_eq!(lines, vec!["ação ação"]);
    }

    #[test]
    fn short_document_fits_one_page() {
        let layout = PageLayout::default();
        let pages = paginate(&[paragraph_section("Objetivo da Aula", "Texto curto")], &layout);
        assert_eq!(pages.len(), 1);
        let texts: Vec<&str> = pages[0].lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Plano de Aula", "Objetivo da Aula", "Texto curto"]);
        assert_eq!(pages[0].lines[0].y, 20.0);
        assert_eq!(pages[0].lines[1].y, 30.0);
        assert_eq!(pages[0].lines[2].y, 38.0);
        assert!(pages[0].lines[1].bold);
        assert!(!pages[0].lines[2].bold);
    }

    #[test]
    fn empty_input_still_has_title_page() {
        let pages = paginate(&[], &PageLayout::default());
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].lines.len(), 1);
    }

    #[test]
    fn long_text_spills_onto_new_pages() {
        let layout = PageLayout::default();
        let text = "palavra ".repeat(2000);
        let pages = paginate(&[paragraph_section("Atividade Principal", &text)], &layout);
        assert!(pages.len() > 1);
        for page in &pages {
            for line in &page.lines {
                assert!(line.y >= layout.margin);
                assert!(line.y <= layout.body_limit + layout.line_height);
            }
        }
        // Continuation pages restart at the top margin.
        assert_eq!(pages[1].lines[0].y, layout.margin);
    }

    #[test]
    fn heading_near_bottom_moves_to_next_page() {
        let layout = PageLayout::default();
        // Enough lines to push the cursor between the heading and body limits.
        let lines_to_fill = ((layout.heading_limit - 38.0) / layout.line_height).ceil() as usize + 1;
        let filler = vec!["x"; lines_to_fill].join("\n");
        let pages = paginate(
            &[
                paragraph_section("Primeira", &filler),
                paragraph_section("Segunda", "fim"),
            ],
            &layout,
        );
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].lines[0].text, "Segunda");
        assert_eq!(pages[1].lines[0].y, layout.margin);
    }
}
