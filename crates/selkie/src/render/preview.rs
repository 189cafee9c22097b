//! Document preview: turns assistant-produced markdown into a single
//! exportable SVG region.
//!
//! Paragraphs, list items, and fenced code blocks that pass the flowchart
//! candidate heuristic are run through the full recovery pipeline and embedded
//! as rendered diagrams; on fallback the original text is kept as a
//! preformatted block. The preview owns its theme so the exporter can swap in
//! the print-safe palette for the duration of an export.

use crate::render::{BlockOutcome, DiagramRenderer};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use selkie_core::looks_like_flowchart;
use selkie_render::svg::escape_xml;
use selkie_render::{DeterministicTextMeasurer, TextMeasurer, Theme, text::wrap_text};
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct PreviewOptions {
    /// Total region width in CSS pixels.
    pub width: f64,
    pub margin: f64,
    pub font_size: f64,
    pub code_font_size: f64,
    pub block_gap: f64,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            width: 760.0,
            margin: 24.0,
            font_size: 14.0,
            code_font_size: 12.0,
            block_gap: 12.0,
        }
    }
}

#[derive(Debug, Clone)]
enum Block {
    Heading { level: u32, text: String },
    Paragraph(String),
    Bullet(String),
    Code(String),
    DiagramCandidate(String),
}

/// A parsed document ready to be rendered as one tall SVG region.
#[derive(Debug, Clone)]
pub struct DocumentPreview {
    pub title: String,
    blocks: Vec<Block>,
    theme: Theme,
    options: PreviewOptions,
}

impl DocumentPreview {
    pub fn from_markdown(title: &str, markdown: &str, options: PreviewOptions) -> Self {
        Self {
            title: title.to_string(),
            blocks: parse_blocks(markdown),
            theme: Theme::default(),
            options,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Replaces the theme, returning the previous one.
    pub fn set_theme(&mut self, theme: Theme) -> Theme {
        std::mem::replace(&mut self.theme, theme)
    }

    /// Renders the whole document as a single SVG region. Diagram candidates
    /// are rendered with the preview's current theme on every call, so a theme
    /// swap recolors diagrams as well as text.
    pub fn region_svg(&self) -> String {
        let options = &self.options;
        let measurer = DeterministicTextMeasurer;
        let renderer = DiagramRenderer::new().with_theme(self.theme.clone());
        let content_width = options.width - 2.0 * options.margin;

        let mut body = String::new();
        let mut y = options.margin;

        let mut title_and_blocks: Vec<Block> = Vec::with_capacity(self.blocks.len() + 1);
        if !self.title.trim().is_empty() {
            title_and_blocks.push(Block::Heading {
                level: 1,
                text: self.title.clone(),
            });
        }
        title_and_blocks.extend(self.blocks.iter().cloned());

        for block in &title_and_blocks {
            match block {
                Block::Heading { level, text } => {
                    let size = options.font_size
                        * match level {
                            1 => 1.6,
                            2 => 1.35,
                            3 => 1.15,
                            _ => 1.0,
                        };
                    y = self.emit_text_lines(
                        &mut body,
                        &measurer,
                        text,
                        size,
                        true,
                        options.margin,
                        content_width,
                        y,
                    );
                }
                Block::Paragraph(text) => {
                    y = self.emit_text_lines(
                        &mut body,
                        &measurer,
                        text,
                        options.font_size,
                        false,
                        options.margin,
                        content_width,
                        y,
                    );
                }
                Block::Bullet(text) => {
                    let bullet = format!("\u{2022} {text}");
                    y = self.emit_text_lines(
                        &mut body,
                        &measurer,
                        &bullet,
                        options.font_size,
                        false,
                        options.margin + 16.0,
                        content_width - 16.0,
                        y,
                    );
                }
                Block::Code(code) => {
                    y = self.emit_code(&mut body, code, options.margin, content_width, y);
                }
                Block::DiagramCandidate(raw) => {
                    match renderer.render_block_sync(raw) {
                        BlockOutcome::Diagram(diagram) => {
                            let scale = (content_width / diagram.width).min(1.0);
                            let w = diagram.width * scale;
                            let h = diagram.height * scale;
                            let x = options.margin + (content_width - w) / 2.0;
                            let _ = writeln!(
                                body,
                                r#"<g transform="translate({x:.1} {y:.1}) scale({scale:.4})">{}</g>"#,
                                diagram.svg
                            );
                            y += h;
                        }
                        BlockOutcome::PlainText(text) => {
                            y = self.emit_code(&mut body, &text, options.margin, content_width, y);
                        }
                    }
                }
            }
            y += options.block_gap;
        }

        let total_height = (y + options.margin).ceil();
        let width = options.width;
        let background = self
            .theme
            .background
            .clone()
            .unwrap_or_else(|| "#FFFFFF".to_string());

        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" "#,
                r#"viewBox="0 0 {w} {h}" font-family="Arial, sans-serif">"#,
                "\n<rect width=\"{w}\" height=\"{h}\" fill=\"{bg}\"/>\n{body}</svg>\n"
            ),
            w = width,
            h = total_height,
            bg = background,
            body = body,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_text_lines(
        &self,
        body: &mut String,
        measurer: &dyn TextMeasurer,
        text: &str,
        font_size: f64,
        bold: bool,
        x: f64,
        max_width: f64,
        mut y: f64,
    ) -> f64 {
        let weight = if bold { " font-weight=\"bold\"" } else { "" };
        for line in wrap_text(measurer, text, font_size, max_width) {
            y += font_size * 1.5;
            let _ = writeln!(
                body,
                r#"<text x="{x:.1}" y="{y:.1}" font-size="{font_size}" fill="{}"{weight}>{}</text>"#,
                self.theme.text_color,
                escape_xml(&line)
            );
        }
        y
    }

    fn emit_code(
        &self,
        body: &mut String,
        code: &str,
        x: f64,
        width: f64,
        mut y: f64,
    ) -> f64 {
        let font_size = self.options.code_font_size;
        let line_height = font_size * 1.5;
        let lines: Vec<&str> = code.lines().collect();
        let box_height = lines.len() as f64 * line_height + 16.0;
        let _ = writeln!(
            body,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{width:.1}" height="{box_height:.1}" rx="4" fill="{}" stroke="{}" stroke-width="1"/>"#,
            self.theme.cluster_fill, self.theme.cluster_stroke
        );
        let mut text_y = y + 8.0;
        for line in &lines {
            text_y += line_height;
            let _ = writeln!(
                body,
                r#"<text x="{:.1}" y="{text_y:.1}" font-family="monospace" font-size="{font_size}" fill="{}" xml:space="preserve">{}</text>"#,
                x + 8.0,
                self.theme.text_color,
                escape_xml(line)
            );
        }
        y += box_height;
        y
    }
}

/// Scoped print-palette override: swaps the preview's theme for
/// [`Theme::print_safe`] and restores the original on drop, on every exit
/// path including panics and early returns.
pub struct PrintPaletteGuard<'a> {
    preview: &'a mut DocumentPreview,
    saved: Option<Theme>,
}

impl<'a> PrintPaletteGuard<'a> {
    pub fn apply(preview: &'a mut DocumentPreview) -> Self {
        let saved = preview.set_theme(Theme::print_safe());
        Self {
            preview,
            saved: Some(saved),
        }
    }

    pub fn preview(&self) -> &DocumentPreview {
        self.preview
    }
}

impl Drop for PrintPaletteGuard<'_> {
    fn drop(&mut self) {
        if let Some(theme) = self.saved.take() {
            self.preview.theme = theme;
        }
    }
}

fn heading_level(level: HeadingLevel) -> u32 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut buffer = String::new();
    let mut code_lang: Option<String> = None;
    let mut heading: Option<u32> = None;
    let mut in_item = false;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                buffer.clear();
                heading = Some(heading_level(level));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(level) = heading.take() {
                    blocks.push(Block::Heading {
                        level,
                        text: std::mem::take(&mut buffer),
                    });
                }
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                buffer.clear();
                code_lang = Some(match kind {
                    CodeBlockKind::Fenced(lang) => lang.to_string(),
                    CodeBlockKind::Indented => String::new(),
                });
            }
            Event::End(TagEnd::CodeBlock) => {
                let lang = code_lang.take().unwrap_or_default();
                let code = std::mem::take(&mut buffer);
                let code = code.trim_end_matches('\n').to_string();
                if lang.trim() == "mermaid" || looks_like_flowchart(&code) {
                    blocks.push(Block::DiagramCandidate(code));
                } else {
                    blocks.push(Block::Code(code));
                }
            }
            Event::Start(Tag::Item) => {
                buffer.clear();
                in_item = true;
            }
            Event::End(TagEnd::Item) => {
                if in_item {
                    in_item = false;
                    let text = std::mem::take(&mut buffer);
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        if looks_like_flowchart(trimmed) {
                            blocks.push(Block::DiagramCandidate(trimmed.to_string()));
                        } else {
                            blocks.push(Block::Bullet(trimmed.to_string()));
                        }
                    }
                }
            }
            Event::Start(Tag::Paragraph) => {
                if !in_item {
                    buffer.clear();
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if !in_item {
                    let text = std::mem::take(&mut buffer);
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        if looks_like_flowchart(trimmed) {
                            blocks.push(Block::DiagramCandidate(trimmed.to_string()));
                        } else {
                            blocks.push(Block::Paragraph(trimmed.to_string()));
                        }
                    }
                }
            }
            Event::Text(text) => buffer.push_str(&text),
            Event::Code(code) => buffer.push_str(&code),
            Event::SoftBreak | Event::HardBreak => buffer.push('\n'),
            _ => {}
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_paragraphs_and_headings_become_blocks() {
        let preview = DocumentPreview::from_markdown(
            "Doc",
            "# Title\n\nSome paragraph.\n\n- item one\n- item two",
            PreviewOptions::default(),
        );
        assert!(preview.blocks.iter().any(|b| matches!(b, Block::Heading { .. })));
        assert!(preview.blocks.iter().any(|b| matches!(b, Block::Paragraph(_))));
        assert_eq!(
            preview
                .blocks
                .iter()
                .filter(|b| matches!(b, Block::Bullet(_)))
                .count(),
            2
        );
    }

    #[test]
    fn mermaid_fences_become_diagram_candidates() {
        let preview = DocumentPreview::from_markdown(
            "Doc",
            "```mermaid\ngraph TD\nA-->B\n```",
            PreviewOptions::default(),
        );
        assert!(matches!(
            preview.blocks.as_slice(),
            [Block::DiagramCandidate(_)]
        ));
    }

    #[test]
    fn bare_diagram_paragraphs_are_detected() {
        let preview = DocumentPreview::from_markdown(
            "Doc",
            "graph TD; A-->B",
            PreviewOptions::default(),
        );
        assert!(matches!(
            preview.blocks.as_slice(),
            [Block::DiagramCandidate(_)]
        ));
    }

    #[test]
    fn region_svg_embeds_rendered_diagrams() {
        let preview = DocumentPreview::from_markdown(
            "Doc",
            "Intro.\n\n```mermaid\ngraph TD\nA-->B\n```",
            PreviewOptions::default(),
        );
        let svg = preview.region_svg();
        assert!(svg.contains("<g transform=\"translate("));
        assert!(svg.contains("viewBox"));
    }

    #[test]
    fn print_palette_guard_restores_on_drop() {
        let mut preview =
            DocumentPreview::from_markdown("Doc", "text", PreviewOptions::default());
        let original = preview.theme().clone();
        {
            let guard = PrintPaletteGuard::apply(&mut preview);
            assert_eq!(guard.preview().theme(), &Theme::print_safe());
        }
        assert_eq!(preview.theme(), &original);
    }
}
