//! Inline formatting for transcript messages.
//!
//! The counselor writes light markdown: line breaks, `**bold**`, and
//! `*italic*`. This module translates that into styled spans; anything
//! fancier degrades to plain text. No sanitization beyond that is implied.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

/// Render one message body into display lines with `base` as the
/// starting style.
pub fn format_content(content: &str, base: Style) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut bold = 0usize;
    let mut italic = 0usize;

    for event in Parser::new(content) {
        match event {
            Event::Start(Tag::Strong) => bold += 1,
            Event::End(TagEnd::Strong) => bold = bold.saturating_sub(1),
            Event::Start(Tag::Emphasis) => italic += 1,
            Event::End(TagEnd::Emphasis) => italic = italic.saturating_sub(1),
            Event::Start(Tag::Paragraph) => {
                if !lines.is_empty() {
                    lines.push(Line::default());
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if !current.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current)));
                }
            }
            Event::Start(Tag::Item) | Event::SoftBreak | Event::HardBreak => {
                if !current.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current)));
                }
            }
            Event::Text(text) | Event::Code(text) => {
                let mut style = base;
                if bold > 0 {
                    style = style.add_modifier(Modifier::BOLD);
                }
                if italic > 0 {
                    style = style.add_modifier(Modifier::ITALIC);
                }
                current.push(Span::styled(text.to_string(), style));
            }
            _ => {}
        }
    }
    if !current.is_empty() {
        lines.push(Line::from(current));
    }
    if lines.is_empty() {
        lines.push(Line::default());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_texts(line: &Line<'_>) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn plain_text_is_a_single_span() {
        let lines = format_content("hello there", Style::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(span_texts(&lines[0]), vec!["hello there"]);
    }

    #[test]
    fn bold_and_italic_markers_become_modifiers() {
        let lines = format_content("be **kind** to *yourself*", Style::default());
        assert_eq!(lines.len(), 1);
        let spans = &lines[0].spans;
        let bold = spans
            .iter()
            .find(|s| s.content == "kind")
            .expect("bold span");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        let italic = spans
            .iter()
            .find(|s| s.content == "yourself")
            .expect("italic span");
        assert!(italic.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn line_breaks_split_lines() {
        let lines = format_content("first line\nsecond line", Style::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(span_texts(&lines[0]), vec!["first line"]);
        assert_eq!(span_texts(&lines[1]), vec!["second line"]);
    }

    #[test]
    fn paragraphs_get_a_blank_separator() {
        let lines = format_content("one\n\ntwo", Style::default());
        assert_eq!(lines.len(), 3);
        assert!(lines[1].spans.is_empty());
    }

    #[test]
    fn same_sequence_renders_the_same_lines() {
        let a = format_content("a **b** c", Style::default());
        let b = format_content("a **b** c", Style::default());
        assert_eq!(a, b);
    }

    #[test]
    fn empty_content_yields_one_empty_line() {
        let lines = format_content("", Style::default());
        assert_eq!(lines.len(), 1);
    }
}
