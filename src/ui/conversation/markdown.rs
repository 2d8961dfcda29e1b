//! Markdown turn text to styled, wrapped terminal lines

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// One logical line before wrapping: list bullet plus styled runs
#[derive(Debug, Default)]
struct Block {
    prefix: String,
    runs: Vec<(String, Style)>,
    preformatted: bool,
}

struct Renderer {
    styles: Vec<Style>,
    lists: Vec<Option<u64>>,
    current: Block,
    blocks: Vec<Block>,
    in_code_block: bool,
}

impl Renderer {
    fn new(base: Style) -> Self {
        Self {
            styles: vec![base],
            lists: Vec::new(),
            current: Block::default(),
            blocks: Vec::new(),
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, f: impl FnOnce(Style) -> Style) {
        let style = f(self.style());
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn flush(&mut self) {
        if !self.current.runs.is_empty() || !self.current.prefix.is_empty() {
            self.blocks.push(std::mem::take(&mut self.current));
        }
    }

    fn text(&mut self, text: &str, style: Style) {
        self.current.runs.push((text.to_string(), style));
    }

    fn start_item(&mut self) {
        self.flush();
        let depth = self.lists.len().saturating_sub(1);
        let bullet = match self.lists.last_mut() {
            Some(Some(n)) => {
                let bullet = format!("{}. ", n);
                *n += 1;
                bullet
            }
            _ => "• ".to_string(),
        };
        self.current.prefix = format!("{}{}", "  ".repeat(depth), bullet);
    }

    fn code_block(&mut self, text: &str) {
        let style = Style::default().fg(Color::Yellow);
        for line in text.lines() {
            self.blocks.push(Block {
                prefix: "  ".to_string(),
                runs: vec![(line.to_string(), style)],
                preformatted: true,
            });
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Strong) | Event::Start(Tag::Heading { .. }) => {
                self.push_style(|s| s.add_modifier(Modifier::BOLD))
            }
            Event::Start(Tag::Emphasis) => self.push_style(|s| s.add_modifier(Modifier::ITALIC)),
            Event::Start(Tag::Strikethrough) => {
                self.push_style(|s| s.add_modifier(Modifier::CROSSED_OUT))
            }
            Event::Start(Tag::Link { .. }) => {
                self.push_style(|s| s.add_modifier(Modifier::UNDERLINED))
            }
            Event::End(TagEnd::Strong)
            | Event::End(TagEnd::Emphasis)
            | Event::End(TagEnd::Strikethrough)
            | Event::End(TagEnd::Link) => self.pop_style(),
            Event::End(TagEnd::Heading(_)) => {
                self.pop_style();
                self.flush();
            }
            Event::End(TagEnd::Paragraph) => self.flush(),
            Event::Start(Tag::List(start)) => {
                self.flush();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.lists.pop();
            }
            Event::Start(Tag::Item) => self.start_item(),
            Event::End(TagEnd::Item) => self.flush(),
            Event::Start(Tag::CodeBlock(_)) => {
                self.flush();
                self.in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => self.in_code_block = false,
            Event::Text(text) if self.in_code_block => self.code_block(&text),
            Event::Text(text) => {
                let style = self.style();
                self.text(&text, style);
            }
            Event::Code(code) => {
                let style = self.style().fg(Color::Yellow);
                self.text(&code, style);
            }
            Event::SoftBreak => {
                let style = self.style();
                self.text(" ", style);
            }
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.blocks.push(Block {
                    runs: vec![("───".to_string(), Style::default().fg(Color::DarkGray))],
                    ..Block::default()
                });
            }
            _ => {}
        }
    }
}

/// Render Markdown `text` into lines no wider than `width` characters.
///
/// Bold, italic, strikethrough, inline code, code blocks, headings, links
/// and bullet/numbered lists are styled; their markers are not drawn.
pub fn render_markdown(text: &str, base: Style, width: usize) -> Vec<Line<'static>> {
    let mut renderer = Renderer::new(base);
    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
        renderer.event(event);
    }
    renderer.flush();

    let mut lines: Vec<Line<'static>> = renderer
        .blocks
        .iter()
        .flat_map(|block| wrap_block(block, width))
        .collect();

    if lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines
}

/// Split runs into words, remembering whether whitespace preceded each
fn words(runs: &[(String, Style)]) -> Vec<(String, Style, bool)> {
    let mut words = Vec::new();
    let mut gap = false;

    for (text, style) in runs {
        let mut current = String::new();
        let mut current_gap = false;
        for ch in text.chars() {
            if ch.is_whitespace() {
                if !current.is_empty() {
                    words.push((std::mem::take(&mut current), *style, current_gap));
                }
                gap = true;
            } else {
                if current.is_empty() {
                    current_gap = gap;
                    gap = false;
                }
                current.push(ch);
            }
        }
        if !current.is_empty() {
            words.push((current, *style, current_gap));
        }
    }

    words
}

fn wrap_block(block: &Block, width: usize) -> Vec<Line<'static>> {
    let prefix_len = block.prefix.chars().count();
    let indent = " ".repeat(prefix_len);

    if block.preformatted {
        let mut spans = vec![Span::raw(block.prefix.clone())];
        spans.extend(block.runs.iter().map(|(t, s)| Span::styled(t.clone(), *s)));
        return vec![Line::from(spans)];
    }

    let available = width.saturating_sub(prefix_len).max(1);
    let mut lines = Vec::new();
    let mut spans = vec![Span::raw(block.prefix.clone())];
    let mut current_len = 0;

    for (word, style, gap) in words(&block.runs) {
        let word_len = word.chars().count();
        let space = if gap && current_len > 0 { 1 } else { 0 };

        if current_len > 0 && current_len + space + word_len > available {
            lines.push(Line::from(std::mem::take(&mut spans)));
            spans.push(Span::raw(indent.clone()));
            current_len = 0;
        } else if space == 1 {
            spans.push(Span::raw(" "));
            current_len += 1;
        }

        spans.push(Span::styled(word, style));
        current_len += word_len;
    }

    lines.push(Line::from(spans));
    lines
}
