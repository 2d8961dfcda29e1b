//! Chat log display component

use super::markdown::render_markdown;
use crate::events::{Sender, Turn};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Read-only view over the session's turns, anchored to the newest turn
pub struct ConversationHistory<'a> {
    turns: &'a [Turn],
}

impl<'a> ConversationHistory<'a> {
    pub fn new(turns: &'a [Turn]) -> Self {
        Self { turns }
    }

    /// Render a single turn into lines, paired with whether they hug the
    /// right edge
    fn render_turn(&self, turn: &Turn, width: u16) -> Vec<(Line<'static>, bool)> {
        let right = turn.sender == Sender::User;
        let style = content_style(turn.sender);

        let timestamp = turn.created_at.format("%H:%M").to_string();
        let mut lines = vec![(
            Line::from(vec![
                Span::styled(
                    turn.sender.label(),
                    style.add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {}", timestamp), Style::default().fg(Color::DarkGray)),
            ]),
            right,
        )];

        let wrap_width = (width as usize).saturating_sub(4).max(1);
        for line in render_markdown(&turn.text, style, wrap_width) {
            lines.push((line, right));
        }

        lines
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut all_lines = Vec::new();
        for turn in self.turns {
            all_lines.extend(self.render_turn(turn, area.width));
            all_lines.push((Line::from(""), false));
        }
        all_lines.pop();

        // Keep the newest turn in view
        let height = area.height as usize;
        let start = all_lines.len().saturating_sub(height);

        for (i, (line, right)) in all_lines[start..].iter().enumerate() {
            let x = if *right {
                area.x + area.width.saturating_sub(line.width() as u16)
            } else {
                area.x
            };
            buf.set_line(x, area.y + i as u16, line, area.width);
        }
    }
}

fn content_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Blue),
        Sender::Bot => Style::default().fg(Color::Gray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_turn_stays_visible() {
        let mut turns = vec![Turn::greeting("Hello! How can I assist you today?")];
        for i in 0..10 {
            turns.push(Turn::user(format!("question {}", i)));
            turns.push(Turn::bot(format!("answer {}", i)));
        }

        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        ConversationHistory::new(&turns).render(area, &mut buf);

        let bottom: String = (0..area.width)
            .map(|x| buf.get(x, area.height - 1).symbol().to_string())
            .collect();
        assert!(bottom.contains("answer 9"));
    }

    fn screen(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf.get(x, y).symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn markdown_markers_are_not_drawn() {
        let turns = vec![Turn::bot("Your order is **shipped**:\n- item one")];

        let area = Rect::new(0, 0, 40, 4);
        let mut buf = Buffer::empty(area);
        ConversationHistory::new(&turns).render(area, &mut buf);

        let screen = screen(&buf);
        assert!(!screen.contains("**"), "{}", screen);
        assert!(screen.contains("Your order is shipped:"), "{}", screen);
        assert!(screen.contains("• item one"), "{}", screen);
    }

    #[test]
    fn bold_text_keeps_the_sender_colour() {
        let turns = vec![Turn::bot("**shipped**")];

        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        ConversationHistory::new(&turns).render(area, &mut buf);

        let cell = buf.get(0, 1);
        assert_eq!(cell.symbol(), "s");
        assert_eq!(cell.fg, Color::Gray);
        assert!(cell.modifier.contains(Modifier::BOLD));
    }
}
