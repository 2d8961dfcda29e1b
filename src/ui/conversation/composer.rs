use crate::ui::conversation::commands::{parse_slash_command, ParsedCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    Submitted(String),
    Command(ParsedCommand),
    None,
}

/// Single-line input buffer. The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    pub cursor_position: usize,
}

impl TextAreaState {
    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Message composer at the bottom of the chat panel
#[derive(Debug, Clone)]
pub struct ConversationComposer {
    state: TextAreaState,
    placeholder: String,
    enabled: bool,
}

impl ConversationComposer {
    pub fn new(placeholder: String) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder,
            enabled: true,
        }
    }

    /// Handle key input.
    ///
    /// Submitting does not clear the buffer; the caller clears it once the
    /// session accepts the message.
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press || !self.enabled {
            return ComposerResult::None;
        }

        let state = &mut self.state;
        match key.code {
            KeyCode::Enter => {
                if let Some(command) = parse_slash_command(&state.content) {
                    state.content.clear();
                    state.cursor_position = 0;
                    return ComposerResult::Command(command);
                }
                return ComposerResult::Submitted(state.content.clone());
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let at = state.byte_offset(state.cursor_position);
                state.content.insert(at, c);
                state.cursor_position += 1;
            }
            KeyCode::Backspace => {
                if state.cursor_position > 0 {
                    state.cursor_position -= 1;
                    let at = state.byte_offset(state.cursor_position);
                    state.content.remove(at);
                }
            }
            KeyCode::Delete => {
                if state.cursor_position < state.char_len() {
                    let at = state.byte_offset(state.cursor_position);
                    state.content.remove(at);
                }
            }
            KeyCode::Left => {
                state.cursor_position = state.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                if state.cursor_position < state.char_len() {
                    state.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                state.cursor_position = 0;
            }
            KeyCode::End => {
                state.cursor_position = state.char_len();
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Input is ignored while disabled
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn content(&self) -> &str {
        &self.state.content
    }

    pub fn clear(&mut self) {
        self.state = TextAreaState::default();
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, style) = if self.enabled {
            ("Send with Enter", Style::default().fg(Color::Blue))
        } else {
            ("Waiting for reply", Style::default().fg(Color::DarkGray))
        };

        let block = Block::default().borders(Borders::ALL).title(title).style(style);
        let inner_area = block.inner(area);
        block.render(area, buf);

        let state = &self.state;
        let line = if state.content.is_empty() {
            Line::from(vec![Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )])
        } else {
            let mut content = state.content.clone();
            if self.enabled {
                content.insert(state.byte_offset(state.cursor_position), '▌');
            }
            Line::from(vec![Span::styled(content, Style::default().fg(Color::White))])
        };
        buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
    }
}
