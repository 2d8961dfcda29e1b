use crate::config::UiConfig;
use crate::session::ChatSession;
use crate::ui::conversation::{
    get_help_text, ComposerResult, ConversationComposer, ConversationHistory, ParsedCommand,
    SlashCommand, TypingIndicator,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

const LAUNCHER_LABEL: &str = " 💬 Chat (Ctrl+O) ";
const PANEL_WIDTH: u16 = 60;
const PANEL_HEIGHT: u16 = 22;

/// Actions the widget asks of the surrounding event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    None,
    Quit,
}

/// The chat widget: a launcher bubble that expands into a chat panel.
///
/// Pure view over a [`ChatSession`]; all log mutations go through the session.
pub struct ChatWidget {
    session: ChatSession,
    composer: ConversationComposer,
    title: String,
    status: Option<String>,
}

impl ChatWidget {
    pub fn new(session: ChatSession, ui: &UiConfig) -> Self {
        Self {
            session,
            composer: ConversationComposer::new(ui.placeholder.clone()),
            title: ui.title.clone(),
            status: None,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> WidgetAction {
        if key.kind != KeyEventKind::Press {
            return WidgetAction::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return WidgetAction::Quit,
                KeyCode::Char('o') => {
                    self.session.toggle_open();
                    return WidgetAction::None;
                }
                _ => {}
            }
        }

        if !self.session.is_open() {
            if key.code == KeyCode::Enter {
                self.session.toggle_open();
            }
            return WidgetAction::None;
        }

        if key.code == KeyCode::Esc {
            self.session.toggle_open();
            return WidgetAction::None;
        }

        self.sync_pending();
        match self.composer.handle_key(key) {
            ComposerResult::Submitted(text) => {
                if self.session.submit(&text).is_accepted() {
                    self.composer.clear();
                    self.status = None;
                }
                self.sync_pending();
                WidgetAction::None
            }
            ComposerResult::Command(command) => self.handle_slash_command(command),
            ComposerResult::None => WidgetAction::None,
        }
    }

    /// Mirror the session's pending flag onto the composer
    pub fn sync_pending(&mut self) {
        self.composer.set_enabled(!self.session.is_pending());
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn composer(&self) -> &ConversationComposer {
        &self.composer
    }

    fn handle_slash_command(&mut self, command: ParsedCommand) -> WidgetAction {
        match command.command {
            SlashCommand::Help => {
                self.status = Some(get_help_text());
                WidgetAction::None
            }
            SlashCommand::Close => {
                if self.session.is_open() {
                    self.session.toggle_open();
                }
                WidgetAction::None
            }
            SlashCommand::Quit => WidgetAction::Quit,
        }
    }

    fn render_launcher(&self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![Span::styled(
            LAUNCHER_LABEL,
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )]);

        let width = (line.width() as u16).min(area.width);
        let x = area.x + area.width.saturating_sub(width + 1);
        let y = area.y + area.height.saturating_sub(2);
        buf.set_line(x, y, &line, width);
    }

    fn render_panel(&self, area: Rect, buf: &mut Buffer) {
        let width = PANEL_WIDTH.min(area.width);
        let height = PANEL_HEIGHT.min(area.height);
        let panel = Rect {
            x: area.x + area.width - width,
            y: area.y + area.height - height,
            width,
            height,
        };

        Clear.render(panel, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title))
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(Color::Blue));
        let inner = block.inner(panel);
        block.render(panel, buf);

        let pending = self.session.is_pending();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(if pending { 1 } else { 0 }),
                Constraint::Length(if self.status.is_some() { 1 } else { 0 }),
                Constraint::Length(3),
            ])
            .split(inner);

        let turns = self.session.turns();
        ConversationHistory::new(&turns).render(chunks[0], buf);

        if pending {
            TypingIndicator::now().render(chunks[1], buf);
        }

        if let Some(status) = &self.status {
            let line = Line::from(vec![Span::styled(
                status.as_str(),
                Style::default().fg(Color::Yellow),
            )]);
            buf.set_line(chunks[2].x, chunks[2].y, &line, chunks[2].width);
        }

        self.composer.render(chunks[3], buf);
    }
}

impl Widget for &ChatWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        if self.session.is_open() {
            self.render_panel(area, buf);
        } else {
            self.render_launcher(area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::events::Turn;
    use crate::transport::{ChatTransport, TransportError};
    use futures::future::BoxFuture;
    use std::sync::Arc;

    struct EchoTransport;

    impl ChatTransport for EchoTransport {
        fn send<'a>(
            &'a self,
            message: &'a str,
            _history: &'a [Turn],
        ) -> BoxFuture<'a, Result<Option<String>, TransportError>> {
            Box::pin(async move { Ok(Some(format!("echo: {}", message))) })
        }
    }

    fn widget() -> ChatWidget {
        let config = Config::default();
        let session = ChatSession::new(&config, Arc::new(EchoTransport));
        ChatWidget::new(session, &config.ui)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(widget: &mut ChatWidget, text: &str) {
        for c in text.chars() {
            widget.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn typing_while_closed_does_nothing() {
        let mut widget = widget();
        type_text(&mut widget, "hello");

        assert!(!widget.session().is_open());
        assert!(widget.composer().content().is_empty());
    }

    #[tokio::test]
    async fn accepted_submission_clears_composer_and_disables_it() {
        let mut widget = widget();
        widget.handle_key(ctrl('o'));
        type_text(&mut widget, "hello");
        widget.handle_key(press(KeyCode::Enter));

        assert!(widget.composer().content().is_empty());
        assert!(widget.session().is_pending());
        assert!(!widget.composer().is_enabled());

        // Keys typed while pending are dropped
        type_text(&mut widget, "more");
        assert!(widget.composer().content().is_empty());
        assert_eq!(widget.session().turn_count(), 2);
    }

    #[tokio::test]
    async fn commands_never_reach_the_log() {
        let mut widget = widget();
        widget.handle_key(ctrl('o'));

        type_text(&mut widget, "/help");
        assert_eq!(widget.handle_key(press(KeyCode::Enter)), WidgetAction::None);
        assert!(widget.status().is_some());

        type_text(&mut widget, "/close");
        widget.handle_key(press(KeyCode::Enter));
        assert!(!widget.session().is_open());

        widget.handle_key(press(KeyCode::Enter));
        type_text(&mut widget, "/q");
        assert_eq!(widget.handle_key(press(KeyCode::Enter)), WidgetAction::Quit);

        assert_eq!(widget.session().turn_count(), 1);
    }

    #[tokio::test]
    async fn escape_closes_and_ctrl_c_quits() {
        let mut widget = widget();
        widget.handle_key(ctrl('o'));
        assert!(widget.session().is_open());

        widget.handle_key(press(KeyCode::Esc));
        assert!(!widget.session().is_open());

        assert_eq!(widget.handle_key(ctrl('c')), WidgetAction::Quit);
    }

    #[tokio::test]
    async fn renders_launcher_and_panel() {
        let mut widget = widget();
        let area = Rect::new(0, 0, 80, 24);

        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);
        let launcher_row: String = (0..area.width)
            .map(|x| buf.get(x, area.height - 2).symbol().to_string())
            .collect();
        assert!(launcher_row.contains("Chat (Ctrl+O)"));

        widget.handle_key(ctrl('o'));
        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);
        let screen: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf.get(x, y).symbol().to_string())
            .collect();
        assert!(screen.contains("Chatbot Assistant"));
        assert!(screen.contains("Hello! How can I assist you today?"));
    }
}
