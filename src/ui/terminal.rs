use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, warn};

use crate::events::SessionEvent;
use crate::ui::conversation::{ChatWidget, WidgetAction};

const TICK: Duration = Duration::from_millis(100);

/// Owns the terminal for the lifetime of the widget; restores it on drop
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    pub fn init() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        stdout
            .execute(EnterAlternateScreen)
            .context("Failed to enter alternate screen")?;
        let terminal =
            Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")?;
        Ok(Self { terminal })
    }

    /// Draw and dispatch input until the widget asks to quit.
    ///
    /// Must run inside a tokio runtime so submissions can spawn their request.
    pub fn run(&mut self, widget: &mut ChatWidget) -> Result<()> {
        let mut events = widget.session().subscribe();

        loop {
            loop {
                match events.try_recv() {
                    Ok(SessionEvent::PendingChanged(pending)) => {
                        debug!(pending, "Pending state changed");
                        widget.sync_pending();
                    }
                    Ok(_) => {}
                    Err(TryRecvError::Lagged(skipped)) => {
                        warn!(skipped, "Session events lagged");
                        widget.sync_pending();
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }

            self.terminal
                .draw(|frame| frame.render_widget(&*widget, frame.size()))
                .context("Failed to draw frame")?;

            if event::poll(TICK).context("Failed to poll terminal events")? {
                if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                    if widget.handle_key(key) == WidgetAction::Quit {
                        break;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}
