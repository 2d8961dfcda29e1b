//! Chat widget components

pub mod commands;
pub mod composer;
pub mod history;
pub mod indicator;
pub mod manager;
pub mod markdown;

pub use commands::{get_help_text, ParsedCommand, SlashCommand};
pub use composer::{ComposerResult, ConversationComposer};
pub use history::ConversationHistory;
pub use indicator::TypingIndicator;
pub use manager::{ChatWidget, WidgetAction};
pub use markdown::render_markdown;
