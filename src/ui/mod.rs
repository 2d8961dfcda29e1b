//! Terminal presentation layer

pub mod conversation;
pub mod terminal;

pub use conversation::{ChatWidget, WidgetAction};
pub use terminal::Tui;
