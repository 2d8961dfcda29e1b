//! Storefront support chat widget: session core, HTTP transport and a
//! terminal front end.

pub mod config;
pub mod events;
pub mod session;
pub mod store;
pub mod transport;
pub mod ui;

pub use config::Config;
pub use events::{SessionEvent, Sender, Turn, TurnId};
pub use session::{ChatSession, IgnoreReason, Submission};
pub use store::MessageStore;
pub use transport::{ChatTransport, HttpTransport, TransportError};
