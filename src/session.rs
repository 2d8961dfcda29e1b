use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::FutureExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::events::{SessionEvent, Turn};
use crate::store::MessageStore;
use crate::transport::ChatTransport;

const EVENT_CAPACITY: usize = 256;

/// Why a submission was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Input was empty after trimming
    Empty,
    /// A request is already outstanding
    Busy,
}

/// Result of [`ChatSession::submit`]
#[derive(Debug)]
pub enum Submission {
    /// The user turn was appended and the request is running on this task
    Accepted(JoinHandle<()>),
    Ignored(IgnoreReason),
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }
}

struct SessionState {
    store: MessageStore,
    pending: bool,
    is_open: bool,
}

/// Chat session controller.
///
/// Owns the turn log, the visibility flag and the pending flag. Clones share
/// the same session; hand a reference to every view that needs it.
#[derive(Clone)]
pub struct ChatSession {
    state: Arc<Mutex<SessionState>>,
    transport: Arc<dyn ChatTransport>,
    events: broadcast::Sender<SessionEvent>,
    fallback_reply: Arc<str>,
}

impl ChatSession {
    pub fn new(config: &Config, transport: Arc<dyn ChatTransport>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(SessionState {
                store: MessageStore::new(config.greeting.clone()),
                pending: false,
                is_open: config.ui.start_open,
            })),
            transport,
            events,
            fallback_reply: Arc::from(config.fallback_reply.as_str()),
        }
    }

    /// Submit a user message.
    ///
    /// Blank input, or input arriving while a request is outstanding, is
    /// ignored without touching the log. Otherwise the user turn is appended
    /// and the request runs on a spawned task; must be called from within a
    /// tokio runtime.
    pub fn submit(&self, text: &str) -> Submission {
        if text.trim().is_empty() {
            debug!("Ignoring empty submission");
            return Submission::Ignored(IgnoreReason::Empty);
        }

        let (user_turn, history) = {
            let mut state = self.lock();
            if state.pending {
                debug!("Ignoring submission while a request is pending");
                return Submission::Ignored(IgnoreReason::Busy);
            }
            let history = state.store.snapshot();
            let turn = Turn::user(text);
            state.store.append(turn.clone());
            state.pending = true;
            (turn, history)
        };

        info!(turn = %user_turn.id, history = history.len(), "Submitting message");
        self.publish(SessionEvent::TurnAppended(user_turn));
        self.publish(SessionEvent::PendingChanged(true));

        let session = self.clone();
        let message = text.to_string();
        let handle = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(async {
                session.transport.send(&message, &history).await
            })
            .catch_unwind()
            .await;

            let turn = match outcome {
                Ok(Ok(Some(reply))) if !reply.is_empty() => Turn::bot(reply),
                Ok(Ok(_)) => Turn::bot(session.fallback_reply.as_ref()),
                Ok(Err(e)) => {
                    error!("Error sending message to backend: {}", e);
                    Turn::error(&e)
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    error!("Chat transport panicked: {}", reason);
                    Turn::error(reason)
                }
            };
            session.complete(turn);
        });

        Submission::Accepted(handle)
    }

    /// Flip the open/closed state, returning the new value
    pub fn toggle_open(&self) -> bool {
        let is_open = {
            let mut state = self.lock();
            state.is_open = !state.is_open;
            state.is_open
        };
        self.publish(SessionEvent::VisibilityChanged(is_open));
        is_open
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    /// Copy of the log in insertion order
    pub fn turns(&self) -> Vec<Turn> {
        self.lock().store.snapshot()
    }

    pub fn last_turn(&self) -> Option<Turn> {
        self.lock().store.last().cloned()
    }

    pub fn turn_count(&self) -> usize {
        self.lock().store.len()
    }

    /// Receive state-change notifications; dropping the receiver unsubscribes
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn complete(&self, turn: Turn) {
        {
            let mut state = self.lock();
            state.store.append(turn.clone());
            state.pending = false;
        }
        info!(turn = %turn.id, "Request finished");
        self.publish(SessionEvent::TurnAppended(turn));
        self.publish(SessionEvent::PendingChanged(false));
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "request handler panicked".to_string()
    }
}
