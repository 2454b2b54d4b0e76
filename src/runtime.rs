//! Runtime for the chat input controller
//!
//! Owns the controller state together with the view and exchange client,
//! and processes one event at a time. Exchanges run on background tasks
//! and report back through the runtime's queue.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ControllerRuntime;
pub use traits::*;

use crate::controller::Key;
use crate::exchange::{ExchangeError, FormParams};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Events queued to a controller runtime
#[derive(Debug)]
pub enum RuntimeEvent {
    /// The user edited the input field
    InputChanged(String),

    /// A key was released in the input field
    KeyUp(Key),

    /// The message-submission exchange returned
    SubmissionReturned {
        params: FormParams,
        result: Result<String, ExchangeError>,
    },

    /// The bot-response exchange returned or timed out
    BotReplyReturned {
        result: Result<String, ExchangeError>,
    },

    /// Notify once no exchange is in flight
    WhenIdle(oneshot::Sender<()>),
}

/// The runtime has stopped accepting events
#[derive(Debug, Error)]
#[error("Controller runtime stopped")]
pub struct RuntimeStopped;

/// Handle to feed UI events into a running controller
#[derive(Clone)]
pub struct ControllerHandle {
    ui_tx: mpsc::Sender<RuntimeEvent>,
}

impl ControllerHandle {
    pub(crate) fn new(ui_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { ui_tx }
    }

    pub async fn type_input(&self, value: impl Into<String>) -> Result<(), RuntimeStopped> {
        self.send(RuntimeEvent::InputChanged(value.into())).await
    }

    pub async fn key_up(&self, key: Key) -> Result<(), RuntimeStopped> {
        self.send(RuntimeEvent::KeyUp(key)).await
    }

    /// Type `value` and press Enter
    pub async fn submit(&self, value: impl Into<String>) -> Result<(), RuntimeStopped> {
        self.type_input(value).await?;
        self.key_up(Key::Enter).await
    }

    /// Wait until every event sent so far is handled and no exchange is in flight
    pub async fn wait_until_idle(&self) -> Result<(), RuntimeStopped> {
        let (tx, rx) = oneshot::channel();
        self.send(RuntimeEvent::WhenIdle(tx)).await?;
        rx.await.map_err(|_| RuntimeStopped)
    }

    async fn send(&self, event: RuntimeEvent) -> Result<(), RuntimeStopped> {
        self.ui_tx.send(event).await.map_err(|_| RuntimeStopped)
    }
}
