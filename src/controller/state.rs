//! Controller state types

use crate::exchange::FormParams;

/// Controller state
///
/// Only `Idle` accepts a new submission. The send button is disabled
/// exactly while a bot reply is awaited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// Ready for input
    #[default]
    Idle,

    /// Message-submission exchange in flight for these parameters
    Submitting { params: FormParams },

    /// Bot-response exchange in flight for these parameters
    AwaitingBotReply { params: FormParams },
}

impl ControllerState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ControllerState::Idle)
    }

    pub fn send_disabled(&self) -> bool {
        matches!(self, ControllerState::AwaitingBotReply { .. })
    }
}
