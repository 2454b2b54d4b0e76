//! Events delivered to the controller

use crate::exchange::FormParams;

/// A key released in the input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other(String),
}

impl Key {
    /// Map a `KeyboardEvent.key` style name
    pub fn from_name(name: &str) -> Self {
        match name {
            "Enter" => Key::Enter,
            other => Key::Other(other.to_string()),
        }
    }
}

/// Which of the nodes the completion handler needs are mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewPresence {
    pub chat_area: bool,
    pub input: bool,
}

impl ViewPresence {
    pub fn mounted() -> Self {
        Self {
            chat_area: true,
            input: true,
        }
    }

    pub fn is_ready(self) -> bool {
        self.chat_area && self.input
    }
}

/// How the bot-response exchange settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotOutcome {
    Delivered,
    Failed { message: String },
}

/// Events that trigger controller transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// Any exchange finished, successfully or not
    ExchangeCompleted {
        request_path: String,
        successful: bool,
        view: ViewPresence,
    },

    /// Raised before an exchange is issued; the controller may cancel it
    ConfirmRequested { input: String },

    /// An exchange swapped its fragment into the transcript
    MessageSwapped {
        request_path: String,
        params: FormParams,
    },

    /// The bot-response exchange settled
    BotResponseSettled { outcome: BotOutcome },

    /// Key released in the input field
    KeyUp { key: Key },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::ExchangeCompleted { .. } => "exchange_completed",
            Event::ConfirmRequested { .. } => "confirm_requested",
            Event::MessageSwapped { .. } => "message_swapped",
            Event::BotResponseSettled { .. } => "bot_response_settled",
            Event::KeyUp { .. } => "key_up",
        }
    }
}
