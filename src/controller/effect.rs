//! Effects produced by controller transitions

use crate::exchange::FormParams;

/// Effects to be executed after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Scroll the last `chat-message` node into view
    ScrollToLastMessage,

    /// Clear the input field
    ClearInput,

    /// Cancel the exchange awaiting confirmation
    CancelExchange,

    /// Let the submission exchange go out with these parameters
    ProceedExchange { params: FormParams },

    /// Click the send button, starting the submission flow
    ClickSend,

    DisableSendButton,

    EnableSendButton,

    /// Fetch the bot's reply and append it to the transcript
    RequestBotResponse { params: FormParams },

    /// Surface a failed bot-response exchange to the user
    ReportBotFailure { message: String },
}

impl Effect {
    pub fn proceed(message: impl Into<String>) -> Self {
        Effect::ProceedExchange {
            params: FormParams::new(message),
        }
    }

    pub fn request_bot_response(params: FormParams) -> Self {
        Effect::RequestBotResponse { params }
    }
}
