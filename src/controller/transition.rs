//! Pure state transition function
//!
//! Given the same state and event, `transition` always produces the same
//! state and effects. All DOM and network work is left to the runtime.

use super::{BotOutcome, ControllerState, Effect, Event, Key};
use crate::exchange::{FormParams, SHOW_MY_MESSAGE_PATH};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ControllerState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ControllerState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("An exchange is already in flight")]
    ExchangeInFlight,
    #[error("A bot reply is already in flight")]
    BotReplyInFlight,
    #[error("No bot reply is in flight")]
    NoBotReplyInFlight,
}

/// Blank means empty or whitespace only
pub fn is_blank(input: &str) -> bool {
    input.trim().is_empty()
}

/// Pure transition function
pub fn transition(
    state: &ControllerState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Exchange completion
        // ============================================================
        (
            _,
            Event::ExchangeCompleted {
                request_path,
                successful,
                view,
            },
        ) => {
            let is_submission = request_path == SHOW_MY_MESSAGE_PATH;

            // A submission that never swapped releases the latch
            let next = match state {
                ControllerState::Submitting { .. } if is_submission && !successful => {
                    ControllerState::Idle
                }
                _ => state.clone(),
            };

            // Chat area or input missing -> nothing to do
            if !view.is_ready() {
                return Ok(TransitionResult::new(next));
            }

            let result = TransitionResult::new(next).with_effect(Effect::ScrollToLastMessage);
            if successful && is_submission {
                Ok(result.with_effect(Effect::ClearInput))
            } else {
                Ok(result)
            }
        }

        // ============================================================
        // Confirmation
        // ============================================================
        (_, Event::ConfirmRequested { input }) if is_blank(&input) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::CancelExchange))
        }

        (ControllerState::Idle, Event::ConfirmRequested { input }) => {
            let params = FormParams::new(input);
            Ok(TransitionResult::new(ControllerState::Submitting {
                params: params.clone(),
            })
            .with_effect(Effect::ProceedExchange { params }))
        }

        // One submission at a time
        (_, Event::ConfirmRequested { .. }) => Err(TransitionError::ExchangeInFlight),

        // ============================================================
        // Post-swap: chain the bot-response exchange
        // ============================================================
        (
            ControllerState::Idle | ControllerState::Submitting { .. },
            Event::MessageSwapped {
                request_path,
                params,
            },
        ) if request_path == SHOW_MY_MESSAGE_PATH => Ok(TransitionResult::new(
            ControllerState::AwaitingBotReply {
                params: params.clone(),
            },
        )
        .with_effects([
            Effect::DisableSendButton,
            Effect::request_bot_response(params),
        ])),

        (ControllerState::AwaitingBotReply { .. }, Event::MessageSwapped { request_path, .. })
            if request_path == SHOW_MY_MESSAGE_PATH =>
        {
            Err(TransitionError::BotReplyInFlight)
        }

        // Swaps from any other exchange (the bot reply itself included)
        (_, Event::MessageSwapped { .. }) => Ok(TransitionResult::new(state.clone())),

        // ============================================================
        // Bot response settled, success or failure
        // ============================================================
        (ControllerState::AwaitingBotReply { .. }, Event::BotResponseSettled { outcome }) => {
            let result = TransitionResult::new(ControllerState::Idle)
                .with_effect(Effect::EnableSendButton);
            match outcome {
                BotOutcome::Delivered => Ok(result),
                BotOutcome::Failed { message } => {
                    Ok(result.with_effect(Effect::ReportBotFailure { message }))
                }
            }
        }

        (_, Event::BotResponseSettled { .. }) => Err(TransitionError::NoBotReplyInFlight),

        // ============================================================
        // Keyboard
        // ============================================================
        (ControllerState::Idle, Event::KeyUp { key: Key::Enter }) => {
            Ok(TransitionResult::new(ControllerState::Idle).with_effect(Effect::ClickSend))
        }

        // Exchange in flight or any other key
        (_, Event::KeyUp { .. }) => Ok(TransitionResult::new(state.clone())),
    }
}
