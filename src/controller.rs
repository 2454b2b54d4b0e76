//! Chat input controller
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! UI events go in, effects for the view and the exchange client come out.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::{BotOutcome, Event, Key, ViewPresence};
pub use state::ControllerState;
pub use transition::{transition, TransitionError, TransitionResult};
