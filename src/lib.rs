//! chatge - htmx chat front end for a local Ollama model
//!
//! The server renders the chat page and the message fragments; the chat
//! input controller reacts to UI events with a pure state machine whose
//! effects the runtime applies to a view and an exchange client.

pub mod api;
pub mod bot;
pub mod controller;
pub mod exchange;
pub mod runtime;
pub mod view;
