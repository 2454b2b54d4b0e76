//! HTTP API for chatge
//!
//! Serves the chat page, the htmx fragment endpoints and static assets.

mod assets;
mod handlers;
mod templates;
mod types;

pub use handlers::create_router;
pub use templates::{ChatPage, HtmlTemplate, MessageFragment};
pub use types::*;

use crate::bot::BotService;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<dyn BotService>,
}

impl AppState {
    pub fn new(bot: Arc<dyn BotService>) -> Self {
        Self { bot }
    }
}
