//! askama templates for the page and message fragments

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Local};

/// Sender shown on the user's own messages
pub const FROM_ME: &str = "Me";

/// Sender shown on the bot's replies
pub const FROM_BOT: &str = "Bot";

/// The chat page
#[derive(Template)]
#[template(path = "chat_page.html")]
pub struct ChatPage {
    pub model: String,
}

/// One `chat-message` fragment
#[derive(Template)]
#[template(path = "chat_message.html")]
pub struct MessageFragment {
    pub from: String,
    pub time: String,
    pub text: String,
    /// Modifier class, `me` or `bot`
    pub variant: &'static str,
}

impl MessageFragment {
    pub fn from_me(text: impl Into<String>, at: DateTime<Local>) -> Self {
        Self::new(FROM_ME, "me", text, at)
    }

    pub fn from_bot(text: impl Into<String>, at: DateTime<Local>) -> Self {
        Self::new(FROM_BOT, "bot", text, at)
    }

    fn new(
        from: &str,
        variant: &'static str,
        text: impl Into<String>,
        at: DateTime<Local>,
    ) -> Self {
        Self {
            from: from.to_string(),
            time: at.format("%H:%M").to_string(),
            text: text.into(),
            variant,
        }
    }
}

/// Renders an askama template as an HTML response
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render template");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template. {e}"),
                )
                    .into_response()
            }
        }
    }
}
