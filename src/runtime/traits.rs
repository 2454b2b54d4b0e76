//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with mock implementations.

use crate::controller::ViewPresence;
use crate::exchange::{ExchangeError, FormParams, HttpExchangeClient};
use async_trait::async_trait;
use std::sync::Arc;

/// The DOM nodes the controller touches, acquired once
pub trait ChatView: Send {
    /// Whether the chat area and input field are mounted
    fn presence(&self) -> ViewPresence;

    /// Current input value, `None` when the input is not mounted
    fn input_value(&self) -> Option<String>;

    fn set_input_value(&mut self, value: &str);

    fn clear_input(&mut self);

    /// Append-swap a fragment into the transcript
    fn append_fragment(&mut self, html: &str);

    /// Scroll the last message node into view; false if there is none
    fn scroll_to_last_message(&mut self) -> bool;

    fn set_send_disabled(&mut self, disabled: bool);

    fn is_send_disabled(&self) -> bool;

    /// Show an exchange failure to the user
    fn report_failure(&mut self, message: &str);
}

/// Client for hypermedia exchanges
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// POST the form parameters to `path`, returning the HTML fragment
    async fn post(&self, path: &str, params: &FormParams) -> Result<String, ExchangeError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: ExchangeClient + ?Sized> ExchangeClient for Arc<T> {
    async fn post(&self, path: &str, params: &FormParams) -> Result<String, ExchangeError> {
        (**self).post(path, params).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl ExchangeClient for HttpExchangeClient {
    async fn post(&self, path: &str, params: &FormParams) -> Result<String, ExchangeError> {
        self.post_fragment(path, params).await
    }
}
