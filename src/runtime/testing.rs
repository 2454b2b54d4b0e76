//! Mock implementations for testing
//!
//! These mocks enable runtime testing without real I/O.

use super::traits::*;
use crate::exchange::{ExchangeError, FormParams};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

enum MockReply {
    Fragment(String),
    Error(ExchangeError),
    Hang,
    Panic,
}

/// Mock exchange client that returns queued replies per path
#[derive(Default)]
pub struct MockExchangeClient {
    replies: Mutex<HashMap<String, VecDeque<MockReply>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<(String, FormParams)>>,
}

impl MockExchangeClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self, path: &str, reply: MockReply) {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Queue a successful fragment
    pub fn queue_fragment(&self, path: &str, html: impl Into<String>) {
        self.queue(path, MockReply::Fragment(html.into()));
    }

    /// Queue an error response
    pub fn queue_error(&self, path: &str, error: ExchangeError) {
        self.queue(path, MockReply::Error(error));
    }

    /// Queue a request that never answers
    pub fn queue_hang(&self, path: &str) {
        self.queue(path, MockReply::Hang);
    }

    /// Queue a request whose task panics
    pub fn queue_panic(&self, path: &str) {
        self.queue(path, MockReply::Panic);
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<(String, FormParams)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExchangeClient for MockExchangeClient {
    async fn post(&self, path: &str, params: &FormParams) -> Result<String, ExchangeError> {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), params.clone()));

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(MockReply::Fragment(html)) => Ok(html),
            Some(MockReply::Error(error)) => Err(error),
            Some(MockReply::Hang) => std::future::pending().await,
            Some(MockReply::Panic) => panic!("mock exchange for {path} panicked"),
            None => Err(ExchangeError::network(format!(
                "No mock reply queued for {path}"
            ))),
        }
    }
}

/// A `chat-message` fragment as the server renders it
pub fn message_fragment(from: &str, text: &str) -> String {
    format!(
        r#"<div class="chat-message"><span class="chat-message__from">{from}</span> <span class="chat-message__time">12:00</span><p class="chat-message__text">{text}</p></div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControllerState, Key};
    use crate::exchange::{BOT_RESPONSE_PATH, SHOW_MY_MESSAGE_PATH};
    use crate::runtime::{ControllerHandle, ControllerRuntime, RuntimeEvent};
    use crate::view::TranscriptView;
    use std::sync::Arc;
    use std::time::Duration;

    type TestRuntime = ControllerRuntime<TranscriptView, Arc<MockExchangeClient>>;

    fn runtime_with(client: &Arc<MockExchangeClient>) -> (TestRuntime, ControllerHandle) {
        ControllerRuntime::new(TranscriptView::new(), Arc::clone(client))
    }

    fn type_and_enter(runtime: &mut TestRuntime, text: &str) {
        runtime.dispatch(RuntimeEvent::InputChanged(text.to_string()));
        runtime.dispatch(RuntimeEvent::KeyUp(Key::Enter));
    }

    async fn settle_next(runtime: &mut TestRuntime) {
        let event = runtime.next_event().await.expect("runtime closed early");
        runtime.dispatch(event);
    }

    #[tokio::test]
    async fn test_mock_exchange_client() {
        let mock = MockExchangeClient::new();
        mock.queue_fragment(SHOW_MY_MESSAGE_PATH, "<p>one</p>");

        let params = FormParams::new("hi");
        let html = mock.post(SHOW_MY_MESSAGE_PATH, &params).await.unwrap();
        assert_eq!(html, "<p>one</p>");

        // Second call should fail (no more replies)
        assert!(mock.post(SHOW_MY_MESSAGE_PATH, &params).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_input_sends_nothing() {
        let client = Arc::new(MockExchangeClient::new());
        let (mut runtime, _handle) = runtime_with(&client);

        for blank in ["", "   ", "\t \n"] {
            type_and_enter(&mut runtime, blank);
        }

        assert_eq!(runtime.in_flight(), 0);
        assert!(client.recorded_requests().is_empty());
        assert_eq!(runtime.state(), &ControllerState::Idle);
        assert!(!runtime.view().is_send_disabled());
    }

    /// "hello": submit, clear, disable, fetch reply with same params, re-enable
    #[tokio::test]
    async fn test_message_flow() {
        let client = Arc::new(MockExchangeClient::new());
        client.queue_fragment(SHOW_MY_MESSAGE_PATH, message_fragment("Me", "hello"));
        client.queue_fragment(BOT_RESPONSE_PATH, message_fragment("Bot", "hi there"));
        let (mut runtime, _handle) = runtime_with(&client);

        type_and_enter(&mut runtime, "hello");
        assert_eq!(runtime.in_flight(), 1);
        // Input stays until the submission completes
        assert_eq!(runtime.view().input_value().as_deref(), Some("hello"));

        settle_next(&mut runtime).await;

        let view = runtime.view();
        assert_eq!(view.input_value().as_deref(), Some(""));
        assert!(view.is_send_disabled());
        assert_eq!(view.scrolled_to(), Some(0));
        assert!(runtime.state().send_disabled());
        assert_eq!(runtime.in_flight(), 1);

        settle_next(&mut runtime).await;

        let view = runtime.view();
        assert!(!view.is_send_disabled());
        assert_eq!(view.scrolled_to(), Some(1));
        assert!(view.failures().is_empty());
        assert_eq!(runtime.state(), &ControllerState::Idle);

        let texts: Vec<String> = view
            .transcript()
            .unwrap()
            .messages()
            .map(|m| m.text())
            .collect();
        assert_eq!(texts, vec!["Me 12:00 hello", "Bot 12:00 hi there"]);

        assert_eq!(
            client.recorded_requests(),
            vec![
                (SHOW_MY_MESSAGE_PATH.to_string(), FormParams::new("hello")),
                (BOT_RESPONSE_PATH.to_string(), FormParams::new("hello")),
            ]
        );
    }

    #[tokio::test]
    async fn test_enter_ignored_while_bot_reply_in_flight() {
        let client = Arc::new(MockExchangeClient::new());
        client.queue_fragment(SHOW_MY_MESSAGE_PATH, message_fragment("Me", "first"));
        client.queue_hang(BOT_RESPONSE_PATH);
        let (mut runtime, _handle) = runtime_with(&client);

        type_and_enter(&mut runtime, "first");
        settle_next(&mut runtime).await;
        assert!(runtime.view().is_send_disabled());

        type_and_enter(&mut runtime, "second");

        // Only the bot request is outstanding; no second submission went out
        assert_eq!(runtime.in_flight(), 1);
        tokio::task::yield_now().await;
        let paths: Vec<String> = client
            .recorded_requests()
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        assert!(!paths[1..].contains(&SHOW_MY_MESSAGE_PATH.to_string()));
        assert_eq!(runtime.view().input_value().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_enter_ignored_while_submission_in_flight() {
        let client = Arc::new(MockExchangeClient::new());
        client.queue_fragment(SHOW_MY_MESSAGE_PATH, message_fragment("Me", "a"));
        client.queue_fragment(BOT_RESPONSE_PATH, message_fragment("Bot", "ra"));
        client.queue_fragment(SHOW_MY_MESSAGE_PATH, message_fragment("Me", "b"));
        client.queue_fragment(BOT_RESPONSE_PATH, message_fragment("Bot", "rb"));
        let (mut runtime, _handle) = runtime_with(&client);

        type_and_enter(&mut runtime, "a");
        type_and_enter(&mut runtime, "b");
        assert_eq!(runtime.in_flight(), 1);
        assert!(matches!(runtime.state(), ControllerState::Submitting { .. }));

        settle_next(&mut runtime).await;
        settle_next(&mut runtime).await;
        assert_eq!(runtime.state(), &ControllerState::Idle);
        assert_eq!(runtime.in_flight(), 0);

        // Once idle, the next message goes out with its own bot reply
        type_and_enter(&mut runtime, "b");
        settle_next(&mut runtime).await;
        settle_next(&mut runtime).await;

        let texts: Vec<String> = runtime
            .view()
            .transcript()
            .unwrap()
            .messages()
            .map(|m| m.text())
            .collect();
        assert_eq!(
            texts,
            vec!["Me 12:00 a", "Bot 12:00 ra", "Me 12:00 b", "Bot 12:00 rb"]
        );
        assert_eq!(
            client.recorded_requests(),
            vec![
                (SHOW_MY_MESSAGE_PATH.to_string(), FormParams::new("a")),
                (BOT_RESPONSE_PATH.to_string(), FormParams::new("a")),
                (SHOW_MY_MESSAGE_PATH.to_string(), FormParams::new("b")),
                (BOT_RESPONSE_PATH.to_string(), FormParams::new("b")),
            ]
        );
    }

    #[tokio::test]
    async fn test_wait_until_idle_paces_submissions() {
        let client = Arc::new(MockExchangeClient::new());
        for text in ["a", "b"] {
            client.queue_fragment(SHOW_MY_MESSAGE_PATH, message_fragment("Me", text));
            client.queue_fragment(BOT_RESPONSE_PATH, message_fragment("Bot", &format!("r{text}")));
        }
        let (runtime, handle) = runtime_with(&client);
        let task = tokio::spawn(runtime.run());

        for line in ["a", "   ", "b"] {
            handle.submit(line).await.unwrap();
            handle.wait_until_idle().await.unwrap();
        }
        drop(handle);

        let view = task.await.unwrap();
        assert_eq!(view.transcript().unwrap().messages().count(), 4);
        let paths: Vec<String> = client
            .recorded_requests()
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        assert_eq!(
            paths,
            vec![
                SHOW_MY_MESSAGE_PATH,
                BOT_RESPONSE_PATH,
                SHOW_MY_MESSAGE_PATH,
                BOT_RESPONSE_PATH
            ]
        );
    }

    #[tokio::test]
    async fn test_panicking_exchange_releases_latch() {
        let client = Arc::new(MockExchangeClient::new());
        client.queue_panic(SHOW_MY_MESSAGE_PATH);
        let (mut runtime, _handle) = runtime_with(&client);

        type_and_enter(&mut runtime, "hello");
        settle_next(&mut runtime).await;

        assert_eq!(runtime.in_flight(), 0);
        assert_eq!(runtime.state(), &ControllerState::Idle);
        assert_eq!(runtime.view().input_value().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_run_finishes_after_panicking_bot_reply() {
        let client = Arc::new(MockExchangeClient::new());
        client.queue_fragment(SHOW_MY_MESSAGE_PATH, message_fragment("Me", "hello"));
        client.queue_panic(BOT_RESPONSE_PATH);
        let (runtime, handle) = runtime_with(&client);

        let task = tokio::spawn(runtime.run());
        handle.submit("hello").await.unwrap();
        drop(handle);

        let view = task.await.unwrap();
        assert!(!view.is_send_disabled());
        assert_eq!(view.failures().len(), 1);
    }

    #[tokio::test]
    async fn test_bot_failure_reenables_and_reports() {
        let client = Arc::new(MockExchangeClient::new());
        client.queue_fragment(SHOW_MY_MESSAGE_PATH, message_fragment("Me", "hello"));
        client.queue_error(BOT_RESPONSE_PATH, ExchangeError::from_status(500, "ollama down"));
        let (mut runtime, _handle) = runtime_with(&client);

        type_and_enter(&mut runtime, "hello");
        settle_next(&mut runtime).await;
        settle_next(&mut runtime).await;

        let view = runtime.view();
        assert!(!view.is_send_disabled());
        assert_eq!(view.failures(), ["HTTP 500: ollama down".to_string()]);
        assert_eq!(view.transcript().unwrap().len(), 1);
        assert_eq!(runtime.state(), &ControllerState::Idle);

        // The latch is released, so a new message can go out
        client.queue_fragment(SHOW_MY_MESSAGE_PATH, message_fragment("Me", "again"));
        type_and_enter(&mut runtime, "again");
        assert_eq!(runtime.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_hung_bot_reply_times_out() {
        let client = Arc::new(MockExchangeClient::new());
        client.queue_fragment(SHOW_MY_MESSAGE_PATH, message_fragment("Me", "hello"));
        client.queue_hang(BOT_RESPONSE_PATH);
        let (runtime, _handle) = runtime_with(&client);
        let mut runtime = runtime.with_exchange_timeout(Duration::from_millis(20));

        type_and_enter(&mut runtime, "hello");
        settle_next(&mut runtime).await;
        assert!(runtime.view().is_send_disabled());

        settle_next(&mut runtime).await;

        let view = runtime.view();
        assert!(!view.is_send_disabled());
        assert_eq!(view.failures().len(), 1);
        assert!(view.failures()[0].contains(BOT_RESPONSE_PATH));
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_input() {
        let client = Arc::new(MockExchangeClient::new());
        client.queue_error(SHOW_MY_MESSAGE_PATH, ExchangeError::network("connection refused"));
        let (mut runtime, _handle) = runtime_with(&client);

        type_and_enter(&mut runtime, "hello");
        settle_next(&mut runtime).await;

        let view = runtime.view();
        assert_eq!(view.input_value().as_deref(), Some("hello"));
        assert!(!view.is_send_disabled());
        assert_eq!(runtime.in_flight(), 0);
        assert_eq!(client.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_scroll_ignores_trailing_non_message() {
        let client = Arc::new(MockExchangeClient::new());
        client.queue_fragment(SHOW_MY_MESSAGE_PATH, message_fragment("Me", "hello"));
        client.queue_fragment(BOT_RESPONSE_PATH, r#"<div class="notice">bot is sleeping</div>"#);
        let (mut runtime, _handle) = runtime_with(&client);

        type_and_enter(&mut runtime, "hello");
        settle_next(&mut runtime).await;
        settle_next(&mut runtime).await;

        let view = runtime.view();
        assert_eq!(view.transcript().unwrap().len(), 2);
        assert_eq!(view.scrolled_to(), Some(0));
    }

    #[tokio::test]
    async fn test_unmounted_view_skips_scroll_and_clear() {
        let client = Arc::new(MockExchangeClient::new());
        let (mut runtime, _handle) =
            ControllerRuntime::new(TranscriptView::unmounted(), Arc::clone(&client));

        // A missing input reads as blank, so nothing is sent
        runtime.dispatch(RuntimeEvent::KeyUp(Key::Enter));
        assert!(client.recorded_requests().is_empty());
        assert_eq!(runtime.view().scrolled_to(), None);
    }

    #[tokio::test]
    async fn test_run_drains_in_flight_exchanges() {
        let client = Arc::new(MockExchangeClient::new());
        client.queue_fragment(SHOW_MY_MESSAGE_PATH, message_fragment("Me", "hello"));
        client.queue_fragment(BOT_RESPONSE_PATH, message_fragment("Bot", "hey"));
        let (runtime, handle) = runtime_with(&client);

        let task = tokio::spawn(runtime.run());
        handle.submit("hello").await.unwrap();
        drop(handle);

        let view = task.await.unwrap();
        assert_eq!(view.transcript().unwrap().messages().count(), 2);
        assert!(!view.is_send_disabled());
        assert_eq!(view.input_value().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_handle_reports_stopped_runtime() {
        let client = Arc::new(MockExchangeClient::new());
        let (runtime, handle) = runtime_with(&client);
        drop(runtime);

        assert!(handle.submit("hello").await.is_err());
    }
}
