//! Controller runtime executor

use super::traits::{ChatView, ExchangeClient};
use super::{ControllerHandle, RuntimeEvent};
use crate::controller::{transition, BotOutcome, ControllerState, Effect, Event, Key};
use crate::exchange::{ExchangeError, FormParams, BOT_RESPONSE_PATH, SHOW_MY_MESSAGE_PATH};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Default time allowed for a single exchange
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(120);

const QUEUE_CAPACITY: usize = 32;

/// Generic controller runtime that can work with any view and exchange client
pub struct ControllerRuntime<V, C>
where
    V: ChatView,
    C: ExchangeClient + 'static,
{
    state: ControllerState,
    view: V,
    client: Arc<C>,
    exchange_timeout: Duration,
    /// Events from `ControllerHandle`s
    ui_rx: mpsc::Receiver<RuntimeEvent>,
    ui_closed: bool,
    /// Results of background exchanges
    internal_rx: mpsc::Receiver<RuntimeEvent>,
    internal_tx: mpsc::Sender<RuntimeEvent>,
    /// Exchanges spawned but not yet reported back
    in_flight: usize,
    /// Callers waiting for the controller to return to `Idle`
    idle_waiters: Vec<oneshot::Sender<()>>,
}

impl<V, C> ControllerRuntime<V, C>
where
    V: ChatView,
    C: ExchangeClient + 'static,
{
    pub fn new(mut view: V, client: C) -> (Self, ControllerHandle) {
        let (ui_tx, ui_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (internal_tx, internal_rx) = mpsc::channel(QUEUE_CAPACITY);

        view.set_send_disabled(false);

        let runtime = Self {
            state: ControllerState::Idle,
            view,
            client: Arc::new(client),
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
            ui_rx,
            ui_closed: false,
            internal_rx,
            internal_tx,
            in_flight: 0,
            idle_waiters: Vec::new(),
        };

        (runtime, ControllerHandle::new(ui_tx))
    }

    /// Bound every exchange; a request that exceeds it settles as a failure
    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = timeout;
        self
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Process events until every handle is dropped and no exchange is pending
    pub async fn run(mut self) -> V {
        tracing::info!("Starting controller runtime");

        while let Some(event) = self.next_event().await {
            self.dispatch(event);
        }

        tracing::info!("Controller runtime stopped");
        self.view
    }

    /// Wait for the next queued event
    ///
    /// Returns `None` once all handles are gone and nothing is in flight.
    pub async fn next_event(&mut self) -> Option<RuntimeEvent> {
        loop {
            if self.ui_closed && self.in_flight == 0 {
                return None;
            }

            tokio::select! {
                Some(event) = self.internal_rx.recv(), if self.in_flight > 0 => {
                    return Some(event);
                }
                event = self.ui_rx.recv(), if !self.ui_closed => match event {
                    Some(event) => return Some(event),
                    None => {
                        tracing::debug!(in_flight = self.in_flight, "All controller handles dropped");
                        self.ui_closed = true;
                    }
                },
            }
        }
    }

    /// Apply one queued event
    pub fn dispatch(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::InputChanged(value) => self.view.set_input_value(&value),

            RuntimeEvent::KeyUp(key) => {
                if key == Key::Enter && !self.state.is_idle() {
                    tracing::info!(
                        send_disabled = self.state.send_disabled(),
                        "Exchange in flight, ignoring Enter"
                    );
                }
                self.handle(Event::KeyUp { key });
            }

            RuntimeEvent::WhenIdle(waiter) => self.idle_waiters.push(waiter),

            RuntimeEvent::SubmissionReturned { params, result } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                let successful = match result {
                    Ok(fragment) => {
                        self.view.append_fragment(&fragment);
                        self.handle(Event::MessageSwapped {
                            request_path: SHOW_MY_MESSAGE_PATH.to_string(),
                            params,
                        });
                        true
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, kind = ?e.kind, "Message submission failed");
                        false
                    }
                };
                self.handle(self.completed(SHOW_MY_MESSAGE_PATH, successful));
            }

            RuntimeEvent::BotReplyReturned { result } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                let (outcome, successful) = match result {
                    Ok(fragment) => {
                        self.view.append_fragment(&fragment);
                        self.handle(Event::MessageSwapped {
                            request_path: BOT_RESPONSE_PATH.to_string(),
                            params: self.pending_params(),
                        });
                        (BotOutcome::Delivered, true)
                    }
                    Err(e) => (
                        BotOutcome::Failed {
                            message: e.to_string(),
                        },
                        false,
                    ),
                };
                self.handle(Event::BotResponseSettled { outcome });
                self.handle(self.completed(BOT_RESPONSE_PATH, successful));
            }
        }

        if self.state.is_idle() {
            for waiter in self.idle_waiters.drain(..) {
                // The caller may have given up waiting
                let _ = waiter.send(());
            }
        }
    }

    fn completed(&self, request_path: &str, successful: bool) -> Event {
        Event::ExchangeCompleted {
            request_path: request_path.to_string(),
            successful,
            view: self.view.presence(),
        }
    }

    fn pending_params(&self) -> FormParams {
        match &self.state {
            ControllerState::Submitting { params } | ControllerState::AwaitingBotReply { params } => {
                params.clone()
            }
            ControllerState::Idle => FormParams::new(String::new()),
        }
    }

    /// Run an event and every event its effects generate, in order
    fn handle(&mut self, event: Event) {
        let mut pending = VecDeque::from([event]);

        while let Some(current) = pending.pop_front() {
            let name = current.name();

            // Pure state transition
            let result = match transition(&self.state, current) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(event = name, error = %e, "Dropping controller event");
                    continue;
                }
            };

            if result.new_state != self.state {
                tracing::debug!(event = name, state = ?result.new_state, "Controller state changed");
            }
            self.state = result.new_state;

            for effect in result.effects {
                if let Some(generated) = self.execute_effect(effect) {
                    pending.push_back(generated);
                }
            }
        }
    }

    /// Execute an effect and optionally return a generated event
    fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::ScrollToLastMessage => {
                if !self.view.scroll_to_last_message() {
                    tracing::debug!("No chat message to scroll to");
                }
                None
            }

            Effect::ClearInput => {
                self.view.clear_input();
                None
            }

            Effect::CancelExchange => {
                tracing::debug!("Blank input, submission cancelled");
                None
            }

            Effect::ProceedExchange { params } => {
                self.spawn_exchange(SHOW_MY_MESSAGE_PATH, params.clone(), move |result| {
                    RuntimeEvent::SubmissionReturned { params, result }
                });
                None
            }

            Effect::ClickSend => Some(Event::ConfirmRequested {
                input: self.view.input_value().unwrap_or_default(),
            }),

            Effect::DisableSendButton => {
                self.view.set_send_disabled(true);
                None
            }

            Effect::EnableSendButton => {
                self.view.set_send_disabled(false);
                None
            }

            Effect::RequestBotResponse { params } => {
                self.spawn_exchange(BOT_RESPONSE_PATH, params, |result| {
                    RuntimeEvent::BotReplyReturned { result }
                });
                None
            }

            Effect::ReportBotFailure { message } => {
                tracing::warn!(error = %message, "Bot response failed");
                self.view.report_failure(&message);
                None
            }
        }
    }

    /// Spawn an exchange as a background task, bounded by the exchange timeout
    ///
    /// The request runs on its own task so that a panic inside the client
    /// still reports back and releases its `in_flight` slot.
    fn spawn_exchange<F>(&mut self, path: &'static str, params: FormParams, report: F)
    where
        F: FnOnce(Result<String, ExchangeError>) -> RuntimeEvent + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let internal_tx = self.internal_tx.clone();
        let timeout = self.exchange_timeout;
        let exchange_id = uuid::Uuid::new_v4();
        self.in_flight += 1;

        tokio::spawn(async move {
            tracing::debug!(%exchange_id, path, "Starting exchange");
            let start = std::time::Instant::now();

            let request = tokio::spawn(async move {
                match tokio::time::timeout(timeout, client.post(path, &params)).await {
                    Ok(result) => result,
                    Err(_) => Err(ExchangeError::timeout(format!(
                        "{path} did not respond within {}s",
                        timeout.as_secs()
                    ))),
                }
            });

            let result = match request.await {
                Ok(result) => result,
                Err(e) => Err(ExchangeError::network(format!("{path} exchange aborted: {e}"))),
            };

            match &result {
                Ok(fragment) => tracing::debug!(
                    %exchange_id,
                    path,
                    duration_ms = %start.elapsed().as_millis(),
                    bytes = fragment.len(),
                    "Exchange completed"
                ),
                Err(e) => tracing::warn!(
                    %exchange_id,
                    path,
                    duration_ms = %start.elapsed().as_millis(),
                    error = %e,
                    "Exchange failed"
                ),
            }

            if internal_tx.send(report(result)).await.is_err() {
                tracing::debug!(%exchange_id, "Runtime gone, dropping exchange result");
            }
        });
    }
}
