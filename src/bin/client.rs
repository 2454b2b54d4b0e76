//! Terminal client for a running chatge server
//!
//! Each line read from stdin is typed into the input and followed by Enter,
//! so it goes through the same controller as the browser page.

use chatge::controller::ViewPresence;
use chatge::exchange::HttpExchangeClient;
use chatge::runtime::{ChatView, ControllerRuntime};
use chatge::view::TranscriptView;
use clap::Parser;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "chatge-client", version, about = "Chat with a chatge server from the terminal")]
struct Args {
    /// Base URL of the chatge server
    #[arg(long, env = "CHATGE_SERVER", default_value = "http://localhost:6080")]
    server: String,

    /// Seconds to wait for a single exchange before giving up
    #[arg(long, env = "CHATGE_BOT_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,
}

/// Prints each message once it is scrolled into view
struct TerminalView {
    inner: TranscriptView,
    printed: usize,
}

impl TerminalView {
    fn new() -> Self {
        Self {
            inner: TranscriptView::new(),
            printed: 0,
        }
    }
}

impl ChatView for TerminalView {
    fn presence(&self) -> ViewPresence {
        self.inner.presence()
    }

    fn input_value(&self) -> Option<String> {
        self.inner.input_value()
    }

    fn set_input_value(&mut self, value: &str) {
        self.inner.set_input_value(value);
    }

    fn clear_input(&mut self) {
        self.inner.clear_input();
    }

    fn append_fragment(&mut self, html: &str) {
        self.inner.append_fragment(html);
    }

    fn scroll_to_last_message(&mut self) -> bool {
        if !self.inner.scroll_to_last_message() {
            return false;
        }
        let Some(transcript) = self.inner.transcript() else {
            return false;
        };
        for node in transcript.nodes().iter().skip(self.printed) {
            if node.is_message() {
                println!("{}", node.text());
            }
        }
        self.printed = transcript.len();
        true
    }

    fn set_send_disabled(&mut self, disabled: bool) {
        self.inner.set_send_disabled(disabled);
    }

    fn is_send_disabled(&self) -> bool {
        self.inner.is_send_disabled()
    }

    fn report_failure(&mut self, message: &str) {
        println!("! no reply from the bot: {message}");
        self.inner.report_failure(message);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatge=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = HttpExchangeClient::new(&args.server)?;
    tracing::info!(server = %client.base_url(), "Connecting to chatge server");

    let (runtime, handle) = ControllerRuntime::new(TerminalView::new(), client);
    let runtime = runtime.with_exchange_timeout(Duration::from_secs(args.timeout_secs));
    let runner = tokio::spawn(runtime.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        handle.submit(line).await?;
        // One message at a time; the next line waits for the bot's reply
        handle.wait_until_idle().await?;
    }

    // Let the last reply arrive before exiting
    drop(handle);
    let view = runner.await?;
    if let Some(transcript) = view.inner.transcript() {
        tracing::info!(messages = transcript.messages().count(), "Session finished");
    }

    Ok(())
}
