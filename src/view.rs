//! In-memory chat view
//!
//! The transcript keeps every swapped fragment as a node in arrival order.
//! A node counts as a message only when its root element carries the
//! `chat-message` class, so trailing non-message nodes never capture the
//! scroll target.

use crate::controller::ViewPresence;
use crate::runtime::ChatView;

/// Marker class of message nodes in the transcript
pub const MESSAGE_CLASS: &str = "chat-message";

/// One swapped fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptNode {
    pub classes: Vec<String>,
    pub html: String,
}

impl TranscriptNode {
    pub fn parse(html: &str) -> Self {
        Self {
            classes: root_classes(html),
            html: html.to_string(),
        }
    }

    pub fn is_message(&self) -> bool {
        self.classes.iter().any(|c| c == MESSAGE_CLASS)
    }

    /// Visible text with tags stripped and whitespace collapsed
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.html.len());
        let mut in_tag = false;
        for ch in self.html.chars() {
            match ch {
                '<' => {
                    in_tag = true;
                    text.push(' ');
                }
                '>' if in_tag => in_tag = false,
                _ if !in_tag => text.push(ch),
                _ => {}
            }
        }
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        unescape_html(&collapsed)
    }
}

/// Class list of the fragment's first element
fn root_classes(html: &str) -> Vec<String> {
    let Some((_, rest)) = html.split_once('<') else {
        return vec![];
    };
    let Some((tag, _)) = rest.split_once('>') else {
        return vec![];
    };
    let Some((_, value)) = tag.split_once("class=") else {
        return vec![];
    };
    let mut chars = value.chars();
    let Some(quote @ ('"' | '\'')) = chars.next() else {
        return vec![];
    };
    let value = chars.as_str().split(quote).next().unwrap_or_default();

    value.split_whitespace().map(str::to_string).collect()
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&#x2f;", "/")
        .replace("&amp;", "&")
}

/// Ordered transcript nodes, append only
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    nodes: Vec<TranscriptNode>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append-swap a fragment; whitespace-only fragments add nothing
    pub fn append_fragment(&mut self, html: &str) {
        let html = html.trim();
        if html.is_empty() {
            return;
        }
        self.nodes.push(TranscriptNode::parse(html));
    }

    pub fn nodes(&self) -> &[TranscriptNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the last node carrying the message marker
    pub fn last_message_index(&self) -> Option<usize> {
        self.nodes.iter().rposition(TranscriptNode::is_message)
    }

    pub fn messages(&self) -> impl Iterator<Item = &TranscriptNode> {
        self.nodes.iter().filter(|n| n.is_message())
    }
}

/// A complete in-memory view: transcript, input field and send button
#[derive(Debug, Clone)]
pub struct TranscriptView {
    transcript: Option<Transcript>,
    input: Option<String>,
    send_disabled: bool,
    scrolled_to: Option<usize>,
    failures: Vec<String>,
}

impl Default for TranscriptView {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptView {
    /// View with chat area and input mounted
    pub fn new() -> Self {
        Self {
            transcript: Some(Transcript::new()),
            input: Some(String::new()),
            send_disabled: false,
            scrolled_to: None,
            failures: Vec::new(),
        }
    }

    /// View with neither chat area nor input mounted
    pub fn unmounted() -> Self {
        Self {
            transcript: None,
            input: None,
            ..Self::new()
        }
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        self.transcript.as_ref()
    }

    /// Node index last scrolled into view
    pub fn scrolled_to(&self) -> Option<usize> {
        self.scrolled_to
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

impl ChatView for TranscriptView {
    fn presence(&self) -> ViewPresence {
        ViewPresence {
            chat_area: self.transcript.is_some(),
            input: self.input.is_some(),
        }
    }

    fn input_value(&self) -> Option<String> {
        self.input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        if let Some(input) = self.input.as_mut() {
            *input = value.to_string();
        }
    }

    fn clear_input(&mut self) {
        if let Some(input) = self.input.as_mut() {
            input.clear();
        }
    }

    fn append_fragment(&mut self, html: &str) {
        match self.transcript.as_mut() {
            Some(transcript) => transcript.append_fragment(html),
            None => tracing::debug!("No chat area mounted, dropping fragment"),
        }
    }

    fn scroll_to_last_message(&mut self) -> bool {
        let Some(index) = self
            .transcript
            .as_ref()
            .and_then(Transcript::last_message_index)
        else {
            return false;
        };
        self.scrolled_to = Some(index);
        true
    }

    fn set_send_disabled(&mut self, disabled: bool) {
        self.send_disabled = disabled;
    }

    fn is_send_disabled(&self) -> bool {
        self.send_disabled
    }

    fn report_failure(&mut self, message: &str) {
        self.failures.push(message.to_string());
    }
}
