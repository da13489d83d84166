//! Scripted transport double for controller tests.

use super::Transport;
use crate::error::TransportError;
use crate::models::ChatReply;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Replays canned results and counts every call.
pub struct ScriptedTransport {
    analyze_result: Result<Value, TransportError>,
    chat_results: Mutex<VecDeque<Result<ChatReply, TransportError>>>,
    analyze_calls: AtomicUsize,
    chat_messages: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            analyze_result: Ok(Value::Object(Default::default())),
            chat_results: Mutex::new(VecDeque::new()),
            analyze_calls: AtomicUsize::new(0),
            chat_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn with_report(mut self, report: Value) -> Self {
        self.analyze_result = Ok(report);
        self
    }

    pub fn with_analyze_error(mut self, err: TransportError) -> Self {
        self.analyze_result = Err(err);
        self
    }

    /// Queue a chat result; an empty queue answers with an empty reply.
    pub fn push_chat(self, result: Result<ChatReply, TransportError>) -> Self {
        self.chat_results.lock().unwrap().push_back(result);
        self
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn chat_messages(&self) -> Vec<String> {
        self.chat_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn analyze(&self, _subject: &str) -> Result<Value, TransportError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.analyze_result.clone()
    }

    async fn chat(&self, message: &str) -> Result<ChatReply, TransportError> {
        self.chat_messages.lock().unwrap().push(message.to_string());
        self.chat_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ChatReply::default()))
    }
}
