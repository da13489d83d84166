//! Conversation controller.
//!
//! Keeps the ordered message log and allows one outstanding chat request at
//! a time. A submission while a request is pending is dropped, not queued.
//! The user's message is appended before the request is awaited, and exactly
//! one assistant message follows it whatever the transport returns.

use crate::error::TransportError;
use crate::models::{ChatReply, ConversationMessage, MessageId, Role};
use crate::transport::Transport;
use chrono::Utc;
use serde_json::Map;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Assistant text used when the chat request fails.
pub const CHAT_FAILURE_TEXT: &str = "Sorry, I encountered an error processing your request.";

/// Avatar references attached to each side of the conversation.
#[derive(Debug, Clone)]
pub struct Avatars {
    pub user: String,
    pub assistant: String,
}

impl Default for Avatars {
    fn default() -> Self {
        Self {
            user: crate::config::default_user_avatar(),
            assistant: crate::config::default_assistant_avatar(),
        }
    }
}

/// An accepted submission whose reply has not been appended yet.
#[derive(Debug)]
pub struct PendingChat {
    message: String,
}

impl PendingChat {
    pub fn message(&self) -> &str {
        &self.message
    }
}

pub struct ConversationController {
    transport: Arc<dyn Transport>,
    avatars: Avatars,
    messages: Vec<ConversationMessage>,
    details_visible: HashMap<MessageId, bool>,
    in_flight: bool,
    last_id: i64,
}

impl ConversationController {
    pub fn new(transport: Arc<dyn Transport>, avatars: Avatars) -> Self {
        Self {
            transport,
            avatars,
            messages: Vec::new(),
            details_visible: HashMap::new(),
            in_flight: false,
            last_id: 0,
        }
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn details(&self) -> &HashMap<MessageId, bool> {
        &self.details_visible
    }

    pub fn details_visible(&self, id: MessageId) -> bool {
        self.details_visible.get(&id).copied().unwrap_or(false)
    }

    /// Accept a submission: append the user message and mark a request in
    /// flight. Returns `None` for blank text or while a request is pending.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingChat> {
        if text.trim().is_empty() {
            return None;
        }

        if self.in_flight {
            debug!("Chat request already in flight; dropping submission");
            return None;
        }

        self.messages.push(ConversationMessage {
            id: None,
            role: Role::User,
            text: text.to_string(),
            insights: Map::new(),
            references: Vec::new(),
            avatar: self.avatars.user.clone(),
        });
        self.in_flight = true;

        Some(PendingChat {
            message: text.to_string(),
        })
    }

    /// Append the assistant message for `pending` and release the lock.
    pub fn finish(&mut self, pending: PendingChat, result: Result<ChatReply, TransportError>) {
        let message = match result {
            Ok(reply) => {
                let id = self.next_id();
                self.details_visible.insert(id, false);
                info!("Chat reply received ({} chars)", reply.text().len());

                ConversationMessage {
                    id: Some(id),
                    role: Role::Assistant,
                    text: reply.text(),
                    insights: reply.insights(),
                    references: reply.references(),
                    avatar: self.avatars.assistant.clone(),
                }
            }
            Err(err) => {
                warn!("Chat request for {:?} failed: {}", pending.message, err);

                ConversationMessage {
                    id: None,
                    role: Role::Assistant,
                    text: CHAT_FAILURE_TEXT.to_string(),
                    insights: Map::new(),
                    references: Vec::new(),
                    avatar: self.avatars.assistant.clone(),
                }
            }
        };

        self.messages.push(message);
        self.in_flight = false;
    }

    /// Submit, await the reply and append it. Returns whether the
    /// submission was accepted.
    pub async fn submit(&mut self, text: &str) -> bool {
        let Some(pending) = self.begin_submit(text) else {
            return false;
        };

        let result = self.transport.chat(pending.message()).await;
        self.finish(pending, result);
        true
    }

    /// Flip detail visibility for one message. Unknown ids are ignored.
    pub fn toggle_details(&mut self, id: MessageId) {
        if !self.messages.iter().any(|m| m.id == Some(id)) {
            return;
        }

        let visible = self.details_visible.entry(id).or_insert(false);
        *visible = !*visible;
    }

    /// Millisecond timestamp, bumped when two replies land in the same ms.
    fn next_id(&mut self) -> MessageId {
        let now = Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);
        MessageId(self.last_id)
    }
}
