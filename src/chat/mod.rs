//! Conversation with the analysis assistant.

pub mod controller;

pub use controller::{Avatars, ConversationController, PendingChat, CHAT_FAILURE_TEXT};
