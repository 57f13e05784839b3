//! Transcript entries.

use chrono::{DateTime, Utc};

/// Who a transcript entry is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Error,
}

/// One immutable transcript entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sources: Vec<String>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            sources,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, Vec::new())
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<String>) -> Self {
        Self::new(Role::Assistant, content, sources)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(Role::Error, content, Vec::new())
    }
}

/// Ordered, append-only message list. Only [`Transcript::clear`] removes entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[ChatMessage] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
