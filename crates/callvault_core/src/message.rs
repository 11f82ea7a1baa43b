//! Chat message types.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A single message in a chat about recorded calls.
///
/// # Examples
///
/// ```
/// use callvault_core::{ChatMessage, Role};
///
/// let message = ChatMessage::new("msg-1", Role::User, "Summarise yesterday's standup");
/// assert_eq!(message.role, Role::User);
/// assert!(!message.is_blank());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Stable message identifier
    pub id: String,
    /// The role of the message sender
    pub role: Role,
    /// Text content received so far
    pub content: String,
}

impl ChatMessage {
    /// Create a new message.
    pub fn new(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
        }
    }

    /// True when the message has no visible text yet.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}
