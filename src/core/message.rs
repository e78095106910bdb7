use std::fmt;

use chrono::{DateTime, Local};

/// Stable key for a transcript entry. Unique within a session and strictly
/// increasing in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(i64);

impl MessageId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscriptRole {
    User,
    Assistant,
}

impl TranscriptRole {
    /// Role name used by the Gemini `contents` payload.
    pub fn to_api_role(self) -> &'static str {
        match self {
            TranscriptRole::User => "user",
            TranscriptRole::Assistant => "model",
        }
    }

    pub fn is_user(self) -> bool {
        self == TranscriptRole::User
    }

    pub fn is_assistant(self) -> bool {
        self == TranscriptRole::Assistant
    }
}

/// Where a transcript entry is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageStatus {
    /// Content is final.
    #[default]
    Complete,
    /// Assistant reply whose content is still being revealed.
    Revealing,
    /// User prompt whose turn ended with a provider failure.
    Unanswered,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub role: TranscriptRole,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Local>,
}

impl Message {
    pub fn new(id: MessageId, role: TranscriptRole, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            status: MessageStatus::Complete,
            created_at: Local::now(),
        }
    }

    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(id, TranscriptRole::User, content)
    }

    /// An empty assistant reply awaiting its reveal.
    pub fn pending_assistant(id: MessageId) -> Self {
        Self {
            status: MessageStatus::Revealing,
            ..Self::new(id, TranscriptRole::Assistant, String::new())
        }
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.role.is_assistant()
    }

    pub fn is_complete_reply(&self) -> bool {
        self.is_assistant() && self.status == MessageStatus::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_maps_to_model_role_for_api() {
        assert_eq!(TranscriptRole::Assistant.to_api_role(), "model");
        assert_eq!(TranscriptRole::User.to_api_role(), "user");
    }

    #[test]
    fn pending_assistant_starts_empty_and_revealing() {
        let message = Message::pending_assistant(MessageId::new(7));
        assert!(message.content.is_empty());
        assert_eq!(message.status, MessageStatus::Revealing);
        assert!(!message.is_complete_reply());
    }
}
