//! Message model representing one entry in the conversation log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::template::TemplateFields;

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the assistant.
    Assistant,
    /// System message.
    System,
}

impl MessageRole {
    /// Convert role to its wire string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a message renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Plain text.
    #[default]
    Text,
    /// A proposed ticket template awaiting confirmation.
    TemplatePreview,
    /// A ticket that was created in the tracker.
    TicketCreated,
}

impl MessageKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::TemplatePreview => "template_preview",
            Self::TicketCreated => "ticket_created",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extra payload attached to template previews and created tickets.
///
/// Carried verbatim from the backend; which keys are present depends on the
/// message kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<TemplateFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
}

impl MessageMetadata {
    /// Metadata for a freshly created ticket.
    pub fn ticket(ticket_key: String, ticket_url: String) -> Self {
        Self {
            ticket_key: Some(ticket_key),
            ticket_url: Some(ticket_url),
            ..Self::default()
        }
    }
}

/// A message in the conversation log. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for the message.
    pub id: String,
    /// Role of the message sender.
    pub role: MessageRole,
    /// Content of the message.
    pub content: String,
    /// How the message should be rendered.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Template or ticket payload, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message with a fresh id and the current time.
    pub fn new(role: MessageRole, kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            role,
            content: content.into(),
            kind,
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    /// A plain text message typed by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, MessageKind::Text, content)
    }

    /// A plain text assistant message.
    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageKind::Text, content)
    }

    /// Attach metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Option<MessageMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Ticket key and URL, if this message announces a created ticket.
    pub fn ticket(&self) -> Option<(&str, &str)> {
        if self.kind != MessageKind::TicketCreated {
            return None;
        }
        let meta = self.metadata.as_ref()?;
        Some((meta.ticket_key.as_deref()?, meta.ticket_url.as_deref()?))
    }
}
