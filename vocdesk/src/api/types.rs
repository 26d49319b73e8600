//! Request and response bodies exchanged with the backend.

use serde::{Deserialize, Serialize};

use crate::models::{MessageKind, MessageMetadata, TemplateFields};

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub session_id: &'a str,
    pub message: &'a str,
}

/// Reply to a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub metadata: Option<MessageMetadata>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmRequest<'a> {
    pub template_id: &'a str,
    pub fields: &'a TemplateFields,
}

/// The ticket created by a confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub ticket_key: String,
    pub ticket_url: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyRequest<'a> {
    pub password: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub ok: bool,
}
