//! Transport error.

use thiserror::Error;

/// The backend operation a request belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SendMessage,
    ConfirmTicket,
    VerifyPassword,
    ReadSettings,
    WriteSettings,
    ListTemplates,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SendMessage => "send message",
            Self::ConfirmTicket => "confirm ticket",
            Self::VerifyPassword => "verify admin password",
            Self::ReadSettings => "read admin settings",
            Self::WriteSettings => "write admin settings",
            Self::ListTemplates => "list templates",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A backend request failed.
///
/// Network errors, timeouts, non-2xx statuses and undecodable bodies are all
/// the same failure to callers; `detail` exists only for diagnostics.
#[derive(Debug, Error)]
#[error("{operation} request failed: {detail}")]
pub struct RequestError {
    pub operation: Operation,
    pub detail: String,
}

impl RequestError {
    pub fn new(operation: Operation, detail: impl Into<String>) -> Self {
        Self {
            operation,
            detail: detail.into(),
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, RequestError>;
