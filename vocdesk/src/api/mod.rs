//! Backend transport.
//!
//! The conversation store and the settings panel only see the [`Backend`]
//! trait; [`HttpBackend`] is the real implementation.
//!
//! Endpoints:
//! - POST /api/chat - Send a user message
//! - POST /api/chat/{session_id}/confirm - Create the ticket for a template
//! - POST /api/admin/verify - Check the admin password
//! - GET /api/admin/settings - Read settings (X-Admin-Password)
//! - PUT /api/admin/settings - Write changed settings (X-Admin-Password)
//! - GET /api/templates - List ticket templates

mod client;
mod error;
mod types;

use async_trait::async_trait;

use crate::models::{AdminSettings, AdminSettingsUpdate, TemplateFields, TemplateSummary};

pub use client::HttpBackend;
pub use error::ApiResult;
#[cfg(test)]
pub use error::{Operation, RequestError};
pub use types::{ChatResponse, ConfirmResponse};

/// Everything the client needs from the backend.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn send_message(&self, session_id: &str, message: &str) -> ApiResult<ChatResponse>;

    async fn confirm_ticket(
        &self,
        session_id: &str,
        template_id: &str,
        fields: &TemplateFields,
    ) -> ApiResult<ConfirmResponse>;

    /// Returns `Ok(true)` only when the backend accepted the password.
    async fn verify_admin_password(&self, password: &str) -> ApiResult<bool>;

    async fn admin_settings(&self, password: &str) -> ApiResult<AdminSettings>;

    async fn update_admin_settings(
        &self,
        password: &str,
        update: &AdminSettingsUpdate,
    ) -> ApiResult<AdminSettings>;

    async fn list_templates(&self) -> ApiResult<Vec<TemplateSummary>>;
}
