//! Data models for vocdesk entities.

mod message;
mod settings;
mod template;

pub use message::{Message, MessageKind, MessageMetadata, MessageRole};
pub use settings::{mask_secret, AdminSettings, AdminSettingsUpdate, SettingField};
pub use template::{PendingTemplate, TemplateFields, TemplateSummary};
