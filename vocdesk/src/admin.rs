//! Password-gated settings panel.
//!
//! Unlocking verifies the password and loads the current settings. Edits go
//! into a draft; saving sends only the fields that differ from what the
//! backend last returned.

use thiserror::Error;

use crate::api::Backend;
use crate::models::{mask_secret, AdminSettings, AdminSettingsUpdate, SettingField};

pub const SAVED_MESSAGE: &str = "설정이 저장되었습니다.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PanelError {
    #[error("비밀번호가 올바르지 않습니다.")]
    InvalidPassword,
    #[error("설정 저장에 실패했습니다.")]
    SaveFailed,
}

pub struct SettingsPanel<'a, B> {
    backend: &'a B,
    password: String,
    settings: AdminSettings,
    draft: AdminSettingsUpdate,
}

impl<'a, B: Backend> SettingsPanel<'a, B> {
    /// Verify the password and load the current settings.
    pub async fn unlock(backend: &'a B, password: impl Into<String>) -> Result<Self, PanelError> {
        let password = password.into();
        match backend.verify_admin_password(&password).await {
            Ok(true) => {}
            Ok(false) | Err(_) => return Err(PanelError::InvalidPassword),
        }
        let settings = backend
            .admin_settings(&password)
            .await
            .map_err(|_| PanelError::InvalidPassword)?;
        Ok(Self {
            backend,
            password,
            settings,
            draft: AdminSettingsUpdate::default(),
        })
    }

    pub const fn settings(&self) -> &AdminSettings {
        &self.settings
    }

    pub const fn draft(&self) -> &AdminSettingsUpdate {
        &self.draft
    }

    /// Value to show for a field: the draft if edited, else the saved value.
    /// Secrets typed into the draft are masked.
    pub fn display_value(&self, field: SettingField) -> String {
        match self.draft.get(field) {
            Some(value) if field.is_secret() => mask_secret(value),
            Some(value) => value.to_string(),
            None => self.settings.get(field).to_string(),
        }
    }

    /// Edit a field. Setting it back to the saved value drops the edit.
    pub fn edit(&mut self, field: SettingField, value: impl Into<String>) {
        let value = value.into();
        if value == self.settings.get(field) {
            self.draft.clear(field);
        } else {
            self.draft.set(field, value);
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.draft.is_empty()
    }

    /// Send the draft. Returns `Ok(false)` when there was nothing to send.
    pub async fn save(&mut self) -> Result<bool, PanelError> {
        if !self.has_changes() {
            return Ok(false);
        }
        let saved = self
            .backend
            .update_admin_settings(&self.password, &self.draft)
            .await
            .map_err(|_| PanelError::SaveFailed)?;
        tracing::info!(fields = ?self.draft.fields(), "admin settings saved");
        self.settings = saved;
        self.draft = AdminSettingsUpdate::default();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::api::{ApiResult, ChatResponse, ConfirmResponse, Operation, RequestError};
    use crate::models::{TemplateFields, TemplateSummary};

    const PASSWORD: &str = "admin";

    /// In-memory settings service that masks secrets like the real one.
    struct FakeSettings {
        stored: Mutex<AdminSettings>,
        updates: Mutex<Vec<AdminSettingsUpdate>>,
        fail_writes: bool,
    }

    impl FakeSettings {
        fn new() -> Self {
            Self {
                stored: Mutex::new(AdminSettings {
                    ai_base_url: "http://localhost:8000/v1".to_string(),
                    ai_api_key: "****abcd".to_string(),
                    ai_model_name: "default-model".to_string(),
                    jira_project_key: "VOC".to_string(),
                    ..AdminSettings::default()
                }),
                updates: Mutex::default(),
                fail_writes: false,
            }
        }

        fn check(password: &str, operation: Operation) -> ApiResult<()> {
            if password == PASSWORD {
                Ok(())
            } else {
                Err(RequestError::new(operation, "server returned 403 Forbidden"))
            }
        }
    }

    #[async_trait]
    impl Backend for FakeSettings {
        async fn send_message(&self, _session_id: &str, _message: &str) -> ApiResult<ChatResponse> {
            Err(RequestError::new(Operation::SendMessage, "unused"))
        }

        async fn confirm_ticket(
            &self,
            _session_id: &str,
            _template_id: &str,
            _fields: &TemplateFields,
        ) -> ApiResult<ConfirmResponse> {
            Err(RequestError::new(Operation::ConfirmTicket, "unused"))
        }

        async fn verify_admin_password(&self, password: &str) -> ApiResult<bool> {
            Self::check(password, Operation::VerifyPassword).map(|()| true)
        }

        async fn admin_settings(&self, password: &str) -> ApiResult<AdminSettings> {
            Self::check(password, Operation::ReadSettings)?;
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn update_admin_settings(
            &self,
            password: &str,
            update: &AdminSettingsUpdate,
        ) -> ApiResult<AdminSettings> {
            Self::check(password, Operation::WriteSettings)?;
            if self.fail_writes {
                return Err(RequestError::new(Operation::WriteSettings, "500"));
            }
            self.updates.lock().unwrap().push(update.clone());
            let mut stored = self.stored.lock().unwrap();
            for field in update.fields() {
                let value = update.get(field).unwrap_or_default();
                let value = if field.is_secret() {
                    mask_secret(value)
                } else {
                    value.to_string()
                };
                match field {
                    SettingField::AiBaseUrl => stored.ai_base_url = value,
                    SettingField::AiApiKey => stored.ai_api_key = value,
                    SettingField::AiModelName => stored.ai_model_name = value,
                    SettingField::JiraBaseUrl => stored.jira_base_url = value,
                    SettingField::JiraUserEmail => stored.jira_user_email = value,
                    SettingField::JiraApiToken => stored.jira_api_token = value,
                    SettingField::JiraProjectKey => stored.jira_project_key = value,
                }
            }
            Ok(stored.clone())
        }

        async fn list_templates(&self) -> ApiResult<Vec<TemplateSummary>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn wrong_password_stays_locked() {
        let backend = FakeSettings::new();
        let err = SettingsPanel::unlock(&backend, "guess").await.err();
        assert_eq!(err, Some(PanelError::InvalidPassword));
        assert_eq!(
            PanelError::InvalidPassword.to_string(),
            "비밀번호가 올바르지 않습니다."
        );
    }

    #[tokio::test]
    async fn unlock_loads_settings() {
        let backend = FakeSettings::new();
        let panel = SettingsPanel::unlock(&backend, PASSWORD).await.unwrap();
        assert_eq!(panel.settings().jira_project_key, "VOC");
        assert!(!panel.has_changes());
    }

    #[tokio::test]
    async fn save_sends_only_changed_fields() {
        let backend = FakeSettings::new();
        let mut panel = SettingsPanel::unlock(&backend, PASSWORD).await.unwrap();

        panel.edit(SettingField::AiModelName, "default-model");
        assert!(!panel.has_changes());

        panel.edit(SettingField::JiraProjectKey, "CS");
        panel.edit(SettingField::JiraApiToken, "token-123456");
        assert_eq!(panel.display_value(SettingField::JiraApiToken), "********3456");
        assert_eq!(panel.display_value(SettingField::AiModelName), "default-model");

        assert!(panel.save().await.unwrap());
        assert!(!panel.has_changes());
        assert_eq!(panel.settings().jira_project_key, "CS");

        let updates = backend.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(
            updates[0].fields(),
            vec![SettingField::JiraApiToken, SettingField::JiraProjectKey]
        );
    }

    #[tokio::test]
    async fn save_without_changes_sends_nothing() {
        let backend = FakeSettings::new();
        let mut panel = SettingsPanel::unlock(&backend, PASSWORD).await.unwrap();
        assert!(!panel.save().await.unwrap());
        assert!(backend.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_save_keeps_draft() {
        let backend = FakeSettings {
            fail_writes: true,
            ..FakeSettings::new()
        };
        let mut panel = SettingsPanel::unlock(&backend, PASSWORD).await.unwrap();
        panel.edit(SettingField::AiModelName, "bigger-model");

        assert_eq!(panel.save().await, Err(PanelError::SaveFailed));
        assert!(panel.has_changes());
        assert_eq!(panel.draft().get(SettingField::AiModelName), Some("bigger-model"));
        assert_eq!(panel.settings().ai_model_name, "default-model");
    }
}
