//! Admin settings for the AI provider and the issue tracker.

use serde::{Deserialize, Serialize};

/// One of the seven configurable settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    AiBaseUrl,
    AiApiKey,
    AiModelName,
    JiraBaseUrl,
    JiraUserEmail,
    JiraApiToken,
    JiraProjectKey,
}

impl SettingField {
    /// Every field, in display order.
    pub const ALL: [Self; 7] = [
        Self::AiBaseUrl,
        Self::AiApiKey,
        Self::AiModelName,
        Self::JiraBaseUrl,
        Self::JiraUserEmail,
        Self::JiraApiToken,
        Self::JiraProjectKey,
    ];

    /// Wire name of the field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AiBaseUrl => "ai_base_url",
            Self::AiApiKey => "ai_api_key",
            Self::AiModelName => "ai_model_name",
            Self::JiraBaseUrl => "jira_base_url",
            Self::JiraUserEmail => "jira_user_email",
            Self::JiraApiToken => "jira_api_token",
            Self::JiraProjectKey => "jira_project_key",
        }
    }

    /// Human label used by the settings panel.
    pub const fn label(self) -> &'static str {
        match self {
            Self::AiBaseUrl => "AI Base URL",
            Self::AiApiKey => "AI API Key",
            Self::AiModelName => "AI Model Name",
            Self::JiraBaseUrl => "Jira Base URL",
            Self::JiraUserEmail => "Jira User Email",
            Self::JiraApiToken => "Jira API Token",
            Self::JiraProjectKey => "Jira Project Key",
        }
    }

    /// Whether the value is a credential that should not be echoed.
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::AiApiKey | Self::JiraApiToken)
    }

    /// Parse from either the wire name (`ai_base_url`) or the CLI spelling
    /// (`ai-base-url`).
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().replace('-', "_").to_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
    }
}

impl std::fmt::Display for SettingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full settings record as returned by the backend. Secrets arrive masked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    pub ai_base_url: String,
    pub ai_api_key: String,
    pub ai_model_name: String,
    pub jira_base_url: String,
    pub jira_user_email: String,
    pub jira_api_token: String,
    pub jira_project_key: String,
}

impl AdminSettings {
    pub fn get(&self, field: SettingField) -> &str {
        match field {
            SettingField::AiBaseUrl => &self.ai_base_url,
            SettingField::AiApiKey => &self.ai_api_key,
            SettingField::AiModelName => &self.ai_model_name,
            SettingField::JiraBaseUrl => &self.jira_base_url,
            SettingField::JiraUserEmail => &self.jira_user_email,
            SettingField::JiraApiToken => &self.jira_api_token,
            SettingField::JiraProjectKey => &self.jira_project_key,
        }
    }
}

/// Partial settings record; only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_project_key: Option<String>,
}

impl AdminSettingsUpdate {
    fn slot(&mut self, field: SettingField) -> &mut Option<String> {
        match field {
            SettingField::AiBaseUrl => &mut self.ai_base_url,
            SettingField::AiApiKey => &mut self.ai_api_key,
            SettingField::AiModelName => &mut self.ai_model_name,
            SettingField::JiraBaseUrl => &mut self.jira_base_url,
            SettingField::JiraUserEmail => &mut self.jira_user_email,
            SettingField::JiraApiToken => &mut self.jira_api_token,
            SettingField::JiraProjectKey => &mut self.jira_project_key,
        }
    }

    pub fn get(&self, field: SettingField) -> Option<&str> {
        let value = match field {
            SettingField::AiBaseUrl => &self.ai_base_url,
            SettingField::AiApiKey => &self.ai_api_key,
            SettingField::AiModelName => &self.ai_model_name,
            SettingField::JiraBaseUrl => &self.jira_base_url,
            SettingField::JiraUserEmail => &self.jira_user_email,
            SettingField::JiraApiToken => &self.jira_api_token,
            SettingField::JiraProjectKey => &self.jira_project_key,
        };
        value.as_deref()
    }

    pub fn set(&mut self, field: SettingField, value: impl Into<String>) {
        *self.slot(field) = Some(value.into());
    }

    pub fn clear(&mut self, field: SettingField) {
        *self.slot(field) = None;
    }

    /// Fields present in this update, in display order.
    pub fn fields(&self) -> Vec<SettingField> {
        SettingField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

/// Mask a secret for display, keeping only its last four characters.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}
