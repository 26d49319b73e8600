//! HTTP implementation of [`Backend`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::models::{AdminSettings, AdminSettingsUpdate, TemplateFields, TemplateSummary};

use super::error::{ApiResult, Operation, RequestError};
use super::types::{
    ChatRequest, ChatResponse, ConfirmRequest, ConfirmResponse, VerifyRequest, VerifyResponse,
};
use super::Backend;

const ADMIN_PASSWORD_HEADER: &str = "X-Admin-Password";

/// Talks to the backend over HTTP. Holds no conversation state.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: ClientConfig,
    http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { config, http })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Send a request and decode a 2xx JSON body. Everything else is a failure.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let resp = request
            .send()
            .await
            .map_err(|e| failed(operation, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(failed(operation, format!("server returned {status}")));
        }

        resp.json::<T>()
            .await
            .map_err(|e| failed(operation, format!("invalid response body: {e}")))
    }
}

fn failed(operation: Operation, detail: String) -> RequestError {
    tracing::debug!(%operation, %detail, "backend request failed");
    RequestError::new(operation, detail)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send_message(&self, session_id: &str, message: &str) -> ApiResult<ChatResponse> {
        let url = self.config.endpoint("/api/chat");
        tracing::debug!(%session_id, "sending chat message");
        let request = self.http.post(&url).json(&ChatRequest {
            session_id,
            message,
        });
        self.execute(Operation::SendMessage, request).await
    }

    async fn confirm_ticket(
        &self,
        session_id: &str,
        template_id: &str,
        fields: &TemplateFields,
    ) -> ApiResult<ConfirmResponse> {
        let url = self.config.endpoint(&format!(
            "/api/chat/{}/confirm",
            urlencoding::encode(session_id)
        ));
        tracing::debug!(%session_id, %template_id, fields = fields.len(), "confirming ticket");
        let request = self.http.post(&url).json(&ConfirmRequest {
            template_id,
            fields,
        });
        self.execute(Operation::ConfirmTicket, request).await
    }

    async fn verify_admin_password(&self, password: &str) -> ApiResult<bool> {
        let url = self.config.endpoint("/api/admin/verify");
        let request = self.http.post(&url).json(&VerifyRequest { password });
        let resp: VerifyResponse = self.execute(Operation::VerifyPassword, request).await?;
        Ok(resp.ok)
    }

    async fn admin_settings(&self, password: &str) -> ApiResult<AdminSettings> {
        let url = self.config.endpoint("/api/admin/settings");
        let request = self.http.get(&url).header(ADMIN_PASSWORD_HEADER, password);
        self.execute(Operation::ReadSettings, request).await
    }

    async fn update_admin_settings(
        &self,
        password: &str,
        update: &AdminSettingsUpdate,
    ) -> ApiResult<AdminSettings> {
        let url = self.config.endpoint("/api/admin/settings");
        let request = self
            .http
            .put(&url)
            .header(ADMIN_PASSWORD_HEADER, password)
            .json(update);
        self.execute(Operation::WriteSettings, request).await
    }

    async fn list_templates(&self) -> ApiResult<Vec<TemplateSummary>> {
        let url = self.config.endpoint("/api/templates");
        self.execute(Operation::ListTemplates, self.http.get(&url))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    use super::*;
    use crate::models::{MessageKind, SettingField};

    /// Requests seen by the mock backend: (path, body).
    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    const PASSWORD: &str = "s3cret";

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get(ADMIN_PASSWORD_HEADER)
            .and_then(|v| v.to_str().ok())
            == Some(PASSWORD)
    }

    fn settings_json() -> Value {
        json!({
            "ai_base_url": "http://localhost:8000/v1",
            "ai_api_key": "****abcd",
            "ai_model_name": "default-model",
            "jira_base_url": "https://org.atlassian.net",
            "jira_user_email": "ops@example.com",
            "jira_api_token": "****wxyz",
            "jira_project_key": "VOC"
        })
    }

    /// Body written out by hand so the field order on the wire is fixed.
    async fn chat(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
        seen.lock().unwrap().push(("/api/chat".to_string(), body.clone()));
        let reply = format!(
            r#"{{"session_id":{},"message":"Bug Report 템플릿으로 정리했습니다.","type":"template_preview","metadata":{{"template_id":"T1","template_name":"Bug Report","fields":{{"summary":"Login 500 error","priority":"High"}}}}}}"#,
            body["session_id"]
        );
        ([(CONTENT_TYPE, "application/json")], reply)
    }

    async fn confirm(
        State(seen): State<Seen>,
        Path(session_id): Path<String>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        seen.lock().unwrap().push((format!("/api/chat/{session_id}/confirm"), body));
        Json(json!({
            "ticket_key": "VOC-42",
            "ticket_url": "https://org.atlassian.net/browse/VOC-42"
        }))
    }

    async fn verify(Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
        if body["password"] == PASSWORD {
            Ok(Json(json!({"ok": true})))
        } else {
            Err(StatusCode::FORBIDDEN)
        }
    }

    async fn read_settings(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
        if !authorized(&headers) {
            return Err(StatusCode::FORBIDDEN);
        }
        Ok(Json(settings_json()))
    }

    async fn write_settings(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, StatusCode> {
        if !authorized(&headers) {
            return Err(StatusCode::FORBIDDEN);
        }
        seen.lock()
            .unwrap()
            .push(("/api/admin/settings".to_string(), body.clone()));
        let mut merged = settings_json();
        if let (Some(target), Some(changes)) = (merged.as_object_mut(), body.as_object()) {
            for (k, v) in changes {
                target.insert(k.clone(), v.clone());
            }
        }
        Ok(Json(merged))
    }

    async fn templates() -> Json<Value> {
        Json(json!([
            {"id": "T1", "name": "Bug Report", "description": "Defects", "jira_issue_type": "Bug", "keywords": ["error"]},
            {"id": "T2", "name": "Feature Request", "description": "Ideas", "jira_issue_type": "Story"}
        ]))
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn mock_backend() -> (HttpBackend, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/api/chat", post(chat))
            .route("/api/chat/{session_id}/confirm", post(confirm))
            .route("/api/admin/verify", post(verify))
            .route("/api/admin/settings", get(read_settings).put(write_settings))
            .route("/api/templates", get(templates))
            .with_state(seen.clone());
        let base_url = spawn(app).await;
        let backend = HttpBackend::new(ClientConfig {
            base_url,
            timeout: None,
        })
        .unwrap();
        (backend, seen)
    }

    #[tokio::test]
    async fn send_message_posts_session_and_text() {
        let (backend, seen) = mock_backend().await;

        let resp = backend
            .send_message("sess-1", "로그인 페이지에서 500 에러가 발생합니다")
            .await
            .unwrap();

        assert_eq!(resp.kind, MessageKind::TemplatePreview);
        assert_eq!(resp.session_id, "sess-1");
        let meta = resp.metadata.unwrap();
        let fields = meta.fields.unwrap();
        let keys: Vec<_> = fields.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["summary", "priority"]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].1,
            json!({"session_id": "sess-1", "message": "로그인 페이지에서 500 에러가 발생합니다"})
        );
    }

    #[tokio::test]
    async fn confirm_targets_session_path() {
        let (backend, seen) = mock_backend().await;
        let fields: TemplateFields = [("summary", "Login 500 error - urgent")]
            .into_iter()
            .collect();

        let ticket = backend
            .confirm_ticket("sess 1", "T1", &fields)
            .await
            .unwrap();

        assert_eq!(ticket.ticket_key, "VOC-42");
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, "/api/chat/sess 1/confirm");
        assert_eq!(
            seen[0].1,
            json!({"template_id": "T1", "fields": {"summary": "Login 500 error - urgent"}})
        );
    }

    #[tokio::test]
    async fn verify_rejects_wrong_password() {
        let (backend, _) = mock_backend().await;
        assert!(backend.verify_admin_password(PASSWORD).await.unwrap());

        let err = backend.verify_admin_password("wrong").await.unwrap_err();
        assert_eq!(err.operation, Operation::VerifyPassword);
    }

    #[tokio::test]
    async fn settings_require_password_header() {
        let (backend, seen) = mock_backend().await;

        let settings = backend.admin_settings(PASSWORD).await.unwrap();
        assert_eq!(settings.jira_project_key, "VOC");
        assert!(backend.admin_settings("wrong").await.is_err());

        let mut update = AdminSettingsUpdate::default();
        update.set(SettingField::AiModelName, "bigger-model");
        let updated = backend
            .update_admin_settings(PASSWORD, &update)
            .await
            .unwrap();
        assert_eq!(updated.ai_model_name, "bigger-model");
        assert_eq!(updated.jira_project_key, "VOC");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].1, json!({"ai_model_name": "bigger-model"}));
    }

    #[tokio::test]
    async fn list_templates_decodes_summaries() {
        let (backend, _) = mock_backend().await;
        let templates = backend.list_templates().await.unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].keywords, ["error"]);
        assert!(templates[1].keywords.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base_url = spawn(app).await;
        let backend = HttpBackend::new(ClientConfig {
            base_url,
            timeout: None,
        })
        .unwrap();

        let err = backend.send_message("s", "hi").await.unwrap_err();
        assert_eq!(err.operation, Operation::SendMessage);
        assert!(err.detail.contains("500"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_failure() {
        let app = Router::new().route("/api/chat", post(|| async { "not json" }));
        let base_url = spawn(app).await;
        let backend = HttpBackend::new(ClientConfig {
            base_url,
            timeout: None,
        })
        .unwrap();

        assert!(backend.send_message("s", "hi").await.is_err());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_failure() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::new(ClientConfig {
            base_url: format!("http://{addr}"),
            timeout: None,
        })
        .unwrap();
        let err = backend.list_templates().await.unwrap_err();
        assert_eq!(err.operation, Operation::ListTemplates);
    }
}
