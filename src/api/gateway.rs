use chrono::{NaiveDate, NaiveDateTime};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::wire::{self, RawTask};
use super::ApiError;
use crate::core::task::{Priority, Task, TaskStatus};

/// The signed-in user as the backend reports it at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Successful login response: a bearer token plus the user object.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginSession {
    pub access_token: String,
    pub user: User,
}

/// Fields for creating a task. The server assigns the identity and
/// defaults status to Pending when unspecified.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "status_label")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "priority_label")]
    pub priority: Option<Priority>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            status: None,
            priority: None,
        }
    }
}

/// Partial update: only supplied fields are serialized, so the server
/// leaves everything else untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "status_label")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "priority_label")]
    pub priority: Option<Priority>,
}

fn status_label<S>(status: &Option<TaskStatus>, ser: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    // skip_serializing_if guarantees Some here
    ser.serialize_str(status.as_ref().map(|s| s.as_label()).unwrap_or_default())
}

fn priority_label<S>(priority: &Option<Priority>, ser: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    ser.serialize_str(priority.as_ref().map(|p| p.as_label()).unwrap_or_default())
}

/// Authenticated REST client for the PlanIt backend.
///
/// Every task operation takes the bearer token as an explicit
/// parameter; the gateway itself holds no session state, which keeps it
/// testable without a UI tree. Non-2xx responses are translated into
/// the `ApiError` taxonomy.
pub struct TaskGateway {
    base_url: String,
    http: Client,
}

impl TaskGateway {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        let resp = self
            .http
            .post(format!("{}/signup", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        check(resp).await.map(|_| ())
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSession, ApiError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        let resp = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let text = check(resp).await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::Server { status: 200, message: format!("Malformed login response: {}", e) })
    }

    pub async fn list_tasks(&self, token: &str) -> Result<Vec<Task>, ApiError> {
        let resp = self
            .http
            .get(format!("{}/tasks", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        let text = check(resp).await?;
        let raw: Vec<RawTask> = serde_json::from_str(&text)
            .map_err(|e| ApiError::Server { status: 200, message: format!("Malformed task list: {}", e) })?;
        Ok(raw.into_iter().map(RawTask::into_task).collect())
    }

    pub async fn create_task(&self, token: &str, draft: &TaskDraft) -> Result<Task, ApiError> {
        let resp = self
            .http
            .post(format!("{}/tasks", self.base_url))
            .bearer_auth(token)
            .json(draft)
            .send()
            .await
            .map_err(transport)?;

        self.task_response(resp).await
    }

    /// Partial update of a single task. 404 → `NotFound`: the task was
    /// deleted out from under us.
    pub async fn update_task(
        &self,
        token: &str,
        identity: &str,
        patch: &TaskPatch,
    ) -> Result<Task, ApiError> {
        let resp = self
            .http
            .put(format!("{}/tasks/{}", self.base_url, identity))
            .bearer_auth(token)
            .json(patch)
            .send()
            .await
            .map_err(transport)?;

        self.task_response(resp).await
    }

    /// The single-click complete affordance. A distinct endpoint rather
    /// than a general update, so it bypasses the full-update validation
    /// the backend applies to PUT /tasks/{id}.
    pub async fn complete_task(&self, token: &str, identity: &str) -> Result<Task, ApiError> {
        let resp = self
            .http
            .put(format!("{}/tasks/{}/complete", self.base_url, identity))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        self.task_response(resp).await
    }

    pub async fn delete_task(&self, token: &str, identity: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(format!("{}/tasks/{}", self.base_url, identity))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        check(resp).await.map(|_| ())
    }

    pub async fn set_reminder(
        &self,
        token: &str,
        identity: &str,
        reminder: NaiveDateTime,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            // The backend expects minute precision exactly
            "reminder": reminder.format("%Y-%m-%d %H:%M").to_string(),
        });
        let resp = self
            .http
            .put(format!("{}/tasks/{}/set_reminder", self.base_url, identity))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        check(resp).await.map(|_| ())
    }

    pub async fn share_task(
        &self,
        token: &str,
        identity: &str,
        recipient: &str,
    ) -> Result<(), ApiError> {
        if !wire::is_valid_recipient(recipient) {
            return Err(ApiError::Validation(format!(
                "Not a valid email address: {}",
                recipient
            )));
        }
        let body = serde_json::json!({ "shared_user_id": recipient });
        let resp = self
            .http
            .put(format!("{}/tasks/{}/share", self.base_url, identity))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        check(resp).await.map(|_| ())
    }

    async fn task_response(&self, resp: Response) -> Result<Task, ApiError> {
        let text = check(resp).await?;
        let raw: RawTask = serde_json::from_str(&text)
            .map_err(|e| ApiError::Server { status: 200, message: format!("Malformed task: {}", e) })?;
        Ok(raw.into_task())
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

/// Read the response body and translate non-2xx statuses into the
/// error taxonomy. Returns the body text on success.
async fn check(resp: Response) -> Result<String, ApiError> {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    if status.is_success() {
        return Ok(text);
    }
    Err(classify(status, &text))
}

fn classify(status: StatusCode, body: &str) -> ApiError {
    let message = wire::error_message(body)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        s if s.is_client_error() => ApiError::Validation(message),
        s => ApiError::Server { status: s.as_u16(), message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, r#"{"msg": "Token has expired"}"#),
            ApiError::Auth(m) if m == "Token has expired"
        ));
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, r#"{"message": "Task not found or unauthorized"}"#),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            classify(
                StatusCode::UNPROCESSABLE_ENTITY,
                r#"{"error": "Invalid date format. Expected YYYY-MM-DD."}"#
            ),
            ApiError::Validation(m) if m.starts_with("Invalid date format")
        ));
        assert!(matches!(
            classify(StatusCode::CONFLICT, r#"{"error": "Username already exists"}"#),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, "<html></html>"),
            ApiError::Server { status: 500, .. }
        ));
    }

    #[test]
    fn patch_serializes_only_supplied_fields() {
        let patch = TaskPatch {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"status": "In Progress"}));
    }

    #[test]
    fn draft_serializes_wire_labels() {
        let mut draft = TaskDraft::new("Book flights");
        draft.due_date = NaiveDate::from_ymd_opt(2026, 5, 2);
        draft.priority = Some(Priority::High);
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Book flights",
                "due_date": "2026-05-02",
                "priority": "High",
            })
        );
    }
}
