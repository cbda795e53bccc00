//! Asana task tracker integration.
//!
//! Talks to the Asana REST API (v1.0). Every request asks for an explicit
//! `opt_fields` list so responses stay small, and every response is
//! unwrapped from Asana's `{"data": ...}` envelope.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use super::{query_string, TaskTracker};
use crate::core::{DateRange, ResolvedEnv};

/// Default Asana API base URL.
pub const ASANA_API_URL: &str = "https://app.asana.com/api/1.0";

/// Fields requested for tasks that are going to be categorized.
const INCOMPLETE_TASK_FIELDS: &[&str] = &[
    "name",
    "notes",
    "assignee",
    "assignee.name",
    "memberships.section.name",
    "memberships.project.name",
    "dependencies",
];

/// Fields requested for completed tasks.
const COMPLETED_TASK_FIELDS: &[&str] =
    &["name", "notes", "completed_at", "memberships.section.name", "memberships.project.name"];

/// Fields requested when a task is looked up from a merge request.
const LINKED_TASK_FIELDS: &[&str] = &[
    "name",
    "notes",
    "assignee",
    "assignee.name",
    "memberships.section.name",
    "memberships.project.name",
    "completed",
];

/// Fields requested for stories.
const STORY_FIELDS: &[&str] = &["created_at", "resource_subtype", "text"];

/// Asana API client.
#[derive(Debug)]
pub struct AsanaClient {
    /// Personal access token
    token: String,
    /// API base URL
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
    /// Cached `/users/me`
    current_user: OnceCell<AsanaUser>,
}

/// An Asana user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsanaUser {
    /// User GID
    pub gid: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
}

/// A compact reference to another Asana object (project, section, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsanaRef {
    /// Object GID
    pub gid: String,
    /// Object name, when requested
    #[serde(default)]
    pub name: String,
}

impl AsanaRef {
    /// Create a reference.
    pub fn new(gid: impl Into<String>, name: impl Into<String>) -> Self {
        Self { gid: gid.into(), name: name.into() }
    }
}

/// A project section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsanaSection {
    /// Section GID
    pub gid: String,
    /// Section name
    pub name: String,
}

/// A task's placement in one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsanaMembership {
    /// The project
    #[serde(default)]
    pub project: Option<AsanaRef>,
    /// The section (workflow stage) inside that project
    #[serde(default)]
    pub section: Option<AsanaRef>,
}

impl AsanaMembership {
    /// Create a membership of `project` sitting in `section`.
    pub fn new(project: AsanaRef, section: AsanaRef) -> Self {
        Self { project: Some(project), section: Some(section) }
    }
}

/// A dependency reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsanaDependency {
    /// GID of the task depended on
    pub gid: String,
}

/// An Asana task.
///
/// Fields not requested through `opt_fields` come back absent and take
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsanaTask {
    /// Task GID
    pub gid: String,
    /// Task name
    #[serde(default)]
    pub name: String,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Completion flag
    #[serde(default)]
    pub completed: bool,
    /// Completion timestamp
    #[serde(default)]
    pub completed_at: Option<String>,
    /// Assignee
    #[serde(default)]
    pub assignee: Option<AsanaRef>,
    /// Project memberships, in API order
    #[serde(default)]
    pub memberships: Vec<AsanaMembership>,
    /// Link to the task
    #[serde(default)]
    pub permalink_url: Option<String>,
    /// Tasks this one depends on
    #[serde(default)]
    pub dependencies: Option<Vec<AsanaDependency>>,
}

/// An entry of a task's audit log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsanaStory {
    /// Story GID
    #[serde(default)]
    pub gid: String,
    /// Creation timestamp (ISO-8601)
    #[serde(default)]
    pub created_at: String,
    /// Story subtype, e.g. `section_changed`
    #[serde(default)]
    pub resource_subtype: String,
    /// Human-readable story text
    #[serde(default)]
    pub text: String,
}

/// Asana wraps every payload in `data`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Result type for Asana operations.
pub type AsanaResult<T> = Result<T, AsanaError>;

/// Error types for Asana operations.
#[derive(Debug, thiserror::Error)]
pub enum AsanaError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Asana API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AsanaClient {
    /// Create a new Asana client.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: ASANA_API_URL.to_string(),
            client: reqwest::Client::new(),
            current_user: OnceCell::new(),
        }
    }

    /// Create from the resolved environment.
    pub fn from_env(env: &ResolvedEnv) -> Self {
        Self::new(&env.asana_token)
    }

    /// Use a different API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// GET an endpoint and unwrap the `data` envelope.
    async fn fetch<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> AsanaResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, "Asana request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 => AsanaError::Unauthorized,
                404 => AsanaError::NotFound(endpoint.to_string()),
                429 => AsanaError::RateLimited,
                code => {
                    let body = response.text().await.unwrap_or_default();
                    AsanaError::Api { status: code, message: format!("{} - {}", endpoint, body) }
                }
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    /// List the sections of a project.
    pub async fn project_sections(&self, project_gid: &str) -> AsanaResult<Vec<AsanaSection>> {
        require("project id", project_gid)?;
        self.fetch(&format!("/projects/{}/sections", project_gid)).await
    }
}

#[async_trait]
impl TaskTracker for AsanaClient {
    async fn current_user(&self) -> AsanaResult<AsanaUser> {
        self.current_user.get_or_try_init(|| self.fetch("/users/me")).await.cloned()
    }

    async fn my_incomplete_tasks_in_project(
        &self,
        workspace_gid: &str,
        project_gid: &str,
    ) -> AsanaResult<Vec<AsanaTask>> {
        require("workspace id", workspace_gid)?;
        require("project id", project_gid)?;

        let user = self.current_user().await?;
        let query = incomplete_tasks_query(&user.gid, project_gid);
        self.fetch(&format!("/workspaces/{}/tasks/search?{}", workspace_gid, query)).await
    }

    async fn completed_tasks(
        &self,
        workspace_gid: &str,
        range: &DateRange,
    ) -> AsanaResult<Vec<AsanaTask>> {
        require("workspace id", workspace_gid)?;

        let user = self.current_user().await?;
        let query = completed_tasks_query(&user.gid, range);
        self.fetch(&format!("/workspaces/{}/tasks/search?{}", workspace_gid, query)).await
    }

    async fn task_stories(&self, task_gid: &str) -> AsanaResult<Vec<AsanaStory>> {
        let query = query_string(&[("opt_fields", STORY_FIELDS.join(","))]);
        self.fetch(&format!("/tasks/{}/stories?{}", task_gid, query)).await
    }

    async fn task(&self, task_gid: &str) -> AsanaResult<AsanaTask> {
        let query = query_string(&[("opt_fields", LINKED_TASK_FIELDS.join(","))]);
        self.fetch(&format!("/tasks/{}?{}", task_gid, query)).await
    }
}

fn require(what: &str, value: &str) -> AsanaResult<()> {
    if value.trim().is_empty() {
        return Err(AsanaError::InvalidInput(format!("{} is required", what)));
    }
    Ok(())
}

fn incomplete_tasks_query(user_gid: &str, project_gid: &str) -> String {
    query_string(&[
        ("assignee.any", user_gid.to_string()),
        ("projects.any", project_gid.to_string()),
        ("completed", "false".to_string()),
        ("opt_fields", INCOMPLETE_TASK_FIELDS.join(",")),
    ])
}

fn completed_tasks_query(user_gid: &str, range: &DateRange) -> String {
    query_string(&[
        ("assignee.any", user_gid.to_string()),
        ("completed", "true".to_string()),
        ("completed_on.after", range.from.clone()),
        ("completed_on.before", range.to.clone()),
        ("opt_fields", COMPLETED_TASK_FIELDS.join(",")),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_query_requests_sparse_fields() {
        let query = incomplete_tasks_query("42", "1204646899903680");
        assert!(query.starts_with("assignee.any=42&projects.any=1204646899903680&completed=false"));
        assert!(query.contains("memberships.section.name"));
        assert!(query.contains("dependencies"));
    }

    #[test]
    fn test_completed_query_uses_window() {
        let query = completed_tasks_query("42", &DateRange::new("2026-02-01", "2026-02-07"));
        assert!(query.contains("completed=true"));
        assert!(query.contains("completed_on.after=2026-02-01"));
        assert!(query.contains("completed_on.before=2026-02-07"));
        assert!(query.contains("completed_at"));
    }

    #[test]
    fn test_sparse_task_deserialization() {
        let json = r#"{
            "data": {
                "gid": "1001",
                "name": "Checkout flow",
                "memberships": [
                    { "project": { "gid": "p1", "name": "Web" }, "section": { "gid": "s1", "name": "QA" } }
                ]
            }
        }"#;

        let envelope: Envelope<AsanaTask> = serde_json::from_str(json).unwrap();
        let task = envelope.data;
        assert_eq!(task.name, "Checkout flow");
        assert!(task.notes.is_none());
        assert!(task.dependencies.is_none());
        assert!(!task.completed);
        assert_eq!(task.memberships.len(), 1);
        assert_eq!(task.memberships[0].section.as_ref().unwrap().name, "QA");
    }

    #[test]
    fn test_story_deserialization() {
        let json = r#"{"data": [{
            "gid": "7",
            "created_at": "2026-02-03T10:15:00.000Z",
            "resource_subtype": "section_changed",
            "text": "moved this task from Backlog to In Review"
        }]}"#;

        let envelope: Envelope<Vec<AsanaStory>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].resource_subtype, "section_changed");
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(matches!(require("workspace id", "  "), Err(AsanaError::InvalidInput(_))));
        assert!(require("workspace id", "123").is_ok());
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let client = AsanaClient::new("token").with_base_url("http://localhost:9000/api/");
        assert_eq!(client.base_url, "http://localhost:9000/api");
    }
}
