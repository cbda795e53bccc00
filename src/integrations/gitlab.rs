//! GitLab integration.
//!
//! Fetches the current user's merge requests from the GitLab REST API (v4)
//! and extracts Asana cross-references from their descriptions.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use super::{query_string, CodeHost};
use crate::core::{DateRange, ResolvedEnv};

/// Default GitLab API base URL.
pub const GITLAB_API_URL: &str = "https://gitlab.com/api/v4";

/// Asana task links of the form `https://app.asana.com/<domain>/<project>/<task>`.
static ASANA_TASK_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://app\.asana\.com/\d+/\d+/(\d+)").expect("valid Asana URL regex")
});

/// GitLab API client.
#[derive(Debug)]
pub struct GitLabClient {
    /// Personal access token
    token: String,
    /// API base URL
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
    /// Cached `/user`
    current_user: OnceCell<GitLabUser>,
    /// Projects resolved on first use
    resolved_projects: OnceCell<Vec<GitLabProject>>,
}

/// A GitLab user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabUser {
    /// User ID
    pub id: u64,
    /// Username/login
    pub username: String,
}

/// A GitLab project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabProject {
    /// Project ID
    pub id: u64,
    /// Project name
    pub name: String,
    /// Full path, e.g. `group/subgroup/project`
    pub path_with_namespace: String,
}

impl GitLabProject {
    /// Whether this project answers to `name`, either directly or as the
    /// last segment of its path.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name == name || self.path_with_namespace.ends_with(&format!("/{}", name))
    }
}

/// Author of a merge request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestAuthor {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Username/login
    #[serde(default)]
    pub username: String,
}

/// A GitLab merge request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Global ID
    pub id: u64,
    /// Project-scoped ID (`!iid`)
    #[serde(default)]
    pub iid: u64,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Description (markdown)
    #[serde(default)]
    pub description: Option<String>,
    /// State (opened, merged, closed)
    #[serde(default)]
    pub state: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Merge timestamp, absent when not merged
    #[serde(default)]
    pub merged_at: Option<String>,
    /// Author
    #[serde(default)]
    pub author: MergeRequestAuthor,
    /// Link to the merge request
    #[serde(default)]
    pub web_url: String,
    /// Owning project ID
    #[serde(default)]
    pub project_id: u64,
    /// Name of the owning project, filled in by the client
    #[serde(default)]
    pub project_name: String,
}

/// Result type for GitLab operations.
pub type GitLabResult<T> = Result<T, GitLabError>;

/// Error types for GitLab operations.
#[derive(Debug, thiserror::Error)]
pub enum GitLabError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitLab API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Which merge requests to list for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeRequestState {
    Merged,
    Opened,
}

impl GitLabClient {
    /// Create a new GitLab client against `base_url`.
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            current_user: OnceCell::new(),
            resolved_projects: OnceCell::new(),
        }
    }

    /// Create from the resolved environment.
    pub fn from_env(env: &ResolvedEnv) -> Self {
        Self::new(&env.gitlab_token, &env.gitlab_url)
    }

    /// GET an endpoint and decode the JSON body.
    async fn fetch<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> GitLabResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, "GitLab request");

        let response = self.client.get(&url).header("PRIVATE-TOKEN", &self.token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 => GitLabError::Unauthorized,
                404 => GitLabError::NotFound(url),
                429 => GitLabError::RateLimited,
                code => {
                    let message = response
                        .json::<serde_json::Value>()
                        .await
                        .ok()
                        .and_then(|v| {
                            v.get("message").map(|m| {
                                m.as_str().map(String::from).unwrap_or_else(|| m.to_string())
                            })
                        })
                        .unwrap_or_else(|| format!("HTTP {} - {}", code, url));
                    GitLabError::Api { status: code, message }
                }
            });
        }

        Ok(response.json().await?)
    }

    /// Look up one project by name among the user's memberships.
    async fn find_project(&self, name: &str) -> GitLabResult<Option<GitLabProject>> {
        let query = query_string(&[
            ("search", name.to_string()),
            ("membership", "true".to_string()),
            ("per_page", "10".to_string()),
        ]);
        let results: Vec<GitLabProject> = self.fetch(&format!("/projects?{}", query)).await?;
        Ok(results.into_iter().find(|p| p.matches_name(name)))
    }

    /// List the user's merge requests in every resolved project.
    ///
    /// A project whose listing fails is skipped with a warning.
    async fn list_merge_requests(
        &self,
        project_names: &[String],
        range: &DateRange,
        state: MergeRequestState,
    ) -> GitLabResult<Vec<MergeRequest>> {
        let user = self.current_user().await?;
        let projects = self.resolve_projects(project_names).await?;
        let mut results = Vec::new();

        for project in &projects {
            let query = merge_requests_query(&user.username, range, state);
            let endpoint = format!("/projects/{}/merge_requests?{}", project.id, query);

            match self.fetch::<Vec<MergeRequest>>(&endpoint).await {
                Ok(mrs) => {
                    results.extend(mrs.into_iter().map(|mut mr| {
                        mr.project_name = project.name.clone();
                        mr
                    }));
                }
                Err(e) => {
                    tracing::warn!(project = %project.name, error = %e, "Failed to fetch merge requests");
                }
            }
        }

        Ok(results)
    }
}

#[async_trait]
impl CodeHost for GitLabClient {
    async fn current_user(&self) -> GitLabResult<GitLabUser> {
        self.current_user.get_or_try_init(|| self.fetch("/user")).await.cloned()
    }

    async fn resolve_projects(&self, names: &[String]) -> GitLabResult<Vec<GitLabProject>> {
        let projects = self
            .resolved_projects
            .get_or_init(|| async move {
                let mut projects = Vec::new();
                for name in names {
                    match self.find_project(name).await {
                        Ok(Some(project)) => projects.push(project),
                        Ok(None) => tracing::warn!(project = %name, "GitLab project not found"),
                        Err(e) => {
                            tracing::warn!(project = %name, error = %e, "Failed to resolve project");
                        }
                    }
                }
                projects
            })
            .await;

        Ok(projects.clone())
    }

    async fn merged_merge_requests(
        &self,
        project_names: &[String],
        range: &DateRange,
    ) -> GitLabResult<Vec<MergeRequest>> {
        let mrs = self.list_merge_requests(project_names, range, MergeRequestState::Merged).await?;
        Ok(merged_within(mrs, range))
    }

    async fn open_merge_requests(
        &self,
        project_names: &[String],
        range: &DateRange,
    ) -> GitLabResult<Vec<MergeRequest>> {
        self.list_merge_requests(project_names, range, MergeRequestState::Opened).await
    }
}

fn merge_requests_query(username: &str, range: &DateRange, state: MergeRequestState) -> String {
    let mut params = vec![("author_username", username.to_string())];
    match state {
        MergeRequestState::Merged => {
            params.push(("state", "merged".to_string()));
            params.push(("updated_after", range.from.clone()));
            params.push(("updated_before", range.to.clone()));
        }
        MergeRequestState::Opened => {
            params.push(("state", "opened".to_string()));
            params.push(("updated_after", range.from.clone()));
        }
    }
    params.push(("per_page", "100".to_string()));
    query_string(&params)
}

/// Keep merge requests whose merge timestamp lies inside `range`.
///
/// GitLab filters by update time, which is a superset of what was merged
/// in the window.
pub fn merged_within(mrs: Vec<MergeRequest>, range: &DateRange) -> Vec<MergeRequest> {
    mrs.into_iter()
        .filter(|mr| mr.merged_at.as_deref().is_some_and(|at| range.contains(at)))
        .collect()
}

/// Extract the Asana task ID referenced in a merge request description.
///
/// Only the first link is considered. Returns `None` for empty text or when
/// no link is present.
pub fn extract_asana_task_id(description: &str) -> Option<String> {
    if description.is_empty() {
        return None;
    }

    ASANA_TASK_URL
        .captures(description)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
