//! External integrations module.
//!
//! Provides the Asana task tracker and GitLab code host clients, plus the
//! traits the summary engine uses to talk to them. The traits are the seam
//! tests use to substitute in-memory fakes.

pub mod asana;
pub mod gitlab;

pub use asana::{
    AsanaClient, AsanaDependency, AsanaError, AsanaMembership, AsanaRef, AsanaResult,
    AsanaSection, AsanaStory, AsanaTask, AsanaUser, ASANA_API_URL,
};
pub use gitlab::{
    extract_asana_task_id, merged_within, GitLabClient, GitLabError, GitLabProject, GitLabResult,
    GitLabUser, MergeRequest, MergeRequestAuthor, GITLAB_API_URL,
};

use async_trait::async_trait;

use crate::core::DateRange;

/// Read access to the task tracker.
#[async_trait]
pub trait TaskTracker: Send + Sync {
    /// The user the token belongs to.
    async fn current_user(&self) -> AsanaResult<AsanaUser>;

    /// Incomplete tasks assigned to the current user in one project, with
    /// memberships and dependencies populated.
    async fn my_incomplete_tasks_in_project(
        &self,
        workspace_gid: &str,
        project_gid: &str,
    ) -> AsanaResult<Vec<AsanaTask>>;

    /// Tasks assigned to the current user and completed inside `range`.
    async fn completed_tasks(
        &self,
        workspace_gid: &str,
        range: &DateRange,
    ) -> AsanaResult<Vec<AsanaTask>>;

    /// The full, unfiltered audit log of a task.
    async fn task_stories(&self, task_gid: &str) -> AsanaResult<Vec<AsanaStory>>;

    /// A single task by id.
    async fn task(&self, task_gid: &str) -> AsanaResult<AsanaTask>;
}

/// Read access to the code host.
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// The user the token belongs to.
    async fn current_user(&self) -> GitLabResult<GitLabUser>;

    /// Resolve human-readable project names to projects. Names that do not
    /// resolve are skipped.
    async fn resolve_projects(&self, names: &[String]) -> GitLabResult<Vec<GitLabProject>>;

    /// Merge requests by the current user merged inside `range`.
    async fn merged_merge_requests(
        &self,
        project_names: &[String],
        range: &DateRange,
    ) -> GitLabResult<Vec<MergeRequest>>;

    /// Open merge requests by the current user updated since `range.from`.
    async fn open_merge_requests(
        &self,
        project_names: &[String],
        range: &DateRange,
    ) -> GitLabResult<Vec<MergeRequest>>;
}

/// Build a URL query string, percent-encoding every value.
pub(crate) fn query_string(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
