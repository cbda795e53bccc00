//! Linking merged merge requests back to the Asana tasks they implement.

use crate::integrations::{extract_asana_task_id, AsanaTask, MergeRequest, TaskTracker};

/// A merge request paired with the task its description points to, if any.
#[derive(Debug, Clone)]
pub struct LinkedMergeRequest {
    /// The merge request
    pub mr: MergeRequest,
    /// The referenced task as it looks now
    pub linked_task: Option<AsanaTask>,
}

/// Resolve the task referenced by a merge request.
///
/// A missing reference or a failed lookup both yield an unlinked merge
/// request; neither is an error.
pub async fn link_merge_request(tracker: &dyn TaskTracker, mr: MergeRequest) -> LinkedMergeRequest {
    let Some(task_gid) = mr.description.as_deref().and_then(extract_asana_task_id) else {
        return LinkedMergeRequest { mr, linked_task: None };
    };

    match tracker.task(&task_gid).await {
        Ok(task) => LinkedMergeRequest { mr, linked_task: Some(task) },
        Err(e) => {
            tracing::warn!(mr = %mr.title, task = %task_gid, error = %e, "Failed to fetch linked Asana task");
            LinkedMergeRequest { mr, linked_task: None }
        }
    }
}
