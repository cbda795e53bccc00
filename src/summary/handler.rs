//! Progress summary pipeline.
//!
//! 1. Four top-level fetches run concurrently; any failure aborts.
//! 2. Open tasks are bucketed by section.
//! 3. Completed tasks get their section transitions and merged merge
//!    requests get their linked task, both fanned out concurrently with
//!    every item isolated from the others.
//! 4. The results are assembled into a [`ReportInput`].

use anyhow::Context;
use futures::future::join_all;

use super::categorize::{categorize_tasks, SectionMapping};
use super::linking::link_merge_request;
use super::report::{ReportInput, ReportParts};
use super::transitions::{fetch_section_transitions, SectionTransition};
use crate::ai::Summarizer;
use crate::core::DateRange;
use crate::integrations::{AsanaTask, CodeHost, TaskTracker};

/// What to summarize.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    /// Reporting window
    pub date_range: DateRange,
    /// GitLab project names to search
    pub gitlab_projects: Vec<String>,
    /// Asana workspace GID
    pub workspace_gid: String,
    /// Asana project GID whose sections drive categorization
    pub project_gid: String,
    /// Section keyword lists
    pub section_mapping: SectionMapping,
}

/// Fetch, correlate and categorize everything for one report.
pub async fn collect_progress(
    code_host: &dyn CodeHost,
    tracker: &dyn TaskTracker,
    request: &SummaryRequest,
) -> anyhow::Result<ReportInput> {
    tracing::info!("Fetching data from GitLab and Asana...");

    let (merged_mrs, open_mrs, completed_tasks, incomplete_tasks) = tokio::try_join!(
        async {
            code_host
                .merged_merge_requests(&request.gitlab_projects, &request.date_range)
                .await
                .context("Failed to fetch merged merge requests")
        },
        async {
            code_host
                .open_merge_requests(&request.gitlab_projects, &request.date_range)
                .await
                .context("Failed to fetch open merge requests")
        },
        async {
            tracker
                .completed_tasks(&request.workspace_gid, &request.date_range)
                .await
                .context("Failed to fetch completed Asana tasks")
        },
        async {
            tracker
                .my_incomplete_tasks_in_project(&request.workspace_gid, &request.project_gid)
                .await
                .context("Failed to fetch incomplete Asana tasks")
        },
    )?;

    tracing::info!(
        merged = merged_mrs.len(),
        open = open_mrs.len(),
        completed = completed_tasks.len(),
        incomplete = incomplete_tasks.len(),
        "Fetched work items"
    );

    let categorized =
        categorize_tasks(incomplete_tasks, &request.project_gid, &request.section_mapping);

    tracing::info!("Fetching section transitions and linked tasks...");

    let transitions = join_all(
        completed_tasks.into_iter().map(|task| with_transitions(tracker, task, &request.date_range)),
    );
    let linked = join_all(merged_mrs.into_iter().map(|mr| link_merge_request(tracker, mr)));
    let (completed_tasks, merged_mrs) = tokio::join!(transitions, linked);

    Ok(ReportInput::assemble(ReportParts {
        date_range: request.date_range.clone(),
        project_gid: request.project_gid.clone(),
        completed_tasks,
        merged_mrs,
        in_progress_tasks: categorized.in_progress,
        blocked_tasks: categorized.blocked,
        open_mrs,
    }))
}

/// Collect the report and have `summarizer` turn it into prose.
pub async fn handle_progress_summary(
    code_host: &dyn CodeHost,
    tracker: &dyn TaskTracker,
    summarizer: &dyn Summarizer,
    request: &SummaryRequest,
) -> anyhow::Result<String> {
    let report = collect_progress(code_host, tracker, request).await?;

    tracing::info!(provider = summarizer.name(), "Generating summary with AI...");
    summarizer.summarize(&report).await
}

/// Pair a completed task with its transitions; a failed fetch yields none.
async fn with_transitions(
    tracker: &dyn TaskTracker,
    task: AsanaTask,
    range: &DateRange,
) -> (AsanaTask, Vec<SectionTransition>) {
    match fetch_section_transitions(tracker, &task.gid, range).await {
        Ok(transitions) => (task, transitions),
        Err(e) => {
            tracing::warn!(task = %task.name, error = %e, "Failed to fetch section transitions");
            (task, Vec::new())
        }
    }
}
