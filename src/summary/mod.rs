//! Progress summary engine.
//!
//! Correlates merge requests with the Asana tasks they reference, buckets
//! open tasks by their current section, reconstructs recent section moves,
//! and assembles the result into a [`ReportInput`] for the summarizer.

mod categorize;
mod handler;
mod linking;
mod report;
mod transitions;

pub use categorize::{categorize_tasks, task_section, CategorizedTasks, SectionMapping, TaskBucket};
pub use handler::{collect_progress, handle_progress_summary, SummaryRequest};
pub use linking::{link_merge_request, LinkedMergeRequest};
pub use report::{
    BlockedTask, BlockedWork, CompletedTask, CompletedWork, InProgressTask, InProgressWork,
    LinkedTaskState, MergedMergeRequest, OpenMergeRequest, ReportInput, ReportParts,
};
pub use transitions::{
    fetch_section_transitions, parse_section_move, section_transitions, SectionTransition,
    SECTION_CHANGED,
};
