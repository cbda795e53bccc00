//! The report handed to the summarizer.
//!
//! Field names serialize in camelCase because the JSON is pasted verbatim
//! into the model prompt, and the prompt's instructions refer to them
//! (`sectionTransitions`, `linkedAsanaTask`).

use serde::{Deserialize, Serialize};

use super::categorize::task_section;
use super::linking::LinkedMergeRequest;
use super::transitions::SectionTransition;
use crate::core::DateRange;
use crate::integrations::{AsanaTask, MergeRequest};

/// Everything the summarizer gets to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    pub date_range: DateRange,
    pub completed: CompletedWork,
    pub in_progress: InProgressWork,
    pub blocked: BlockedWork,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedWork {
    pub asana_tasks: Vec<CompletedTask>,
    #[serde(rename = "mergedMRs")]
    pub merged_mrs: Vec<MergedMergeRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InProgressWork {
    pub asana_tasks: Vec<InProgressTask>,
    #[serde(rename = "openMRs")]
    pub open_mrs: Vec<OpenMergeRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedWork {
    pub asana_tasks: Vec<BlockedTask>,
}

/// A task completed inside the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    pub name: String,
    pub description: String,
    pub completed_at: String,
    /// Only present when at least one transition was recorded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section_transitions: Vec<SectionTransition>,
}

/// A merge request merged inside the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedMergeRequest {
    pub title: String,
    pub description: String,
    pub project: String,
    pub url: String,
    pub merged_at: String,
    /// Only present when the description referenced a task that could be
    /// fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_asana_task: Option<LinkedTaskState>,
}

/// Where a linked task stands now, which may differ from when the code
/// merged (moved to QA, reassigned).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedTaskState {
    pub name: String,
    pub current_section: String,
    pub current_assignee: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InProgressTask {
    pub name: String,
    pub description: String,
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenMergeRequest {
    pub title: String,
    pub description: String,
    pub project: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedTask {
    pub name: String,
    pub description: String,
    pub has_dependencies: bool,
}

/// Already-fetched material for one report.
#[derive(Debug, Clone)]
pub struct ReportParts {
    pub date_range: DateRange,
    /// Project used to pick a task's current section
    pub project_gid: String,
    pub completed_tasks: Vec<(AsanaTask, Vec<SectionTransition>)>,
    pub merged_mrs: Vec<LinkedMergeRequest>,
    pub in_progress_tasks: Vec<AsanaTask>,
    pub blocked_tasks: Vec<AsanaTask>,
    pub open_mrs: Vec<MergeRequest>,
}

impl ReportInput {
    /// Assemble the report. No I/O; input order is kept in every bucket.
    pub fn assemble(parts: ReportParts) -> Self {
        let project_gid = parts.project_gid.as_str();
        let section_of = |task: &AsanaTask| task_section(task, project_gid).unwrap_or_default().to_string();

        let completed = CompletedWork {
            asana_tasks: parts
                .completed_tasks
                .into_iter()
                .map(|(task, transitions)| CompletedTask {
                    name: task.name,
                    description: task.notes.unwrap_or_default(),
                    completed_at: task.completed_at.unwrap_or_default(),
                    section_transitions: transitions,
                })
                .collect(),
            merged_mrs: parts
                .merged_mrs
                .into_iter()
                .map(|LinkedMergeRequest { mr, linked_task }| MergedMergeRequest {
                    linked_asana_task: linked_task.map(|task| LinkedTaskState {
                        current_section: section_of(&task),
                        current_assignee: task.assignee.map(|a| a.name).unwrap_or_default(),
                        name: task.name,
                    }),
                    title: mr.title,
                    description: mr.description.unwrap_or_default(),
                    project: mr.project_name,
                    url: mr.web_url,
                    merged_at: mr.merged_at.unwrap_or_default(),
                })
                .collect(),
        };

        let in_progress = InProgressWork {
            asana_tasks: parts
                .in_progress_tasks
                .into_iter()
                .map(|task| InProgressTask {
                    section: section_of(&task),
                    name: task.name,
                    description: task.notes.unwrap_or_default(),
                })
                .collect(),
            open_mrs: parts
                .open_mrs
                .into_iter()
                .map(|mr| OpenMergeRequest {
                    title: mr.title,
                    description: mr.description.unwrap_or_default(),
                    project: mr.project_name,
                    url: mr.web_url,
                })
                .collect(),
        };

        let blocked = BlockedWork {
            asana_tasks: parts
                .blocked_tasks
                .into_iter()
                .map(|task| BlockedTask {
                    has_dependencies: task.dependencies.as_ref().is_some_and(|d| !d.is_empty()),
                    name: task.name,
                    description: task.notes.unwrap_or_default(),
                })
                .collect(),
        };

        Self { date_range: parts.date_range, completed, in_progress, blocked }
    }

    /// Whether there is nothing at all to report.
    pub fn is_empty(&self) -> bool {
        self.completed.asana_tasks.is_empty()
            && self.completed.merged_mrs.is_empty()
            && self.in_progress.asana_tasks.is_empty()
            && self.in_progress.open_mrs.is_empty()
            && self.blocked.asana_tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::{AsanaDependency, AsanaMembership, AsanaRef};

    fn parts() -> ReportParts {
        ReportParts {
            date_range: DateRange::new("2026-02-01", "2026-02-07"),
            project_gid: "p".to_string(),
            completed_tasks: Vec::new(),
            merged_mrs: Vec::new(),
            in_progress_tasks: Vec::new(),
            blocked_tasks: Vec::new(),
            open_mrs: Vec::new(),
        }
    }

    fn merged(title: &str) -> MergeRequest {
        MergeRequest {
            id: 1,
            title: title.to_string(),
            description: Some("desc".to_string()),
            merged_at: Some("2026-02-03T10:00:00.000Z".to_string()),
            web_url: "https://gitlab.example/mr/1".to_string(),
            project_name: "web".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_completed_task_omits_empty_transitions() {
        let mut input = parts();
        input.completed_tasks.push((
            AsanaTask { gid: "1".to_string(), name: "Done".to_string(), ..Default::default() },
            Vec::new(),
        ));

        let report = ReportInput::assemble(input);
        let json = serde_json::to_value(&report).unwrap();
        let task = &json["completed"]["asanaTasks"][0];

        assert_eq!(task["name"], "Done");
        assert_eq!(task["description"], "");
        assert_eq!(task["completedAt"], "");
        assert!(task.get("sectionTransitions").is_none());
    }

    #[test]
    fn test_linked_task_captures_current_state() {
        let task = AsanaTask {
            gid: "9".to_string(),
            name: "Checkout".to_string(),
            assignee: Some(AsanaRef::new("u2", "Ana")),
            memberships: vec![
                AsanaMembership::new(AsanaRef::new("x", "X"), AsanaRef::new("s1", "Backlog")),
                AsanaMembership::new(AsanaRef::new("p", "P"), AsanaRef::new("s2", "QA")),
            ],
            ..Default::default()
        };

        let mut input = parts();
        input.merged_mrs.push(LinkedMergeRequest { mr: merged("Linked"), linked_task: Some(task) });
        input.merged_mrs.push(LinkedMergeRequest { mr: merged("Alone"), linked_task: None });

        let report = ReportInput::assemble(input);
        let linked = report.completed.merged_mrs[0].linked_asana_task.as_ref().unwrap();
        assert_eq!(linked.current_section, "QA");
        assert_eq!(linked.current_assignee, "Ana");

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["completed"]["mergedMRs"][1].get("linkedAsanaTask").is_none());
        assert_eq!(json["completed"]["mergedMRs"][0]["linkedAsanaTask"]["currentSection"], "QA");
    }

    #[test]
    fn test_unassigned_linked_task_has_empty_assignee() {
        let task = AsanaTask { gid: "9".to_string(), name: "Orphan".to_string(), ..Default::default() };
        let mut input = parts();
        input.merged_mrs.push(LinkedMergeRequest { mr: merged("MR"), linked_task: Some(task) });

        let report = ReportInput::assemble(input);
        let linked = report.completed.merged_mrs[0].linked_asana_task.as_ref().unwrap();
        assert_eq!(linked.current_assignee, "");
        assert_eq!(linked.current_section, "");
    }

    #[test]
    fn test_blocked_dependency_flag() {
        let mut input = parts();
        input.blocked_tasks.push(AsanaTask {
            gid: "1".to_string(),
            dependencies: Some(vec![AsanaDependency { gid: "2".to_string() }]),
            ..Default::default()
        });
        input.blocked_tasks.push(AsanaTask {
            gid: "3".to_string(),
            dependencies: Some(Vec::new()),
            ..Default::default()
        });
        input.blocked_tasks.push(AsanaTask { gid: "4".to_string(), ..Default::default() });

        let report = ReportInput::assemble(input);
        let flags: Vec<bool> = report.blocked.asana_tasks.iter().map(|t| t.has_dependencies).collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[test]
    fn test_serialized_keys() {
        let report = ReportInput::assemble(parts());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["dateRange"]["from"], "2026-02-01");
        assert!(json["completed"]["mergedMRs"].is_array());
        assert!(json["inProgress"]["openMRs"].is_array());
        assert!(json["blocked"]["asanaTasks"].is_array());
        assert!(report.is_empty());
    }
}
