//! Section-based categorization of open tasks.

use serde::{Deserialize, Serialize};

use crate::integrations::AsanaTask;

/// Keyword lists that map a section name to a bucket.
///
/// Each list is matched case-insensitively as a substring of the section
/// name. A list given in configuration replaces the default list for that
/// key; the two keys are independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionMapping {
    /// Markers for work that is actively moving
    pub in_progress: Vec<String>,
    /// Markers for work that is stuck
    pub blocked: Vec<String>,
}

impl Default for SectionMapping {
    fn default() -> Self {
        Self {
            in_progress: vec![
                "EN DESARROLLO".to_string(),
                "CODE REVIEW".to_string(),
                "INTEGRACION".to_string(),
            ],
            blocked: vec!["EN PAUSA".to_string()],
        }
    }
}

/// Bucket a task lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskBucket {
    /// Matched an in-progress keyword
    InProgress,
    /// Matched a blocked keyword
    Blocked,
}

impl SectionMapping {
    /// Classify a section name. In-progress keywords are tried first, so a
    /// name matching both lists is in progress.
    pub fn classify(&self, section_name: &str) -> Option<TaskBucket> {
        let upper = section_name.to_uppercase();
        let matches = |keywords: &[String]| keywords.iter().any(|k| upper.contains(&k.to_uppercase()));

        if matches(self.in_progress.as_slice()) {
            Some(TaskBucket::InProgress)
        } else if matches(self.blocked.as_slice()) {
            Some(TaskBucket::Blocked)
        } else {
            None
        }
    }
}

/// Resolve the section a task currently sits in.
///
/// The membership in `project_gid` wins; otherwise the first membership is
/// used. Returns `None` when the chosen membership has no section or the
/// task has no memberships at all.
pub fn task_section<'a>(task: &'a AsanaTask, project_gid: &str) -> Option<&'a str> {
    let in_project = task
        .memberships
        .iter()
        .find(|m| m.project.as_ref().is_some_and(|p| p.gid == project_gid));

    in_project
        .or_else(|| task.memberships.first())
        .and_then(|m| m.section.as_ref())
        .map(|s| s.name.as_str())
}

/// Open tasks split by bucket, in input order.
#[derive(Debug, Clone, Default)]
pub struct CategorizedTasks {
    /// Tasks in an in-progress section
    pub in_progress: Vec<AsanaTask>,
    /// Tasks in a blocked section
    pub blocked: Vec<AsanaTask>,
}

/// Split tasks into in-progress and blocked buckets.
///
/// Tasks without a section, or whose section matches neither list, are
/// left out.
pub fn categorize_tasks(
    tasks: Vec<AsanaTask>,
    project_gid: &str,
    mapping: &SectionMapping,
) -> CategorizedTasks {
    let mut categorized = CategorizedTasks::default();

    for task in tasks {
        let bucket = task_section(&task, project_gid).and_then(|name| mapping.classify(name));
        match bucket {
            Some(TaskBucket::InProgress) => categorized.in_progress.push(task),
            Some(TaskBucket::Blocked) => categorized.blocked.push(task),
            None => {}
        }
    }

    categorized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::{AsanaMembership, AsanaRef};

    fn task_in(gid: &str, memberships: &[(&str, &str)]) -> AsanaTask {
        AsanaTask {
            gid: gid.to_string(),
            name: format!("Task {}", gid),
            memberships: memberships
                .iter()
                .map(|(project, section)| {
                    AsanaMembership::new(
                        AsanaRef::new(*project, format!("Project {}", project)),
                        AsanaRef::new(format!("s-{}", section), *section),
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_task_section_prefers_target_project() {
        let task = task_in("1", &[("other", "Backlog"), ("target", "Code Review")]);
        assert_eq!(task_section(&task, "target"), Some("Code Review"));
    }

    #[test]
    fn test_task_section_falls_back_to_first() {
        let task = task_in("1", &[("a", "Backlog"), ("b", "Done")]);
        assert_eq!(task_section(&task, "missing"), Some("Backlog"));
    }

    #[test]
    fn test_task_section_without_memberships() {
        let task = task_in("1", &[]);
        assert_eq!(task_section(&task, "target"), None);
    }

    #[test]
    fn test_task_section_matching_membership_without_section() {
        let mut task = task_in("1", &[("a", "Backlog")]);
        task.memberships.push(AsanaMembership {
            project: Some(AsanaRef::new("target", "Target")),
            section: None,
        });
        assert_eq!(task_section(&task, "target"), None);
    }

    #[test]
    fn test_classify_is_case_insensitive_substring() {
        let mapping = SectionMapping::default();
        assert_eq!(mapping.classify("03 - Code Review"), Some(TaskBucket::InProgress));
        assert_eq!(mapping.classify("En Pausa"), Some(TaskBucket::Blocked));
        assert_eq!(mapping.classify("Backlog"), None);
    }

    #[test]
    fn test_classify_in_progress_wins_tie() {
        let mapping = SectionMapping {
            in_progress: vec!["review".to_string()],
            blocked: vec!["waiting".to_string()],
        };
        assert_eq!(mapping.classify("Waiting for Review"), Some(TaskBucket::InProgress));
    }

    #[test]
    fn test_categorize_skips_tasks_without_section() {
        let tasks = vec![
            task_in("1", &[("p", "EN DESARROLLO")]),
            task_in("2", &[]),
            task_in("3", &[("p", "En pausa")]),
            task_in("4", &[("p", "Backlog")]),
            task_in("5", &[("p", "Integracion")]),
        ];

        let categorized = categorize_tasks(tasks, "p", &SectionMapping::default());
        let in_progress: Vec<&str> = categorized.in_progress.iter().map(|t| t.gid.as_str()).collect();
        let blocked: Vec<&str> = categorized.blocked.iter().map(|t| t.gid.as_str()).collect();

        assert_eq!(in_progress, vec!["1", "5"]);
        assert_eq!(blocked, vec!["3"]);
    }

    #[test]
    fn test_mapping_keys_replace_independently() {
        let mapping: SectionMapping = serde_json::from_str(r#"{"blocked": ["On Hold"]}"#).unwrap();
        assert_eq!(mapping.blocked, vec!["On Hold"]);
        assert_eq!(mapping.in_progress, SectionMapping::default().in_progress);
    }
}
