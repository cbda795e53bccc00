//! Section transitions reconstructed from a task's stories.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::DateRange;
use crate::integrations::{AsanaResult, AsanaStory, TaskTracker};

/// Story subtype Asana records when a task changes section.
pub const SECTION_CHANGED: &str = "section_changed";

static SECTION_MOVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)moved this task from (.+) to (.+)").expect("valid section move regex")
});

/// A move of a task from one section to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTransition {
    /// Section the task left
    pub from: String,
    /// Section the task entered
    pub to: String,
    /// When the move was recorded
    pub at: String,
}

/// Parse `"moved this task from X to Y"` into `(X, Y)`.
///
/// The first group is greedy: `from A to B to C` yields `("A to B", "C")`.
pub fn parse_section_move(text: &str) -> Option<(String, String)> {
    let captures = SECTION_MOVE.captures(text)?;
    let from = captures.get(1)?.as_str();
    let to = captures.get(2)?.as_str();

    if from.is_empty() || to.is_empty() {
        return None;
    }
    Some((from.to_string(), to.to_string()))
}

/// Turn stories into the section transitions recorded inside `range`.
pub fn section_transitions(stories: &[AsanaStory], range: &DateRange) -> Vec<SectionTransition> {
    stories
        .iter()
        .filter(|s| s.resource_subtype == SECTION_CHANGED && range.contains(&s.created_at))
        .filter_map(|s| {
            parse_section_move(&s.text).map(|(from, to)| SectionTransition {
                from,
                to,
                at: s.created_at.clone(),
            })
        })
        .collect()
}

/// Fetch a task's stories and reduce them to transitions inside `range`.
pub async fn fetch_section_transitions(
    tracker: &dyn TaskTracker,
    task_gid: &str,
    range: &DateRange,
) -> AsanaResult<Vec<SectionTransition>> {
    let stories = tracker.task_stories(task_gid).await?;
    Ok(section_transitions(&stories, range))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(subtype: &str, created_at: &str, text: &str) -> AsanaStory {
        AsanaStory {
            gid: "s".to_string(),
            created_at: created_at.to_string(),
            resource_subtype: subtype.to_string(),
            text: text.to_string(),
        }
    }

    fn week() -> DateRange {
        DateRange::new("2026-02-01", "2026-02-07")
    }

    #[test]
    fn test_single_transition() {
        let stories = [story(
            SECTION_CHANGED,
            "2026-02-03T10:00:00.000Z",
            "moved this task from Backlog to In Review",
        )];

        let transitions = section_transitions(&stories, &week());
        assert_eq!(
            transitions,
            vec![SectionTransition {
                from: "Backlog".to_string(),
                to: "In Review".to_string(),
                at: "2026-02-03T10:00:00.000Z".to_string(),
            }]
        );
    }

    #[test]
    fn test_other_subtypes_ignored() {
        let stories = [story(
            "comment_added",
            "2026-02-03T10:00:00.000Z",
            "moved this task from Backlog to In Review",
        )];
        assert!(section_transitions(&stories, &week()).is_empty());
    }

    #[test]
    fn test_out_of_window_ignored() {
        let stories = [
            story(SECTION_CHANGED, "2026-01-20T10:00:00.000Z", "moved this task from A to B"),
            story(SECTION_CHANGED, "2026-02-09T10:00:00.000Z", "moved this task from B to C"),
        ];
        assert!(section_transitions(&stories, &week()).is_empty());
    }

    #[test]
    fn test_malformed_text_ignored() {
        let stories = [story(SECTION_CHANGED, "2026-02-03T10:00:00.000Z", "changed the section")];
        assert!(section_transitions(&stories, &week()).is_empty());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            parse_section_move("Jane Moved This Task From Code Review to QA (Sprint 4)"),
            Some(("Code Review".to_string(), "QA (Sprint 4)".to_string()))
        );
    }

    #[test]
    fn test_parse_greedy_from() {
        assert_eq!(
            parse_section_move("moved this task from A to B to C"),
            Some(("A to B".to_string(), "C".to_string()))
        );
    }

    #[test]
    fn test_order_preserved() {
        let stories = [
            story(SECTION_CHANGED, "2026-02-02T10:00:00.000Z", "moved this task from A to B"),
            story(SECTION_CHANGED, "2026-02-04T10:00:00.000Z", "moved this task from B to C"),
        ];
        let transitions = section_transitions(&stories, &week());
        let targets: Vec<&str> = transitions.iter().map(|t| t.to.as_str()).collect();
        assert_eq!(targets, vec!["B", "C"]);
    }
}
