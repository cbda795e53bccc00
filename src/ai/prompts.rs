//! Instruction template for progress summaries.

use crate::summary::ReportInput;

/// Build the system prompt, asking for output in `language`.
pub fn system_prompt(language: &str) -> String {
    format!(
        r"You write weekly progress summaries for team meetings.

You receive structured data about one developer: Asana tasks and GitLab merge requests.

Your job:
1. Group items by theme or area of work (infer themes from names and descriptions)
2. Synthesize: if an Asana task and a GitLab merge request are about the same thing, combine them into one bullet
3. If a merged merge request has a linkedAsanaTask that is now in QA/PO or assigned to someone else, say that it was delivered
4. If a completed task has sectionTransitions, use them to briefly describe its path or the most relevant transition (e.g. 'went from Code Review to Integration and was completed')
5. Produce the summary in exactly this format:

**Completed:**
- [Project] - [Theme]: Concise description (reference to MR or task)

**In progress:**
- [Project] - [Theme]: Concise description (current state: in development/code review/integration)

**Blockers:**
- [Theme]: Concise description (reason for the block if known)

Rules:
- Start each bullet with [Project] when there is an associated merge request or GitLab project. If the item only comes from Asana and has no project, omit [Project]
- Themes are short (1-2 words): [Auth], [Payments], [Dashboard], [Infra], etc.
- Each bullet is concise but informative (1 line)
- Include references to merge requests (!number) and tasks when they exist
- For in-progress items, mention the current state in parentheses
- For blockers, mention the dependency or reason in parentheses
- If a section has no items, omit that section
- Write in {}",
        language
    )
}

/// Build the user message carrying the report as pretty-printed JSON.
pub fn user_prompt(report: &ReportInput) -> anyhow::Result<String> {
    let data = serde_json::to_string_pretty(report)?;
    Ok(format!(
        "Data for the period {} to {}:\n\n{}",
        report.date_range.from, report.date_range.to, data
    ))
}
