//! # Standup
//!
//! Weekly progress summaries from GitLab and Asana.
//!
//! Standup collects a developer's merge requests and Asana tasks for a
//! reporting window, links merge requests to the tasks they reference,
//! sorts open tasks into in-progress and blocked work by their board
//! section, and asks a language model to write the status update.
//!
//! ## Features
//!
//! - **Linking**: Asana task URLs in merge request descriptions are resolved
//!   to the task's current section and assignee
//! - **Categorization**: Configurable section keywords decide what counts as
//!   in progress or blocked
//! - **Transitions**: Section moves recorded on completed tasks are replayed
//!   into the report
//! - **AI Providers**: Gemini, Claude, or a local Ollama model with fallback
//!
//! ## Quick Start
//!
//! ```bash
//! # Summarize the current week
//! standup
//!
//! # A specific window, printed as the raw report
//! standup summary --from 2026-02-02 --to 2026-02-06 --json
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::new_without_default)]

pub mod ai;
pub mod core;
pub mod integrations;
pub mod summary;

pub use ai::{AIError, AIManager, Summarizer};
pub use core::{Config, DateRange, ResolvedEnv};
pub use integrations::{AsanaClient, CodeHost, GitLabClient, TaskTracker};
pub use summary::{collect_progress, handle_progress_summary, ReportInput, SummaryRequest};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "standup";
