//! Core types and functionality for standup.
//!
//! Configuration, the resolved environment, reporting windows and
//! interactive prompts.

mod config;
mod date_range;
pub mod env;
mod prompt;

pub use config::{
    save_projects_to, AiConfig, AsanaConfig, Config, GitLabConfig, OllamaConfig,
    LOCAL_CONFIG_FILE,
};
pub use date_range::{is_valid_date, DateRange};
pub use env::{EnvVar, ResolvedEnv};
pub use prompt::{split_list, Prompter};
