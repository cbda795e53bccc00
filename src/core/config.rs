//! Configuration management for standup.
//!
//! Handles loading and saving configuration from JSON files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::summary::SectionMapping;

/// Name of the per-directory config file.
pub const LOCAL_CONFIG_FILE: &str = ".standup.json";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitLab settings
    pub gitlab: GitLabConfig,

    /// Asana settings
    pub asana: AsanaConfig,

    /// AI settings
    pub ai: AiConfig,
}

/// Remembered GitLab projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GitLabConfig {
    /// Project names searched for merge requests
    pub project_names: Vec<String>,
}

/// Remembered Asana project and section keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AsanaConfig {
    /// Project GID whose sections drive categorization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Keyword lists; each list present in the file replaces its default
    pub section_mapping: SectionMapping,
}

/// Summarizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiConfig {
    /// Preferred provider: "gemini", "claude" or "ollama"
    pub provider: String,

    /// Model override for the preferred provider
    pub model: Option<String>,

    /// Language the summary is written in
    pub language: String,

    /// Ollama settings
    pub ollama: OllamaConfig,
}

/// Local Ollama settings. Unset values fall back to `OLLAMA_HOST` and
/// `OLLAMA_MODEL`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OllamaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            language: "Spanish".to_string(),
            ollama: OllamaConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.standup.json` in current directory
    /// 2. `~/.config/standup/config.json`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        match Self::find() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Path of the config file `load` would read, if one exists.
    pub fn find() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        Self::global_path().filter(|p| p.exists())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Remember project names and the Asana project in the active config
    /// file (the one `load` reads, else the global one).
    pub fn save_projects(project_names: &[String], asana_project: &str) -> anyhow::Result<PathBuf> {
        let path = Self::find()
            .or_else(Self::global_path)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        save_projects_to(&path, project_names, asana_project)?;
        Ok(path)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("standup"))
    }

    /// Get the global config file path.
    pub fn global_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.json"))
    }
}

/// Update only the remembered projects in `path`, keeping every other key
/// (including ones this version does not know about).
pub fn save_projects_to(
    path: &Path,
    project_names: &[String],
    asana_project: &str,
) -> anyhow::Result<()> {
    let mut doc = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?
    } else {
        serde_json::json!({})
    };

    let root = doc
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Config file {} is not a JSON object", path.display()))?;

    let gitlab = root.entry("gitlab").or_insert_with(|| serde_json::json!({}));
    if let Some(gitlab) = gitlab.as_object_mut() {
        gitlab.insert("projectNames".to_string(), serde_json::json!(project_names));
    }

    let asana = root.entry("asana").or_insert_with(|| serde_json::json!({}));
    if let Some(asana) = asana.as_object_mut() {
        asana.insert("projectId".to_string(), serde_json::json!(asana_project));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}
