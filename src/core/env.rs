//! Credentials and endpoints from the environment.
//!
//! Values come from the process environment after the user's `.env` file has
//! been loaded. Variables already set in the environment take precedence over
//! the file.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::Config;
use crate::integrations::GITLAB_API_URL;

/// An environment variable the tool needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvVar {
    /// Variable name
    pub name: &'static str,
    /// Human-readable prompt label
    pub label: &'static str,
    /// Whether the value is a credential
    pub secret: bool,
}

pub const GITLAB_TOKEN: EnvVar =
    EnvVar { name: "GITLAB_TOKEN", label: "GitLab personal access token", secret: true };
pub const GITLAB_URL: EnvVar =
    EnvVar { name: "GITLAB_URL", label: "GitLab API URL", secret: false };
pub const ASANA_TOKEN: EnvVar =
    EnvVar { name: "ASANA_TOKEN", label: "Asana personal access token", secret: true };
pub const ASANA_WORKSPACE_GID: EnvVar =
    EnvVar { name: "ASANA_WORKSPACE_GID", label: "Asana workspace GID", secret: false };

/// Variables without a default.
pub const REQUIRED_VARS: &[EnvVar] = &[GITLAB_TOKEN, ASANA_TOKEN, ASANA_WORKSPACE_GID];

/// The resolved environment bundle.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedEnv {
    pub gitlab_token: String,
    pub gitlab_url: String,
    pub asana_token: String,
    pub asana_workspace_gid: String,
}

impl std::fmt::Debug for ResolvedEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedEnv")
            .field("gitlab_token", &"<redacted>")
            .field("gitlab_url", &self.gitlab_url)
            .field("asana_token", &"<redacted>")
            .field("asana_workspace_gid", &self.asana_workspace_gid)
            .finish()
    }
}

impl ResolvedEnv {
    /// Resolve from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(read_var)
    }

    /// Resolve with `overrides` taking precedence over the environment.
    pub fn from_env_with(overrides: &[(String, String)]) -> anyhow::Result<Self> {
        Self::from_lookup(|name| {
            overrides
                .iter()
                .find(|(k, v)| k == name && !v.trim().is_empty())
                .map(|(_, v)| v.trim().to_string())
                .or_else(|| read_var(name))
        })
    }

    /// Resolve using `lookup`; blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let missing = missing_with(&lookup);
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|v| v.name).collect();
            anyhow::bail!("Missing required environment variables: {}", names.join(", "));
        }

        let get = |var: EnvVar| lookup(var.name).unwrap_or_default();
        Ok(Self {
            gitlab_token: get(GITLAB_TOKEN),
            gitlab_url: lookup(GITLAB_URL.name)
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| GITLAB_API_URL.to_string()),
            asana_token: get(ASANA_TOKEN),
            asana_workspace_gid: get(ASANA_WORKSPACE_GID),
        })
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn missing_with(lookup: &impl Fn(&str) -> Option<String>) -> Vec<EnvVar> {
    REQUIRED_VARS.iter().copied().filter(|var| lookup(var.name).is_none()).collect()
}

/// Required variables not set in the process environment.
pub fn missing_vars() -> Vec<EnvVar> {
    missing_with(&read_var)
}

/// Location of the user's `.env` file.
pub fn env_file_path() -> Option<PathBuf> {
    Config::config_dir().map(|d| d.join(".env"))
}

/// Load `path` into the process environment without overriding variables
/// that are already set. A missing file is not an error.
pub fn load_env_file(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No .env file");
        return Ok(());
    }

    dotenvy::from_path(path).with_context(|| format!("Failed to load {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Loaded .env file");
    Ok(())
}

/// Write `vars` into the `.env` file at `path`, merged over the entries
/// already there. Comments and blank lines are not preserved.
pub fn save_env_file(path: &Path, vars: &[(String, String)]) -> anyhow::Result<()> {
    let mut entries: Vec<(String, String)> = Vec::new();
    if path.exists() {
        for item in dotenvy::from_path_iter(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
        {
            let (key, value) = item.with_context(|| format!("Failed to parse {}", path.display()))?;
            upsert(&mut entries, key, value);
        }
    }

    for (key, value) in vars {
        upsert(&mut entries, key.clone(), value.clone());
    }

    let content: String =
        entries.iter().map(|(k, v)| format!("{}={}\n", k, quote_value(v))).collect();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn upsert(entries: &mut Vec<(String, String)>, key: String, value: String) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

fn quote_value(value: &str) -> String {
    if value.chars().any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$')) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| {
            pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone()).filter(|v| !v.is_empty())
        }
    }

    #[test]
    fn test_resolve_with_default_gitlab_url() {
        let env = ResolvedEnv::from_lookup(lookup_from(&[
            ("GITLAB_TOKEN", "glpat"),
            ("ASANA_TOKEN", "asana"),
            ("ASANA_WORKSPACE_GID", "123"),
        ]))
        .unwrap();

        assert_eq!(env.gitlab_url, "https://gitlab.com/api/v4");
        assert_eq!(env.asana_workspace_gid, "123");
    }

    #[test]
    fn test_resolve_reports_missing_names() {
        let err = ResolvedEnv::from_lookup(lookup_from(&[("GITLAB_TOKEN", "glpat"), ("ASANA_TOKEN", "")]))
            .unwrap_err()
            .to_string();

        assert!(err.contains("ASANA_TOKEN"));
        assert!(err.contains("ASANA_WORKSPACE_GID"));
        assert!(!err.contains("GITLAB_TOKEN"));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let env = ResolvedEnv {
            gitlab_token: "glpat-secret".to_string(),
            gitlab_url: GITLAB_API_URL.to_string(),
            asana_token: "asana-secret".to_string(),
            asana_workspace_gid: "1".to_string(),
        };
        let debug = format!("{env:?}");
        assert!(!debug.contains("secret"));
    }

    #[test]
    #[serial]
    fn test_overrides_win_over_environment() {
        std::env::set_var("GITLAB_TOKEN", "from-env");
        std::env::set_var("ASANA_TOKEN", "asana");
        std::env::set_var("ASANA_WORKSPACE_GID", "9");
        std::env::set_var("GITLAB_URL", "https://git.example.com/api/v4/");

        let env =
            ResolvedEnv::from_env_with(&[("GITLAB_TOKEN".to_string(), "prompted".to_string())])
                .unwrap();

        for name in ["GITLAB_TOKEN", "ASANA_TOKEN", "ASANA_WORKSPACE_GID", "GITLAB_URL"] {
            std::env::remove_var(name);
        }

        assert_eq!(env.gitlab_token, "prompted");
        assert_eq!(env.gitlab_url, "https://git.example.com/api/v4");
    }

    #[test]
    #[serial]
    fn test_load_env_file_keeps_existing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "STANDUP_TEST_A=file\nSTANDUP_TEST_B=file\n").unwrap();
        std::env::set_var("STANDUP_TEST_A", "process");

        load_env_file(&path).unwrap();
        let a = std::env::var("STANDUP_TEST_A").unwrap();
        let b = std::env::var("STANDUP_TEST_B").unwrap();
        std::env::remove_var("STANDUP_TEST_A");
        std::env::remove_var("STANDUP_TEST_B");

        assert_eq!(a, "process");
        assert_eq!(b, "file");
    }

    #[test]
    fn test_load_missing_env_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_file(&dir.path().join(".env")).is_ok());
    }

    #[test]
    fn test_save_env_file_merges_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standup").join(".env");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "# tokens\nGITLAB_TOKEN=old\n\nASANA_TOKEN=keep\n").unwrap();

        save_env_file(
            &path,
            &[
                ("GITLAB_TOKEN".to_string(), "new".to_string()),
                ("ASANA_WORKSPACE_GID".to_string(), "my workspace".to_string()),
            ],
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("# tokens"));

        let entries: Vec<(String, String)> =
            dotenvy::from_path_iter(&path).unwrap().map(|e| e.unwrap()).collect();
        assert_eq!(
            entries,
            vec![
                ("GITLAB_TOKEN".to_string(), "new".to_string()),
                ("ASANA_TOKEN".to_string(), "keep".to_string()),
                ("ASANA_WORKSPACE_GID".to_string(), "my workspace".to_string()),
            ]
        );
    }
}
