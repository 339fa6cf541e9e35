//! Desired-state configuration and runtime environment.
pub mod branches;
pub mod settings;
pub mod validation;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use branches::ProtectedBranchRule;
use settings::{ApprovalSettings, GeneralSettings};

/// Config file used when neither `--config` nor the environment names one.
pub const DEFAULT_CONFIG_FILE: &str = "gitlab-enforcer.toml";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "GITLAB_ENFORCER_CONFIG";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITLAB_TOKEN";

/// Environment variable holding the GitLab base URL.
pub const ENDPOINT_ENV: &str = "GITLAB_ENDPOINT";

/// Endpoint used when `GITLAB_ENDPOINT` is unset.
pub const DEFAULT_ENDPOINT: &str = "https://gitlab.com";

/// The desired state of every project under one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Slash-separated group path, e.g. `platform/backend`.
    pub group_name: String,
    /// If non-empty, only these full project paths are reconciled.
    #[serde(default)]
    pub project_whitelist: Vec<String>,
    /// Full project paths that are never reconciled.
    #[serde(default)]
    pub project_blacklist: Vec<String>,
    /// Create `project_settings.default_branch` from `master` when missing.
    #[serde(default)]
    pub create_default_branch: bool,
    /// Protected-branch rules, applied in order.
    #[serde(default)]
    pub protected_branches: Vec<ProtectedBranchRule>,
    /// General project settings.
    pub project_settings: Option<GeneralSettings>,
    /// Merge-request approval settings.
    pub approval_settings: Option<ApprovalSettings>,
}

impl Config {
    /// Read, parse and validate the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, holds
    /// unknown keys or invalid values, or violates a hard validation rule
    /// (see [`Config::validate`]).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse and validate config `content`; `origin` is used in messages only.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidSyntax {
            path: origin.display().to_string(),
            message,
        };

        let table: toml::Table = toml::from_str(content).map_err(|e| invalid(e.to_string()))?;
        check_section_keys(&table, "project_settings", GeneralSettings::has_field)?;
        check_section_keys(&table, "approval_settings", ApprovalSettings::has_field)?;

        let config: Self = toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The default branch the config asks for, if any.
    #[must_use]
    pub fn default_branch(&self) -> Option<&str> {
        self.project_settings
            .as_ref()
            .and_then(|s| s.default_branch.as_deref())
    }
}

/// Reject keys in `[section]` that the settings schema does not know.
///
/// The settings types also decode GitLab responses, which carry many extra
/// keys, so they cannot use `deny_unknown_fields` themselves.
fn check_section_keys(
    table: &toml::Table,
    section: &str,
    known: fn(&str) -> bool,
) -> Result<(), ConfigError> {
    let Some(value) = table.get(section) else {
        return Ok(());
    };
    let Some(inner) = value.as_table() else {
        return Err(ConfigError::InvalidValue {
            field: section.to_string(),
            message: "expected a table".to_string(),
        });
    };
    if let Some(unknown) = inner.keys().find(|k| !known(k)) {
        return Err(ConfigError::InvalidValue {
            field: format!("{section}.{unknown}"),
            message: "unknown setting".to_string(),
        });
    }
    Ok(())
}

/// Resolve the config file path from `--config`, the environment, or the default.
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    std::env::var(CONFIG_ENV).map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
}

/// Connection settings read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Environment {
    /// GitLab base URL.
    pub endpoint: String,
    /// Personal or project access token.
    pub token: String,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Environment {
    /// Read the connection settings; `endpoint` overrides `GITLAB_ENDPOINT`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] if `GITLAB_TOKEN` is unset or empty.
    pub fn from_env(endpoint: Option<&str>) -> Result<Self, ConfigError> {
        Self::from_lookup(endpoint, |key| std::env::var(key).ok())
    }

    fn from_lookup(
        endpoint: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let token = lookup(TOKEN_ENV)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnv(TOKEN_ENV.to_string()))?;
        let endpoint = endpoint
            .map(String::from)
            .or_else(|| lookup(ENDPOINT_ENV).filter(|e| !e.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Ok(Self { endpoint, token })
    }
}
