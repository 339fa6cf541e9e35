//! Configuration validation: hard errors and advisory warnings.
use std::collections::HashSet;

use super::Config;
use crate::error::ConfigError;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The config key that triggered the warning (e.g., "protected_branches").
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning for `item` under config key `source`.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

impl Config {
    /// Check the rules the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns an error if the group path is empty or has empty segments, if
    /// both project lists are populated, or if a protected-branch rule has
    /// no name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let group = self.group_name.as_str();
        if group.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "group_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if group.split('/').any(str::is_empty) {
            return Err(ConfigError::InvalidValue {
                field: "group_name".to_string(),
                message: format!("'{group}' contains an empty path segment"),
            });
        }
        // The path is looked up verbatim, so padding would become part of it.
        if group.split('/').any(|segment| segment.trim() != segment) {
            return Err(ConfigError::InvalidValue {
                field: "group_name".to_string(),
                message: format!("'{group}' has whitespace around a path segment"),
            });
        }

        if !self.project_whitelist.is_empty() && !self.project_blacklist.is_empty() {
            return Err(ConfigError::ConflictingProjectLists);
        }

        if self
            .protected_branches
            .iter()
            .any(|rule| rule.name.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "protected_branches.name".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Return advisory warnings that do not prevent a run.
    #[must_use]
    pub fn warnings(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        let mut seen = HashSet::new();
        for rule in &self.protected_branches {
            if !seen.insert(rule.name.as_str()) {
                warnings.push(ValidationWarning::new(
                    "protected_branches",
                    &rule.name,
                    "rule listed more than once; the last one wins",
                ));
            }
        }

        let prefix = format!("{}/", self.group_name);
        for (source, list) in [
            ("project_whitelist", &self.project_whitelist),
            ("project_blacklist", &self.project_blacklist),
        ] {
            for path in list.iter().filter(|p| !p.starts_with(&prefix)) {
                warnings.push(ValidationWarning::new(
                    source,
                    path,
                    format!("not under group '{}'; it can never match", self.group_name),
                ));
            }
        }

        if self.create_default_branch && self.default_branch().is_none() {
            warnings.push(ValidationWarning::new(
                "create_default_branch",
                "true",
                "no project_settings.default_branch configured; nothing to create",
            ));
        }

        if self.project_settings.is_none() {
            warnings.push(ValidationWarning::new(
                "project_settings",
                "-",
                "section absent; general settings will not be reconciled",
            ));
        }
        if self.approval_settings.is_none() {
            warnings.push(ValidationWarning::new(
                "approval_settings",
                "-",
                "section absent; approval settings will not be reconciled",
            ));
        }

        warnings
    }
}
