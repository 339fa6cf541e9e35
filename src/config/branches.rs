//! Protected-branch rules and GitLab access levels.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// GitLab access level granted to push or merge on a protected branch.
///
/// Configured by name (`none`, `developer`, `maintainer`); sent to the API
/// as the numeric level GitLab expects.
///
/// # Examples
///
/// ```
/// use gitlab_enforcer::config::branches::AccessLevel;
///
/// assert_eq!(AccessLevel::Maintainer.value(), 40);
/// assert_eq!("developer".parse::<AccessLevel>().unwrap(), AccessLevel::Developer);
/// assert!("owner".parse::<AccessLevel>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    /// No one is allowed.
    None,
    /// Developers and maintainers are allowed.
    Developer,
    /// Only maintainers are allowed.
    Maintainer,
}

impl AccessLevel {
    /// Numeric access level used by the GitLab API.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Developer => 30,
            Self::Maintainer => 40,
        }
    }

    /// Configuration name of this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Developer => "developer",
            Self::Maintainer => "maintainer",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "developer" => Ok(Self::Developer),
            // "master" is the pre-11.x GitLab name for maintainer.
            "maintainer" | "master" => Ok(Self::Maintainer),
            other => Err(format!(
                "unknown access level '{other}' (expected none, developer or maintainer)"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for AccessLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for AccessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single protected-branch rule from the `[[protected_branches]]` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProtectedBranchRule {
    /// Branch name (or wildcard pattern) to protect.
    pub name: String,
    /// Who may push to the branch.
    pub push_access_level: AccessLevel,
    /// Who may merge into the branch.
    pub merge_access_level: AccessLevel,
}

impl ProtectedBranchRule {
    /// Create a rule.
    #[must_use]
    pub fn new(name: impl Into<String>, push: AccessLevel, merge: AccessLevel) -> Self {
        Self {
            name: name.into(),
            push_access_level: push,
            merge_access_level: merge,
        }
    }
}
