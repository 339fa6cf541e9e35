//! Resources returned by the GitLab API, reduced to the fields the engine reads.
use serde::Deserialize;

use crate::config::branches::AccessLevel;

/// A group or subgroup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Group {
    /// Numeric group id.
    pub id: u64,
    /// Last path segment.
    pub path: String,
    /// Full slash-separated path from the top-level group.
    pub full_path: String,
}

/// A project discovered under a group. Immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    /// Numeric project id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Full namespaced path, unique across the instance.
    #[serde(rename = "path_with_namespace")]
    pub full_path: String,
}

/// A repository branch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Branch {
    /// Branch name.
    pub name: String,
}

/// A protected-branch rule as GitLab reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedBranch {
    /// Branch name or pattern.
    pub name: String,
    /// Highest-privilege push level in the rule.
    pub push_access_level: AccessLevel,
    /// Highest-privilege merge level in the rule.
    pub merge_access_level: AccessLevel,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// The page number that was requested (1-based).
    pub page: u32,
    /// Total page count, when the API reports it.
    pub total_pages: Option<u32>,
    /// Next page number, when there is one.
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    /// Returns `true` if no further page should be requested.
    ///
    /// Stops when the reported total has been reached or only one page
    /// exists; without a total, the next-page marker decides.
    #[must_use]
    pub fn is_last(&self) -> bool {
        match self.total_pages {
            Some(total) => total <= 1 || self.page >= total,
            None => self.next_page.is_none(),
        }
    }

    /// Page number to request after this one.
    ///
    /// Always moves forward, even when the next-page marker points back.
    #[must_use]
    pub fn following(&self) -> u32 {
        let step = self.page.saturating_add(1);
        self.next_page.map_or(step, |next| next.max(step))
    }
}
