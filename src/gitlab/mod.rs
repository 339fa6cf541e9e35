//! The GitLab collaborator: the narrow API the engine consumes and its HTTP
//! implementation.
mod client;
mod error;
pub mod types;

pub use client::HttpClient;
pub use error::ApiError;
pub use types::{Branch, Group, Page, Project, ProtectedBranch};

use crate::config::branches::AccessLevel;
use crate::config::settings::{ApprovalSettings, GeneralSettings};

/// Page size used for every listing request.
pub const PER_PAGE: u32 = 100;

/// The remote operations the reconciliation engine invokes.
///
/// Production code uses [`HttpClient`]; tests substitute a mock or an
/// in-memory fake. Every listing takes its page number as an argument so no
/// pagination state is shared between calls.
#[cfg_attr(test, mockall::automock)]
pub trait GitLabApi: Send + Sync {
    /// Look up a top-level group by path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if no such group exists.
    fn get_group(&self, name: &str) -> Result<Group, ApiError>;

    /// List one page of the direct subgroups of `group_id`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or API failure.
    fn list_subgroups(&self, group_id: u64, page: u32) -> Result<Page<Group>, ApiError>;

    /// List one page of the projects of `group_id`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or API failure.
    fn list_group_projects(
        &self,
        group_id: u64,
        page: u32,
        include_subgroups: bool,
    ) -> Result<Page<Project>, ApiError>;

    /// Fetch the general settings of a project.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or API failure.
    fn get_project(&self, project_id: u64) -> Result<GeneralSettings, ApiError>;

    /// Update the general settings of a project.
    ///
    /// # Errors
    ///
    /// Returns an error if GitLab rejects the update.
    fn edit_project(
        &self,
        project_id: u64,
        settings: &GeneralSettings,
    ) -> Result<GeneralSettings, ApiError>;

    /// Fetch the merge-request approval configuration of a project.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or API failure.
    fn get_approval_configuration(&self, project_id: u64) -> Result<ApprovalSettings, ApiError>;

    /// Update the merge-request approval configuration of a project.
    ///
    /// # Errors
    ///
    /// Returns an error if GitLab rejects the update.
    fn change_approval_configuration(
        &self,
        project_id: u64,
        settings: &ApprovalSettings,
    ) -> Result<ApprovalSettings, ApiError>;

    /// Look up a branch.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the branch does not exist.
    fn get_branch(&self, project_id: u64, name: &str) -> Result<Branch, ApiError>;

    /// Create branch `name` from `git_ref`.
    ///
    /// # Errors
    ///
    /// Returns an error if GitLab rejects the creation.
    fn create_branch(&self, project_id: u64, name: &str, git_ref: &str)
    -> Result<Branch, ApiError>;

    /// Protect branch `name` with the given push and merge levels.
    ///
    /// # Errors
    ///
    /// Returns an error if GitLab rejects the protection (e.g. it already exists).
    fn protect_branch(
        &self,
        project_id: u64,
        name: &str,
        push: AccessLevel,
        merge: AccessLevel,
    ) -> Result<ProtectedBranch, ApiError>;

    /// Remove the protection of branch `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the branch was not protected.
    fn unprotect_branch(&self, project_id: u64, name: &str) -> Result<(), ApiError>;
}
