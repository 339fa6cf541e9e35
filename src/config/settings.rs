//! Typed general-project and merge-approval settings.
//!
//! The same types describe both the desired state from the config file and
//! the state GitLab reports back, so before/after snapshots and the change
//! report work over one schema. Every field is optional: a field left out of
//! the config is never sent to GitLab.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Describes one comparable field of a settings type.
///
/// `value` renders the field for the change report, or `None` when unset.
pub struct Field<T> {
    /// `snake_case` field name as used by the config file and the API.
    pub name: &'static str,
    /// Accessor returning the rendered value.
    pub value: fn(&T) -> Option<String>,
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// Generate the `FIELDS` descriptor table for a settings struct.
macro_rules! settings_fields {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $ty {
            /// Every comparable field, in declaration order.
            pub const FIELDS: &'static [Field<$ty>] = &[
                $(Field {
                    name: stringify!($field),
                    value: |s: &$ty| s.$field.as_ref().map(ToString::to_string),
                }),+
            ];

            /// Returns `true` if `name` is one of this type's fields.
            #[must_use]
            pub fn has_field(name: &str) -> bool {
                Self::FIELDS.iter().any(|f| f.name == name)
            }
        }
    };
}

/// Implement `Display` for a unit-variant enum using its wire name.
macro_rules! wire_names {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $(Self::$variant => $name),+
                })
            }
        }
    };
}

/// Project visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only members can see the project.
    Private,
    /// Any signed-in user can see the project.
    Internal,
    /// Everyone can see the project.
    Public,
}

wire_names!(Visibility {
    Private => "private",
    Internal => "internal",
    Public => "public",
});

/// How merge requests are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMethod {
    /// Merge commit.
    Merge,
    /// Merge commit with semi-linear history.
    RebaseMerge,
    /// Fast-forward only.
    Ff,
}

wire_names!(MergeMethod {
    Merge => "merge",
    RebaseMerge => "rebase_merge",
    Ff => "ff",
});

/// Squash-on-merge policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SquashOption {
    /// Never squash.
    Never,
    /// Always squash.
    Always,
    /// Squash checkbox ticked by default.
    DefaultOn,
    /// Squash checkbox unticked by default.
    DefaultOff,
}

wire_names!(SquashOption {
    Never => "never",
    Always => "always",
    DefaultOn => "default_on",
    DefaultOff => "default_off",
});

/// General project settings (`[project_settings]`, `GET/PUT /projects/:id`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Default branch name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    /// Project description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Who can see the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// How merge requests are merged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_method: Option<MergeMethod>,
    /// Squash-on-merge policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squash_option: Option<SquashOption>,
    /// Whether issues are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues_enabled: Option<bool>,
    /// Whether merge requests are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_requests_enabled: Option<bool>,
    /// Whether the wiki is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_enabled: Option<bool>,
    /// Whether snippets are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippets_enabled: Option<bool>,
    /// Whether CI/CD jobs are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs_enabled: Option<bool>,
    /// Whether Git LFS is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lfs_enabled: Option<bool>,
    /// Whether users may request access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_access_enabled: Option<bool>,
    /// Whether shared runners are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_runners_enabled: Option<bool>,
    /// Block merging until the pipeline succeeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_allow_merge_if_pipeline_succeeds: Option<bool>,
    /// Block merging until all threads are resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_allow_merge_if_all_discussions_are_resolved: Option<bool>,
    /// Delete the source branch on merge by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_source_branch_after_merge: Option<bool>,
    /// Print the merge request link after a push.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printing_merge_request_link_enabled: Option<bool>,
    /// Resolve threads on lines changed by a push.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_outdated_diff_discussions: Option<bool>,
    /// Path of the CI configuration file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_config_path: Option<String>,
    /// Job timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_timeout: Option<u32>,
}

settings_fields!(GeneralSettings {
    default_branch,
    description,
    visibility,
    merge_method,
    squash_option,
    issues_enabled,
    merge_requests_enabled,
    wiki_enabled,
    snippets_enabled,
    jobs_enabled,
    lfs_enabled,
    request_access_enabled,
    shared_runners_enabled,
    only_allow_merge_if_pipeline_succeeds,
    only_allow_merge_if_all_discussions_are_resolved,
    remove_source_branch_after_merge,
    printing_merge_request_link_enabled,
    resolve_outdated_diff_discussions,
    ci_config_path,
    build_timeout,
});

/// Merge-request approval settings (`[approval_settings]`,
/// `GET/POST /projects/:id/approvals`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalSettings {
    /// Approvals required before a merge request can merge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approvals_before_merge: Option<u32>,
    /// Drop approvals when new commits are pushed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_approvals_on_push: Option<bool>,
    /// Forbid changing approvers per merge request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_overriding_approvers_per_merge_request: Option<bool>,
    /// Let authors approve their own merge requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_requests_author_approval: Option<bool>,
    /// Forbid committers from approving.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_requests_disable_committers_approval: Option<bool>,
    /// Ask for the user's password on approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_password_to_approve: Option<bool>,
}

settings_fields!(ApprovalSettings {
    approvals_before_merge,
    reset_approvals_on_push,
    disable_overriding_approvers_per_merge_request,
    merge_requests_author_approval,
    merge_requests_disable_committers_approval,
    require_password_to_approve,
});
