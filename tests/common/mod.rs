// Shared helpers for integration tests.
//
// Provides a stateful in-memory GitLab, a recording logger, and config
// builders so each integration test can drive the full engine without a
// network.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(
    dead_code,
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::cast_possible_truncation
)]

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

use gitlab_enforcer::config::Config;
use gitlab_enforcer::config::branches::{AccessLevel, ProtectedBranchRule};
use gitlab_enforcer::config::settings::{ApprovalSettings, GeneralSettings, Visibility};
use gitlab_enforcer::gitlab::{
    ApiError, Branch, GitLabApi, Group, Page, Project, ProtectedBranch,
};
use gitlab_enforcer::logging::{Log, ProjectEntry, ProjectStatus};
use gitlab_enforcer::reconcile::Context;

/// Ids of generated projects start here.
pub const FIRST_PROJECT_ID: u64 = 100;

#[derive(Debug, Default)]
struct State {
    groups: Vec<Group>,
    projects: Vec<Project>,
    general: HashMap<u64, GeneralSettings>,
    approval: HashMap<u64, ApprovalSettings>,
    branches: HashMap<u64, BTreeSet<String>>,
    protected: HashMap<u64, BTreeMap<String, ProtectedBranch>>,
    failing_protect: HashSet<u64>,
    reads: Vec<String>,
    mutations: Vec<String>,
}

/// In-memory GitLab holding groups, projects, branches and settings.
///
/// Mutating calls change the stored state and are logged so tests can count
/// them. Every project starts with a `master` branch, `private` visibility,
/// and zero required approvals.
#[derive(Debug)]
pub struct FakeGitLab {
    state: Mutex<State>,
    page_size: usize,
}

impl FakeGitLab {
    /// A group chain for `group_path` with `projects` (names relative to the
    /// group) under its last level.
    pub fn new(group_path: &str, projects: &[&str]) -> Self {
        let fake = Self {
            state: Mutex::new(State::default()),
            page_size: 100,
        };
        let mut walked = String::new();
        for (index, segment) in group_path.split('/').enumerate() {
            if !walked.is_empty() {
                walked.push('/');
            }
            walked.push_str(segment);
            fake.add_group(index as u64 + 1, &walked);
        }
        for name in projects {
            fake.add_project(&format!("{group_path}/{name}"));
        }
        fake
    }

    /// Serve listings `page_size` items at a time.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a group with an explicit id.
    pub fn add_group(&self, id: u64, full_path: &str) {
        self.state().groups.push(Group {
            id,
            path: full_path.rsplit('/').next().unwrap().to_string(),
            full_path: full_path.to_string(),
        });
    }

    /// Add a project at `full_path`, returning its id.
    pub fn add_project(&self, full_path: &str) -> u64 {
        let mut state = self.state();
        let id = FIRST_PROJECT_ID + state.projects.len() as u64;
        state.projects.push(Project {
            id,
            name: full_path.rsplit('/').next().unwrap().to_string(),
            full_path: full_path.to_string(),
        });
        state.general.insert(
            id,
            GeneralSettings {
                default_branch: Some("master".to_string()),
                visibility: Some(Visibility::Private),
                ..GeneralSettings::default()
            },
        );
        state.approval.insert(
            id,
            ApprovalSettings {
                approvals_before_merge: Some(0),
                ..ApprovalSettings::default()
            },
        );
        state
            .branches
            .insert(id, BTreeSet::from(["master".to_string()]));
        state.protected.insert(id, BTreeMap::new());
        id
    }

    /// Make every protect call for project `id` fail with HTTP 500.
    pub fn fail_protect_for(&self, id: u64) {
        self.state().failing_protect.insert(id);
    }

    /// Id of the project at `full_path`.
    pub fn project_id(&self, full_path: &str) -> u64 {
        self.state()
            .projects
            .iter()
            .find(|p| p.full_path == full_path)
            .map(|p| p.id)
            .expect("unknown project")
    }

    /// Every mutating call so far, in order.
    pub fn mutations(&self) -> Vec<String> {
        self.state().mutations.clone()
    }

    /// Every group lookup and subgroup listing so far, in order.
    pub fn reads(&self) -> Vec<String> {
        self.state().reads.clone()
    }

    /// Branches of project `id`.
    pub fn branches(&self, id: u64) -> BTreeSet<String> {
        self.state().branches.get(&id).cloned().unwrap_or_default()
    }

    /// Protection rules of project `id`, keyed by branch name.
    pub fn protections(&self, id: u64) -> BTreeMap<String, ProtectedBranch> {
        self.state().protected.get(&id).cloned().unwrap_or_default()
    }

    /// Current general settings of project `id`.
    pub fn general(&self, id: u64) -> GeneralSettings {
        self.state().general.get(&id).cloned().unwrap_or_default()
    }

    /// Current approval settings of project `id`.
    pub fn approval(&self, id: u64) -> ApprovalSettings {
        self.state().approval.get(&id).cloned().unwrap_or_default()
    }

    fn page<T: Clone>(&self, items: &[T], page: u32) -> Page<T> {
        let total = items.len().div_ceil(self.page_size).max(1) as u32;
        let start = (page as usize - 1) * self.page_size;
        Page {
            items: items.iter().skip(start).take(self.page_size).cloned().collect(),
            page,
            total_pages: Some(total),
            next_page: (page < total).then_some(page + 1),
        }
    }
}

fn not_found(endpoint: String) -> ApiError {
    ApiError::NotFound { endpoint }
}

/// Overlay the fields set in `desired` onto `current`, as GitLab does for
/// partial updates.
fn overlay<T: Serialize + DeserializeOwned>(current: &T, desired: &T) -> T {
    let mut merged = serde_json::to_value(current).unwrap();
    if let (Some(target), serde_json::Value::Object(fields)) =
        (merged.as_object_mut(), serde_json::to_value(desired).unwrap())
    {
        target.extend(fields);
    }
    serde_json::from_value(merged).unwrap()
}

impl GitLabApi for FakeGitLab {
    fn get_group(&self, name: &str) -> Result<Group, ApiError> {
        let mut state = self.state();
        state.reads.push(format!("get_group {name}"));
        state
            .groups
            .iter()
            .find(|g| g.full_path == name)
            .cloned()
            .ok_or_else(|| not_found(format!("groups/{name}")))
    }

    fn list_subgroups(&self, group_id: u64, page: u32) -> Result<Page<Group>, ApiError> {
        let children: Vec<Group> = {
            let mut state = self.state();
            state.reads.push(format!("list_subgroups {group_id} page {page}"));
            let parent = state
                .groups
                .iter()
                .find(|g| g.id == group_id)
                .map(|g| g.full_path.clone())
                .ok_or_else(|| not_found(format!("groups/{group_id}/subgroups")))?;
            state
                .groups
                .iter()
                .filter(|g| {
                    g.full_path
                        .strip_prefix(&format!("{parent}/"))
                        .is_some_and(|rest| !rest.contains('/'))
                })
                .cloned()
                .collect()
        };
        Ok(self.page(&children, page))
    }

    fn list_group_projects(
        &self,
        group_id: u64,
        page: u32,
        include_subgroups: bool,
    ) -> Result<Page<Project>, ApiError> {
        let projects: Vec<Project> = {
            let state = self.state();
            let parent = state
                .groups
                .iter()
                .find(|g| g.id == group_id)
                .map(|g| g.full_path.clone())
                .ok_or_else(|| not_found(format!("groups/{group_id}/projects")))?;
            let prefix = format!("{parent}/");
            state
                .projects
                .iter()
                .filter(|p| {
                    p.full_path
                        .strip_prefix(&prefix)
                        .is_some_and(|rest| include_subgroups || !rest.contains('/'))
                })
                .cloned()
                .collect()
        };
        Ok(self.page(&projects, page))
    }

    fn get_project(&self, project_id: u64) -> Result<GeneralSettings, ApiError> {
        self.state()
            .general
            .get(&project_id)
            .cloned()
            .ok_or_else(|| not_found(format!("projects/{project_id}")))
    }

    fn edit_project(
        &self,
        project_id: u64,
        settings: &GeneralSettings,
    ) -> Result<GeneralSettings, ApiError> {
        let mut state = self.state();
        state.mutations.push(format!("edit_project {project_id}"));
        let current = state
            .general
            .get(&project_id)
            .ok_or_else(|| not_found(format!("projects/{project_id}")))?;
        let updated = overlay(current, settings);
        state.general.insert(project_id, updated.clone());
        Ok(updated)
    }

    fn get_approval_configuration(&self, project_id: u64) -> Result<ApprovalSettings, ApiError> {
        self.state()
            .approval
            .get(&project_id)
            .cloned()
            .ok_or_else(|| not_found(format!("projects/{project_id}/approvals")))
    }

    fn change_approval_configuration(
        &self,
        project_id: u64,
        settings: &ApprovalSettings,
    ) -> Result<ApprovalSettings, ApiError> {
        let mut state = self.state();
        state
            .mutations
            .push(format!("change_approval_configuration {project_id}"));
        let current = state
            .approval
            .get(&project_id)
            .ok_or_else(|| not_found(format!("projects/{project_id}/approvals")))?;
        let updated = overlay(current, settings);
        state.approval.insert(project_id, updated.clone());
        Ok(updated)
    }

    fn get_branch(&self, project_id: u64, name: &str) -> Result<Branch, ApiError> {
        let state = self.state();
        if state
            .branches
            .get(&project_id)
            .is_some_and(|b| b.contains(name))
        {
            Ok(Branch {
                name: name.to_string(),
            })
        } else {
            Err(not_found(format!(
                "projects/{project_id}/repository/branches/{name}"
            )))
        }
    }

    fn create_branch(&self, project_id: u64, name: &str, git_ref: &str) -> Result<Branch, ApiError> {
        let mut state = self.state();
        state
            .mutations
            .push(format!("create_branch {project_id} {name} from {git_ref}"));
        let branches = state.branches.entry(project_id).or_default();
        if !branches.contains(git_ref) {
            return Err(ApiError::Status {
                endpoint: format!("projects/{project_id}/repository/branches"),
                status: 400,
                message: "Invalid reference name".to_string(),
            });
        }
        branches.insert(name.to_string());
        Ok(Branch {
            name: name.to_string(),
        })
    }

    fn protect_branch(
        &self,
        project_id: u64,
        name: &str,
        push: AccessLevel,
        merge: AccessLevel,
    ) -> Result<ProtectedBranch, ApiError> {
        let mut state = self.state();
        state
            .mutations
            .push(format!("protect_branch {project_id} {name}"));
        let endpoint = format!("projects/{project_id}/protected_branches");
        if state.failing_protect.contains(&project_id) {
            return Err(ApiError::Status {
                endpoint,
                status: 500,
                message: "internal error".to_string(),
            });
        }
        let rules = state.protected.entry(project_id).or_default();
        if rules.contains_key(name) {
            return Err(ApiError::Status {
                endpoint,
                status: 409,
                message: "Protected branch already exists".to_string(),
            });
        }
        let rule = ProtectedBranch {
            name: name.to_string(),
            push_access_level: push,
            merge_access_level: merge,
        };
        rules.insert(name.to_string(), rule.clone());
        Ok(rule)
    }

    fn unprotect_branch(&self, project_id: u64, name: &str) -> Result<(), ApiError> {
        let mut state = self.state();
        state
            .mutations
            .push(format!("unprotect_branch {project_id} {name}"));
        state
            .protected
            .entry(project_id)
            .or_default()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| not_found(format!("projects/{project_id}/protected_branches/{name}")))
    }
}

/// In-memory [`Log`] that keeps every message and project record.
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<(&'static str, String)>>,
    projects: Mutex<Vec<ProjectEntry>>,
}

impl RecordingLog {
    fn push(&self, level: &'static str, msg: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, msg.to_string()));
    }

    /// Messages logged at `level`.
    pub fn messages(&self, level: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Recorded project outcomes.
    pub fn projects(&self) -> Vec<ProjectEntry> {
        self.projects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Status recorded for `name`.
    pub fn status_of(&self, name: &str) -> Option<ProjectStatus> {
        self.projects()
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.status)
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn record_project(&self, name: &str, status: ProjectStatus, message: Option<&str>) {
        self.projects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ProjectEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
    }
}

/// A config for `group` that protects `main` and sets visibility, default
/// branch and required approvals.
pub fn full_config(group: &str) -> Config {
    Config {
        group_name: group.to_string(),
        create_default_branch: true,
        protected_branches: vec![ProtectedBranchRule::new(
            "main",
            AccessLevel::Maintainer,
            AccessLevel::Developer,
        )],
        project_settings: Some(GeneralSettings {
            default_branch: Some("main".to_string()),
            visibility: Some(Visibility::Public),
            ..GeneralSettings::default()
        }),
        approval_settings: Some(ApprovalSettings {
            approvals_before_merge: Some(2),
            ..ApprovalSettings::default()
        }),
        ..Config::default()
    }
}

/// A fresh context over `fake`, returning the recorder too.
pub fn context(fake: &Arc<FakeGitLab>, config: Config, dry_run: bool) -> (Context, Arc<RecordingLog>) {
    let log = Arc::new(RecordingLog::default());
    let api: Arc<dyn GitLabApi> = Arc::<FakeGitLab>::clone(fake);
    let ctx = Context::new(api, Arc::new(config), log.clone(), dry_run);
    (ctx, log)
}
