#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for a full sync run.
//!
//! These tests drive [`reconcile::sync`] against the in-memory GitLab from
//! `common`, covering the change report, idempotence, dry-run, failure
//! isolation, project selection and nested group resolution.

mod common;

use std::sync::Arc;

use common::*;
use gitlab_enforcer::config::branches::AccessLevel;
use gitlab_enforcer::config::settings::{GeneralSettings, Visibility};
use gitlab_enforcer::error::EnforcerError;
use gitlab_enforcer::gitlab::GitLabApi;
use gitlab_enforcer::logging::ProjectStatus;
use gitlab_enforcer::reconcile;

const GROUP: &str = "team/backend";

fn fake() -> Arc<FakeGitLab> {
    Arc::new(FakeGitLab::new(GROUP, &["zeta", "alpha"]))
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

#[test]
fn change_log_report() {
    let fake = fake();
    let (ctx, _log) = context(&fake, full_config(GROUP), false);
    let outcome = reconcile::sync(&ctx).unwrap();
    let report = outcome.report.expect("changes should be reported");
    assert!(report.starts_with("\nCHANGE LOG\n"));
    insta::assert_snapshot!("change_log_report", report.trim());
}

#[test]
fn full_run_applies_desired_state() {
    let fake = fake();
    let (ctx, log) = context(&fake, full_config(GROUP), false);
    let outcome = reconcile::sync(&ctx).unwrap();

    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.projects.len(), 2);
    for path in ["team/backend/zeta", "team/backend/alpha"] {
        let id = fake.project_id(path);
        assert!(fake.branches(id).contains("main"));
        let rule = &fake.protections(id)["main"];
        assert_eq!(rule.push_access_level, AccessLevel::Maintainer);
        assert_eq!(rule.merge_access_level, AccessLevel::Developer);
        assert_eq!(fake.general(id).visibility, Some(Visibility::Public));
        assert_eq!(fake.approval(id).approvals_before_merge, Some(2));
        assert_eq!(log.status_of(path), Some(ProjectStatus::Ok));
    }
}

#[test]
fn projects_are_processed_in_discovery_order() {
    let fake = fake();
    let (ctx, log) = context(&fake, full_config(GROUP), false);
    reconcile::sync(&ctx).unwrap();

    let names: Vec<String> = log.projects().into_iter().map(|p| p.name).collect();
    assert_eq!(names, ["team/backend/zeta", "team/backend/alpha"]);
}

#[test]
fn second_run_is_idempotent() {
    let fake = fake();
    let (first, _log) = context(&fake, full_config(GROUP), false);
    reconcile::sync(&first).unwrap();
    let id = fake.project_id("team/backend/alpha");
    let protections = fake.protections(id);

    let (second, _log) = context(&fake, full_config(GROUP), false);
    let outcome = reconcile::sync(&second).unwrap();

    assert_eq!(outcome.failed, 0);
    assert!(outcome.report.is_none());
    assert_eq!(fake.protections(id), protections);
    assert_eq!(
        fake.mutations()
            .iter()
            .filter(|m| m.starts_with("create_branch"))
            .count(),
        2,
        "branches are only created on the first run"
    );
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

#[test]
fn dry_run_makes_no_mutations_and_reports_nothing() {
    let fake = fake();
    let (ctx, log) = context(&fake, full_config(GROUP), true);
    let outcome = reconcile::sync(&ctx).unwrap();

    assert!(fake.mutations().is_empty());
    assert!(outcome.report.is_none());
    assert_eq!(outcome.failed, 0);
    for entry in log.projects() {
        assert_eq!(entry.status, ProjectStatus::DryRun);
    }
    assert!(
        log.messages("dry_run")
            .iter()
            .any(|m| m == "team/backend/zeta: would create branch main from master")
    );
}

// ---------------------------------------------------------------------------
// Failure isolation
// ---------------------------------------------------------------------------

#[test]
fn failing_project_does_not_stop_the_run() {
    let fake = fake();
    let alpha = fake.project_id("team/backend/alpha");
    let zeta = fake.project_id("team/backend/zeta");
    fake.fail_protect_for(alpha);

    let (ctx, log) = context(&fake, full_config(GROUP), false);
    let outcome = reconcile::sync(&ctx).unwrap();

    assert_eq!(outcome.failed, 1);
    assert_eq!(log.status_of("team/backend/alpha"), Some(ProjectStatus::Failed));
    assert_eq!(log.status_of("team/backend/zeta"), Some(ProjectStatus::Ok));
    assert!(fake.protections(alpha).is_empty());
    assert!(fake.protections(zeta).contains_key("main"));
    // Settings still run for the project whose branches failed.
    assert_eq!(fake.general(alpha).visibility, Some(Visibility::Public));
    assert!(log.messages("error")[0].starts_with("team/backend/alpha: branches:"));
}

// ---------------------------------------------------------------------------
// Project selection
// ---------------------------------------------------------------------------

#[test]
fn whitelist_limits_the_run() {
    let fake = fake();
    let mut config = full_config(GROUP);
    config.project_whitelist = vec!["team/backend/alpha".to_string()];
    let (ctx, _log) = context(&fake, config, false);
    let outcome = reconcile::sync(&ctx).unwrap();

    let paths: Vec<&str> = outcome.projects.iter().map(|p| p.full_path.as_str()).collect();
    assert_eq!(paths, ["team/backend/alpha"]);
    let zeta = fake.project_id("team/backend/zeta");
    assert_eq!(fake.general(zeta).visibility, Some(Visibility::Private));
}

#[test]
fn blacklist_excludes_projects() {
    let fake = fake();
    let mut config = full_config(GROUP);
    config.project_blacklist = vec!["team/backend/zeta".to_string()];
    let (ctx, _log) = context(&fake, config, false);
    let outcome = reconcile::sync(&ctx).unwrap();

    assert_eq!(outcome.projects.len(), 1);
    assert_eq!(outcome.projects[0].full_path, "team/backend/alpha");
}

#[test]
fn projects_in_nested_subgroups_are_discovered() {
    let fake = fake();
    fake.add_group(10, "team/backend/libs");
    fake.add_project("team/backend/libs/core");
    let (ctx, _log) = context(&fake, full_config(GROUP), false);
    let outcome = reconcile::sync(&ctx).unwrap();
    assert_eq!(outcome.projects.len(), 3);
}

#[test]
fn discovery_follows_pages() {
    let fake = Arc::new(
        FakeGitLab::new("team", &["a", "b", "c", "d", "e"]).with_page_size(2),
    );
    let (ctx, _log) = context(&fake, full_config("team"), true);
    let outcome = reconcile::sync(&ctx).unwrap();
    assert_eq!(outcome.projects.len(), 5);
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

#[test]
fn master_default_branch_is_never_created() {
    let fake = fake();
    let mut config = full_config(GROUP);
    config.project_settings = Some(GeneralSettings {
        default_branch: Some("master".to_string()),
        ..GeneralSettings::default()
    });
    let (ctx, _log) = context(&fake, config, false);
    reconcile::sync(&ctx).unwrap();

    assert!(
        !fake
            .mutations()
            .iter()
            .any(|m| m.starts_with("create_branch"))
    );
}

#[test]
fn existing_protection_is_replaced() {
    let fake = fake();
    let alpha = fake.project_id("team/backend/alpha");
    fake.protect_branch(alpha, "main", AccessLevel::Developer, AccessLevel::Developer)
        .unwrap();

    let (ctx, _log) = context(&fake, full_config(GROUP), false);
    reconcile::sync(&ctx).unwrap();

    let rule = &fake.protections(alpha)["main"];
    assert_eq!(rule.push_access_level, AccessLevel::Maintainer);
}

// ---------------------------------------------------------------------------
// Group resolution
// ---------------------------------------------------------------------------

#[test]
fn nested_group_uses_one_lookup_per_segment() {
    let fake = Arc::new(FakeGitLab::new("org/team/backend", &["api"]));
    let (ctx, _log) = context(&fake, full_config("org/team/backend"), true);
    reconcile::sync(&ctx).unwrap();

    assert_eq!(
        fake.reads(),
        [
            "get_group org",
            "list_subgroups 1 page 1",
            "list_subgroups 2 page 1",
        ]
    );
}

#[test]
fn missing_subgroup_fails_the_run() {
    let fake = fake();
    let (ctx, _log) = context(&fake, full_config("team/frontend"), false);
    let err = reconcile::sync(&ctx).unwrap_err();
    assert!(matches!(err, EnforcerError::Match { .. }));
    assert!(fake.mutations().is_empty());
}

#[test]
fn missing_base_group_is_not_found() {
    let fake = fake();
    let (ctx, _log) = context(&fake, full_config("nobody"), false);
    let err = reconcile::sync(&ctx).unwrap_err();
    assert!(matches!(err, EnforcerError::NotFound(_)));
}
