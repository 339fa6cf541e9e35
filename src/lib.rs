//! GitLab settings enforcer.
//!
//! Reconciles every project under a (possibly nested) GitLab group against a
//! declarative TOML config: default-branch creation, protected-branch rules,
//! general project settings and merge-request approval settings. Each run
//! ends with a change report built from before/after snapshots.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]**: parse and validate the desired-state file
//! - **[`gitlab`]**: the [`gitlab::GitLabApi`] trait and its HTTP client
//! - **[`reconcile`]**: group resolution, project discovery and per-project steps
//! - **[`report`]**: before/after diff and change-log rendering
//! - **[`commands`]**: top-level subcommand orchestration (`sync`, `validate`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gitlab;
pub mod logging;
pub mod reconcile;
pub mod report;
