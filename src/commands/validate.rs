//! Command: load and validate the config without contacting GitLab.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::logging::Logger;

/// Run the validate command.
///
/// Warnings are reported but do not fail the command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or violates a hard rule.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let config = &setup.config;

    log.info(&format!(
        "{} protected branch rule(s), project settings: {}, approval settings: {}",
        config.protected_branches.len(),
        section_state(config.project_settings.is_some()),
        section_state(config.approval_settings.is_some()),
    ));

    if setup.warnings.is_empty() {
        log.info("configuration is valid");
    } else {
        log.info(&format!(
            "configuration is valid with {} warning(s)",
            setup.warnings.len()
        ));
    }
    Ok(())
}

const fn section_state(present: bool) -> &'static str {
    if present { "present" } else { "absent" }
}
