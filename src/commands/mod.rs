//! Top-level subcommand orchestration.
pub mod sync;
pub mod validate;
pub mod version;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::validation::ValidationWarning;
use crate::config::{self, Config};
use crate::logging::Logger;

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// The loaded and validated desired state.
    pub config: Config,
    /// Advisory findings about the config.
    pub warnings: Vec<ValidationWarning>,
}

impl CommandSetup {
    /// Resolve the config path, then load, validate and lint the config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it fails
    /// a hard validation rule.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let path = config::resolve_config_path(global.config.as_deref());

        log.stage("Loading configuration");
        let config = Config::load(&path)
            .with_context(|| format!("failed to load {}", path.display()))?;

        log.info(&format!("group: {}", config.group_name));
        log.debug(&format!(
            "{} protected branch rule(s)",
            config.protected_branches.len()
        ));
        log.debug(&format!(
            "{} whitelisted, {} blacklisted project(s)",
            config.project_whitelist.len(),
            config.project_blacklist.len()
        ));

        let warnings = config.warnings();
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        Ok(Self { config, warnings })
    }
}

/// Version string baked in at build time.
#[must_use]
pub fn version() -> &'static str {
    option_env!("ENFORCER_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}
