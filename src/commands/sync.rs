//! Command: reconcile every project under the configured group.
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::config::Environment;
use crate::gitlab::HttpClient;
use crate::logging::{Log, Logger};
use crate::reconcile::{self, Context};

/// Run the sync command.
///
/// The change report goes to stdout; everything else goes through the logger.
///
/// # Errors
///
/// Returns an error if configuration loading, group resolution, or project
/// discovery fails, or if any project failed to reconcile.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("gitlab-enforcer {}", super::version()));

    let setup = CommandSetup::init(global, log)?;
    let env = Environment::from_env(global.endpoint.as_deref())?;
    let client = HttpClient::new(&env.endpoint, &env.token)?;
    log.run_started(&setup.config.group_name, &env.endpoint, global.dry_run);

    let engine_log: Arc<dyn Log> = Arc::<Logger>::clone(log);
    let ctx = Context::new(
        Arc::new(client),
        Arc::new(setup.config),
        engine_log,
        global.dry_run,
    );
    let outcome = reconcile::sync(&ctx)
        .with_context(|| format!("failed to sync group {}", ctx.config.group_name))?;

    if let Some(report) = &outcome.report {
        print_report(report);
    }
    log.print_summary();

    if outcome.failed > 0 {
        anyhow::bail!("{} project(s) failed", outcome.failed);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_report(report: &str) {
    print!("{report}");
}
