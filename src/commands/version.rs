//! Command: print version information.

/// Print the enforcer version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("gitlab-enforcer {}", super::version());
}
