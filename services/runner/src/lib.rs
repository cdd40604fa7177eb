mod cli;
mod infra;
mod runner;
mod watch;

use luach_alerts::error::AppError;

/// Entry point for the `luach-alerts` binary. Adapters own their tokio
/// runtimes, so this must not be called from inside one.
pub fn run() -> Result<(), AppError> {
    cli::run()
}
