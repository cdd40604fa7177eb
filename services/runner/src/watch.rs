use crate::cli::WatchArgs;
use crate::infra::schedule_manager;
use crate::runner::scan_once;
use chrono::{Local, NaiveDateTime};
use luach_alerts::config::AppConfig;
use luach_alerts::error::AppError;
use luach_alerts::schedule::{ScheduleManager, TriggerRegistry, DAILY_SCAN_JOB};
use std::thread;
use std::time::Duration;
use tracing::{error, info};

/// Runs the scan each time the earliest registered trigger comes due.
/// Never returns unless the trigger registry fails.
pub(crate) fn run_watch(config: &AppConfig, args: WatchArgs) -> Result<(), AppError> {
    let manager = schedule_manager(config);
    if manager.triggers()?.is_empty() {
        manager.ensure_daily_schedule(
            DAILY_SCAN_JOB,
            config.schedule.hour,
            config.schedule.minute,
        )?;
    }

    loop {
        let now = Local::now().naive_local();
        let Some((at, wait)) = next_wait(&manager, now)? else {
            // Cleared from another process; install the configured default again.
            manager.ensure_daily_schedule(
                DAILY_SCAN_JOB,
                config.schedule.hour,
                config.schedule.minute,
            )?;
            continue;
        };

        info!(next_run = %at.format("%Y-%m-%d %H:%M"), "waiting for daily trigger");
        thread::sleep(wait);

        let today = Local::now().date_naive();
        if let Err(err) = scan_once(config, today, None, args.dry_run, true) {
            error!(%today, error = %err, "scheduled scan failed");
        }
    }
}

/// Next firing and how long to sleep until it.
pub(crate) fn next_wait<R: TriggerRegistry>(
    manager: &ScheduleManager<R>,
    now: NaiveDateTime,
) -> Result<Option<(NaiveDateTime, Duration)>, AppError> {
    let next = manager.next_due(now)?.map(|(_, at)| {
        let wait = (at - now).to_std().unwrap_or_default();
        (at, wait)
    });
    Ok(next)
}
