use crate::cli::{BackfillArgs, ScanArgs, ScheduleCommand};
use crate::infra::{backfill_service, celebration_service, schedule_manager};
use chrono::{Local, NaiveDate};
use luach_alerts::config::AppConfig;
use luach_alerts::error::AppError;
use luach_alerts::schedule::DAILY_SCAN_JOB;
use luach_alerts::workflows::celebrations::{BackfillSummary, RunSummary, ScanIssue, ScanReport};
use tracing::info;

pub(crate) fn run_scan(config: &AppConfig, args: ScanArgs) -> Result<(), AppError> {
    let ScanArgs {
        today,
        dry_run,
        contacts,
        no_hebrew,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    scan_once(config, today, contacts, dry_run, !no_hebrew)
}

/// One daily scan; delivery failures turn into an error after every event
/// has been attempted.
pub(crate) fn scan_once(
    config: &AppConfig,
    today: NaiveDate,
    contacts: Option<std::path::PathBuf>,
    dry_run: bool,
    hebrew_matching: bool,
) -> Result<(), AppError> {
    let service =
        celebration_service(config, contacts, dry_run)?.with_hebrew_matching(hebrew_matching);

    if dry_run {
        // Preview leaves the sheet untouched; the dispatcher only logs.
        let report = service.preview(today)?;
        for event in &report.events {
            service.dispatcher().dispatch(event)?;
        }
        info!(
            %today,
            events = report.events.len(),
            issues = report.issues.len(),
            "dry run finished"
        );
        for line in preview_lines(today, &report) {
            println!("{line}");
        }
        return Ok(());
    }

    let summary = service.run_daily(today)?;

    info!(
        %today,
        events = summary.events,
        delivered = summary.delivered,
        failed = summary.failures.len(),
        issues = summary.issues.len(),
        "scan finished"
    );
    for line in run_summary_lines(&summary) {
        println!("{line}");
    }

    if summary.failures.is_empty() {
        Ok(())
    } else {
        Err(AppError::Delivery {
            failed: summary.failures.len(),
            attempted: summary.events,
        })
    }
}

pub(crate) fn run_backfill(config: &AppConfig, args: BackfillArgs) -> Result<(), AppError> {
    let summary = backfill_service(config, args.contacts)?.backfill_hebrew_dates(args.force)?;
    for line in backfill_summary_lines(&summary) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn run_schedule(config: &AppConfig, command: ScheduleCommand) -> Result<(), AppError> {
    let manager = schedule_manager(config);

    match command {
        ScheduleCommand::Install(args) => {
            let hour = args.hour.unwrap_or(config.schedule.hour);
            let minute = args.minute.unwrap_or(config.schedule.minute);
            let trigger = manager.ensure_daily_schedule(DAILY_SCAN_JOB, hour, minute)?;
            println!(
                "Daily scan scheduled at {:02}:{:02} (trigger {})",
                trigger.hour, trigger.minute, trigger.id
            );
        }
        ScheduleCommand::Clear => {
            let removed = manager.clear()?;
            println!("Removed {removed} trigger(s)");
        }
        ScheduleCommand::Show => {
            let triggers = manager.triggers()?;
            if triggers.is_empty() {
                println!("No triggers registered");
            }
            for trigger in &triggers {
                println!(
                    "{} {} daily at {:02}:{:02} (created {})",
                    trigger.id,
                    trigger.job,
                    trigger.hour,
                    trigger.minute,
                    trigger.created_at.format("%Y-%m-%d %H:%M UTC")
                );
            }
            if let Some((_, at)) = manager.next_due(Local::now().naive_local())? {
                println!("Next run: {}", at.format("%Y-%m-%d %H:%M"));
            }
        }
    }

    Ok(())
}

pub(crate) fn run_summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Scan for {} (Hebrew date: {})",
        summary.today,
        summary.today_hebrew.as_deref().unwrap_or("unresolved")
    )];
    lines.push(format!(
        "Records: {} | notifications: {} sent of {}",
        summary.records_scanned, summary.delivered, summary.events
    ));
    if summary.events == 0 {
        lines.push("No matches found for today".to_string());
    }
    for failure in &summary.failures {
        lines.push(format!(
            "  failed: row {} {} ({}): {}",
            failure.row, failure.name, failure.kind, failure.error
        ));
    }
    lines.extend(summary.issues.iter().map(issue_line));
    if summary.cache_updates > 0 {
        let state = if summary.cache_persisted {
            "saved"
        } else {
            "not saved"
        };
        lines.push(format!(
            "Hebrew dates cached: {} ({state})",
            summary.cache_updates
        ));
    }
    lines
}

pub(crate) fn preview_lines(today: NaiveDate, report: &ScanReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Dry run for {today} (Hebrew date: {})",
        report.today_hebrew.as_deref().unwrap_or("unresolved")
    )];
    lines.push(format!(
        "Records: {} | notifications due: {}",
        report.records_scanned,
        report.events.len()
    ));
    if report.events.is_empty() {
        lines.push("No matches found for today".to_string());
    }
    for event in &report.events {
        lines.push(format!(
            "  would send: row {} {} ({}, {} years)",
            event.row,
            event.subject_name,
            event.kind(),
            event.computed_years
        ));
    }
    lines.extend(report.issues.iter().map(issue_line));
    if !report.cache_updates.is_empty() {
        lines.push(format!(
            "Hebrew dates resolved but not cached: {}",
            report.cache_updates.len()
        ));
    }
    lines
}

pub(crate) fn backfill_summary_lines(summary: &BackfillSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Converted {} | already cached {} | without birth date {}",
        summary.converted, summary.unchanged, summary.skipped
    )];
    lines.extend(summary.failures.iter().map(issue_line));
    lines
}

fn issue_line(issue: &ScanIssue) -> String {
    match (issue.row, issue.name.as_deref()) {
        (Some(row), Some(name)) => format!("  skipped: row {row} {name}: {}", issue.error),
        (Some(row), None) => format!("  skipped: row {row}: {}", issue.error),
        _ => format!("  warning: {}", issue.error),
    }
}
