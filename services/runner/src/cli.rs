use crate::runner::{run_backfill, run_scan, run_schedule};
use crate::watch::run_watch;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use luach_alerts::config::AppConfig;
use luach_alerts::error::AppError;
use luach_alerts::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "luach-alerts",
    about = "Send birthday, Hebrew birthday and anniversary notifications from a contact sheet",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the contact sheet and send today's notifications (default command)
    Scan(ScanArgs),
    /// Convert Gregorian birth dates into cached Hebrew dates
    Backfill(BackfillArgs),
    /// Manage the daily trigger
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
    /// Stay in the foreground and scan whenever the daily trigger fires
    Watch(WatchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ScanArgs {
    /// Evaluate as if today were this date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Log notifications instead of sending them; the sheet is left untouched
    #[arg(long)]
    pub(crate) dry_run: bool,
    /// Contact sheet to read instead of the configured one
    #[arg(long)]
    pub(crate) contacts: Option<PathBuf>,
    /// Skip Hebrew birthday matching (no calls to the conversion service)
    #[arg(long)]
    pub(crate) no_hebrew: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct BackfillArgs {
    /// Re-convert rows that already have a cached Hebrew date
    #[arg(long)]
    pub(crate) force: bool,
    /// Contact sheet to update instead of the configured one
    #[arg(long)]
    pub(crate) contacts: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ScheduleCommand {
    /// Replace any registered triggers with one daily trigger
    Install(InstallArgs),
    /// Remove every registered trigger
    Clear,
    /// List registered triggers and the next firing
    Show,
}

#[derive(Args, Debug, Default)]
pub(crate) struct InstallArgs {
    /// Hour of day (0-23, local time); defaults to LUACH_SCHEDULE_HOUR
    #[arg(long)]
    pub(crate) hour: Option<u32>,
    /// Minute (0-59); defaults to LUACH_SCHEDULE_MINUTE
    #[arg(long)]
    pub(crate) minute: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct WatchArgs {
    /// Log notifications instead of sending them
    #[arg(long)]
    pub(crate) dry_run: bool,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Scan(ScanArgs::default()));

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Scan(args) => run_scan(&config, args),
        Command::Backfill(args) => run_backfill(&config, args),
        Command::Schedule { command } => run_schedule(&config, command),
        Command::Watch(args) => run_watch(&config, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    #[test]
    fn no_subcommand_means_scan() {
        assert!(parse(&["luach-alerts"]).command.is_none());
    }

    #[test]
    fn scan_flags() {
        let cli = parse(&[
            "luach-alerts",
            "scan",
            "--today",
            "2024-03-01",
            "--dry-run",
            "--contacts",
            "family.csv",
            "--no-hebrew",
        ]);
        let Some(Command::Scan(args)) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.today, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(args.dry_run);
        assert!(args.no_hebrew);
        assert_eq!(args.contacts, Some(PathBuf::from("family.csv")));
    }

    #[test]
    fn rejects_malformed_today() {
        assert!(Cli::try_parse_from(["luach-alerts", "scan", "--today", "01/03/2024"]).is_err());
    }

    #[test]
    fn schedule_install_overrides() {
        let cli = parse(&["luach-alerts", "schedule", "install", "--hour", "7", "--minute", "30"]);
        let Some(Command::Schedule {
            command: ScheduleCommand::Install(args),
        }) = cli.command
        else {
            panic!("expected schedule install");
        };
        assert_eq!((args.hour, args.minute), (Some(7), Some(30)));
    }

    #[test]
    fn backfill_force() {
        let cli = parse(&["luach-alerts", "backfill", "--force"]);
        assert!(matches!(
            cli.command,
            Some(Command::Backfill(BackfillArgs { force: true, .. }))
        ));
    }
}
