use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use ledgerbridge::clients::{SplitwiseClient, YnabClient};
use ledgerbridge::config::{BridgePaths, SettingsArgs, SyncSettings};
use ledgerbridge::display::format_run_summary;
use ledgerbridge::journal::{RunEntry, RunJournal};
use ledgerbridge::logging::init_tracing;
use ledgerbridge::storage::{JsonStateStore, RunLock};
use ledgerbridge::sync::{SyncCoordinator, SystemClock, TimeWindowResolver, TransactionTranslator};
use ledgerbridge::SyncError;

#[derive(Parser)]
#[command(
    name = "ledgerbridge",
    version,
    about = "Two-way sync between Splitwise and YNAB",
    long_about = "ledgerbridge copies expenses you share in Splitwise into a YNAB \
                  account, and splits flagged YNAB transactions 50/50 into a \
                  Splitwise group. Each invocation performs one sync run; schedule \
                  it with cron or a systemd timer."
)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Print the last N runs from the run journal instead of syncing
    #[arg(long, value_name = "N")]
    history: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = err
                .downcast_ref::<SyncError>()
                .map_or(1, SyncError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    if let Some(count) = cli.history {
        return show_history(&cli.settings, count);
    }

    // Everything is validated before the lock, the state or the network
    let settings = SyncSettings::from_args(cli.settings)?;
    let paths = BridgePaths::resolve(settings.state_dir.as_deref())?;
    paths.ensure_directories()?;

    let lock = RunLock::acquire(paths.lock_file())?;
    let store = JsonStateStore::open(paths.state_file())?;

    let budget = YnabClient::connect(&settings.budget)?;
    let ledger = SplitwiseClient::connect(&settings.ledger, settings.timezone)?;

    let clock = SystemClock;
    let resolver = TimeWindowResolver::new(&store, settings.timezone, &clock);
    let translator = TransactionTranslator::new(budget.account_id(), ledger.group_id());
    let report = SyncCoordinator::new(
        &store,
        &resolver,
        &ledger,
        &budget,
        translator,
        settings.budget.flag_color,
    )
    .run_all();

    let journal = RunJournal::new(paths.journal_file());
    if let Err(e) = journal.append(&RunEntry::from_report(&report)) {
        warn!("Failed to write run journal: {}", e);
    }

    print!("{}", format_run_summary(&report));

    lock.release()?;
    Ok(report.exit_code())
}

fn show_history(args: &SettingsArgs, count: usize) -> Result<u8> {
    let paths = BridgePaths::resolve(args.state_dir.as_deref())?;
    let entries = RunJournal::new(paths.journal_file()).read_recent(count)?;

    if entries.is_empty() {
        println!("No runs recorded yet.");
    }
    for entry in entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(0)
}
