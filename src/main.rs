mod analytics;
mod analytics_paths;
mod api;
mod config;
mod credentials;
mod error;
mod run_log;

use analytics::detail_source::FetchProgress;
use analytics::{
    run_fetch, summarize, BatchDetailSource, DetailSource, FetchContext, IndividualDetailSource,
    RunEvent, RunOutcome, RunReport, SaveOutcome, SnapshotStore, ThreadPacer,
};
use anyhow::Result;
use api::UreqTransport;
use clap::{Args, Parser, Subcommand};
use config::{FetchConfig, FetchStrategy};
use credentials::Credentials;
use run_log::RunLogger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pixiv-analytics")]
#[command(about = "Snapshot the view, bookmark and comment counts of your pixiv works")]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PIXIV_ANALYTICS_GIT_SHA"), ")"))]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all works and append a snapshot (the default)
    Fetch(FetchArgs),
    /// Print one summary line per saved snapshot
    History(HistoryArgs),
}

#[derive(Args, Clone, Default)]
struct FetchArgs {
    /// Detail retrieval strategy (overrides the config file)
    #[arg(long, value_enum)]
    strategy: Option<FetchStrategy>,

    /// Config file (defaults to ~/.pixiv-analytics/config.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// History file to append to
    #[arg(long)]
    history: Option<PathBuf>,

    /// Skip follower statistics
    #[arg(long)]
    no_stats: bool,

    /// Skip the login probe
    #[arg(long)]
    no_login_check: bool,
}

#[derive(Args, Clone, Default)]
struct HistoryArgs {
    /// Config file used to locate the history
    #[arg(long)]
    config: Option<PathBuf>,

    /// History file to read
    #[arg(long)]
    history: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::History(args)) => run_history(args),
        Some(Command::Fetch(args)) => run_fetch_command(args),
        None => run_fetch_command(cli.fetch),
    };

    if let Err(err) = result {
        eprintln!("[pixiv-analytics] Error: {:#}", err);
        std::process::exit(error::exit_code_for(&err));
    }
}

fn resolve_config(args: &FetchArgs) -> Result<FetchConfig> {
    let mut config = FetchConfig::resolve(args.config.as_deref())?;
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if let Some(history) = &args.history {
        config.history_path = history.clone();
    }
    if args.no_stats {
        config.include_stats = false;
    }
    if args.no_login_check {
        config.check_login = false;
    }
    config.validate()?;
    Ok(config)
}

fn open_run_logger(config: &FetchConfig) -> Option<RunLogger> {
    let logs_dir = match &config.log_dir {
        Some(dir) => Ok(dir.clone()),
        None => analytics_paths::logs_dir(),
    };
    match logs_dir.and_then(|dir| RunLogger::new(&run_log::new_run_id(), &dir)) {
        Ok(logger) => Some(logger),
        Err(e) => {
            eprintln!("[pixiv-analytics] Warning: run log disabled: {}", e);
            None
        }
    }
}

fn build_detail_source(
    config: &FetchConfig,
    credentials: &Credentials,
) -> Box<dyn DetailSource> {
    match config.strategy {
        FetchStrategy::Batch => Box::new(BatchDetailSource::new(
            credentials.account_id().clone(),
            config.batch_size,
            config.batch_delay(),
            Box::new(ThreadPacer),
        )),
        FetchStrategy::Individual => Box::new(IndividualDetailSource::new(
            config.individual_delay(),
            config.progress_every,
            Box::new(ThreadPacer),
        )),
    }
}

fn print_event(event: RunEvent) {
    match event {
        RunEvent::Login(status) => println!("[pixiv-analytics] Session: {}", status),
        RunEvent::Stats(Some(stats)) => println!(
            "[pixiv-analytics] Followers: {}  following: {}  mypixiv: {}",
            stats.followers, stats.following, stats.mypixiv
        ),
        RunEvent::Stats(None) => println!("[pixiv-analytics] Account stats unavailable"),
        RunEvent::Enumerated { count } => println!("[pixiv-analytics] Found {} works", count),
        RunEvent::Progress(FetchProgress {
            fetched,
            processed,
            total,
        }) => println!(
            "[pixiv-analytics] Progress: {}/{} processed, {} fetched",
            processed, total, fetched
        ),
    }
}

fn print_report(report: &RunReport) {
    for skipped in &report.skipped {
        eprintln!(
            "[pixiv-analytics] Skipped {}: {}",
            skipped.ids.join(","),
            skipped.reason
        );
    }
    println!(
        "[pixiv-analytics] Fetched {} of {} works ({} skipped entries)",
        report.fetched,
        report.enumerated,
        report.skipped.len()
    );

    match &report.outcome {
        RunOutcome::NothingFetched | RunOutcome::Saved(SaveOutcome::Skipped) => {
            println!("[pixiv-analytics] Nothing fetched; history unchanged")
        }
        RunOutcome::Saved(SaveOutcome::Saved {
            path,
            total_snapshots,
            recovered_from,
        }) => {
            if let Some(err) = recovered_from {
                eprintln!("[pixiv-analytics] Warning: {}; started a new history", err);
            }
            println!(
                "[pixiv-analytics] Saved snapshot to {} ({} snapshots total)",
                path.display(),
                total_snapshots
            );
        }
    }
}

fn run_fetch_command(args: FetchArgs) -> Result<()> {
    let credentials = Credentials::from_env()?;
    let config = resolve_config(&args)?;
    println!(
        "[pixiv-analytics] Account {} ({} strategy)",
        credentials.account_id(),
        config.strategy
    );

    let transport = UreqTransport::new(&credentials, &config.base_url, config.timeout());
    let detail_source = build_detail_source(&config, &credentials);
    let store = SnapshotStore::new(&config.history_path);
    let logger = open_run_logger(&config);
    if let Some(logger) = &logger {
        logger.log_phase("start", &format!("account {}", credentials.account_id()));
    }

    let ctx = FetchContext {
        transport: &transport,
        account_id: credentials.account_id(),
        detail_source: detail_source.as_ref(),
        store: &store,
        check_login: config.check_login,
        include_stats: config.include_stats,
        logger: logger.as_ref(),
    };

    let report = run_fetch(&ctx, &mut print_event)?;
    print_report(&report);
    if let Some(logger) = &logger {
        println!("[pixiv-analytics] Run log: {}", logger.path().display());
    }
    Ok(())
}

fn run_history(args: HistoryArgs) -> Result<()> {
    let config = resolve_config(&FetchArgs {
        config: args.config,
        history: args.history,
        ..FetchArgs::default()
    })?;
    let store = SnapshotStore::new(&config.history_path);
    let loaded = store.load()?;

    if let Some(err) = &loaded.recovered_from {
        eprintln!("[pixiv-analytics] Warning: {}", err);
    }
    if loaded.unreadable > 0 {
        eprintln!(
            "[pixiv-analytics] Warning: {} snapshot entries could not be read and are not listed",
            loaded.unreadable
        );
    }
    if loaded.snapshots.is_empty() {
        println!(
            "[pixiv-analytics] No snapshots in {}",
            store.path().display()
        );
        return Ok(());
    }

    for row in summarize(&loaded.snapshots) {
        println!("{}", row);
    }
    Ok(())
}
