//! gpie - Google Drive picture frame
//!
//! Mirrors a Drive folder into a local checksum-addressed cache and shows the
//! cached images as a framebuffer slideshow, refreshing on a fixed interval.

mod cache;
mod config;
mod display;
mod drive;
mod remote;
mod scheduler;
mod sync;

use anyhow::{anyhow, Context, Result};
use std::env;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use cache::CacheStore;
use config::Config;
use display::FbiDisplay;
use drive::DriveConnector;
use scheduler::{IntervalTicker, Scheduler};
use sync::SyncEngine;

/// CLI command
#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// Sync and run the slideshow forever (default)
    Run,
    /// Run a single sync cycle and print the report
    Sync,
    /// Show help
    Help,
}

fn print_help() {
    eprintln!(
        r#"gpie - Show a Google Drive folder as a framebuffer slideshow

USAGE:
    gpie            # Sync and run the slideshow (default)
    gpie run
    gpie sync
    gpie help

COMMANDS:
    run     Sync the folder, start fbi, refresh every interval
    sync    Run one sync cycle, print what happened, exit
    help    Show this help message

ENVIRONMENT:
    GPIE_ACCESS_TOKEN          OAuth bearer token for the Drive API
    GPIE_ACCESS_TOKEN_FILE     File holding the token, re-read every cycle
    GPIE_FOLDER_ID             Drive folder to show
    GPIE_CACHE_DIR             Local cache directory (default: ./images)
    GPIE_REFRESH_SECS          Seconds between refreshes (default: 300)
    GPIE_RECONCILE             missing (default) or present
    GPIE_DISPLAY_PROGRAM       Viewer executable (default: fbi)
    GPIE_SLIDE_SECS            Seconds per image (default: 8)
    GPIE_CONSOLE               Virtual console for fbi, or "none" (default: 1)
    GPIE_REQUEST_TIMEOUT_SECS  HTTP timeout (default: 60)
    RUST_LOG                   Log level (trace, debug, info, warn, error)
"#
    );
}

fn parse_args(args: &[String]) -> Command {
    match args.get(1).map(String::as_str) {
        None | Some("run") => Command::Run,
        Some("sync") => Command::Sync,
        Some("help" | "--help" | "-h") => Command::Help,
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            Command::Help
        }
    }
}

/// Open the cache and wire the Drive connector into a sync engine
fn build_engine(config: &Config) -> Result<SyncEngine> {
    let credentials = config
        .credentials
        .clone()
        .ok_or_else(|| anyhow!("No Drive credentials: set GPIE_ACCESS_TOKEN or GPIE_ACCESS_TOKEN_FILE"))?;

    let cache = CacheStore::open(&config.cache_dir).context("Unable to create image dir")?;
    let connector = DriveConnector::new(credentials, config.request_timeout);

    Ok(SyncEngine::new(
        Arc::new(connector),
        cache,
        config.folder_id.clone(),
        config.policy,
    ))
}

async fn run(config: Config) -> Result<()> {
    let engine = build_engine(&config)?;
    let cache_dir = engine.cache().cache_dir().display().to_string();
    let display = FbiDisplay::new(config.display.clone());
    let ticker = IntervalTicker::new(config.refresh_interval);
    let mut scheduler = Scheduler::new(engine, display, ticker);

    info!(
        folder = %config.folder_id,
        cache_dir = %cache_dir,
        interval_secs = config.refresh_interval.as_secs(),
        policy = %config.policy,
        "Starting slideshow daemon"
    );

    let result = tokio::select! {
        result = scheduler.run() => result.map_err(anyhow::Error::from),
        _ = shutdown_signal() => {
            info!("Received shutdown signal, stopping slideshow...");
            Ok(())
        }
    };

    scheduler.shutdown().await;
    info!(
        cycles = scheduler.cycles(),
        state = ?scheduler.state(),
        "Shutdown complete."
    );
    result
}

async fn sync_once(config: Config) -> Result<()> {
    let engine = build_engine(&config)?;
    let report = engine.run_cycle().await?;
    println!("{}", report);
    Ok(())
}

/// Ctrl+C, or SIGTERM from a service manager
///
/// A signal that cannot be registered is logged and never fires.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to register SIGTERM handler");
                ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c().await;
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let log_level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = env::args().collect();
    let command = parse_args(&args);

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            print_help();
            std::process::exit(1);
        }
    };

    let result = match command {
        Command::Run => run(config).await,
        Command::Sync => sync_once(config).await,
        Command::Help => {
            print_help();
            Ok(())
        }
    };

    if let Err(e) = result {
        let message = format!("{:#}", e);
        error!(error = %message, "Fatal error");
        return Err(e);
    }

    Ok(())
}
