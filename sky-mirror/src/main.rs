//! sky-mirror - Background daemon for profile mirroring
//!
//! Polls a source profile page on an interval and republishes new posts to
//! the configured Bluesky account, deduplicating via the persisted seen-log.

use clap::Parser;
use libskymirror::fetch::profile::ProfileFetcher;
use libskymirror::publish::create_publisher;
use libskymirror::{Config, Database, MirrorLoop, Result, SeenLogStore, SkymirrorError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sky-mirror")]
#[command(version)]
#[command(about = "Background daemon for profile mirroring")]
#[command(long_about = "\
sky-mirror - Background daemon for profile mirroring

DESCRIPTION:
    sky-mirror is a long-running daemon that polls a source profile page at
    a fixed interval, detects posts it has not mirrored yet, and republishes
    them to the configured Bluesky account in the order they appeared.

    Already-mirrored posts are remembered in a small persisted seen-log, so
    restarts do not repost old content. Fetch and publish failures are
    logged and retried on the next poll; only a failed login is fatal.

USAGE:
    # Run in foreground (logs to stderr)
    sky-mirror

    # Run with custom poll interval
    sky-mirror --poll-interval 60

    # Run one tick and exit
    sky-mirror --once

SIGNALS:
    SIGTERM, SIGINT - Graceful shutdown (finishes the current tick)

CONFIGURATION:
    Configuration file: ~/.config/skymirror/config.toml
    Seen-log location:  ~/.local/share/skymirror/seen.json

    [mirror]
    interval = 300   # seconds between polls
    capacity = 5     # identifiers retained in the seen-log

    [source]
    profile_url = \"https://bsky.app/profile/someone.example\"

    [bluesky]
    handle = \"mirror.bsky.social\"
    password_file = \"~/.config/skymirror/bluesky.password\"

EXIT CODES:
    0 - Clean shutdown
    1 - Runtime error
    2 - Authentication failure
")]
struct Cli {
    /// Poll interval in seconds (overrides config)
    #[arg(long, value_name = "SECONDS")]
    #[arg(help = "How often to poll the source profile (default: from config)")]
    poll_interval: Option<u64>,

    /// Seen-log capacity (overrides config)
    #[arg(long, value_name = "COUNT")]
    #[arg(help = "How many identifiers the seen-log retains")]
    capacity: Option<usize>,

    /// Run one tick and exit (for testing)
    #[arg(long)]
    #[arg(help = "Fetch, publish, and exit after a single tick")]
    once: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    #[arg(help = "Enable verbose logging (useful for debugging)")]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Initialize logging based on verbosity level
///
/// Format and level come from `SKYMIRROR_LOG_FORMAT` / `SKYMIRROR_LOG_LEVEL`;
/// `--verbose` overrides the level to debug.
fn init_logging(verbose: bool) {
    use libskymirror::logging::{LogFormat, LoggingConfig};

    let format = std::env::var("SKYMIRROR_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogFormat::Text);
    let level = std::env::var("SKYMIRROR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    LoggingConfig::new(format, level, verbose).init();
}

/// Set up signal handlers for graceful shutdown
#[cfg(unix)]
fn setup_signal_handlers(shutdown: Arc<AtomicBool>) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])
        .map_err(|e| SkymirrorError::InvalidInput(format!("Signal setup failed: {}", e)))?;

    std::thread::spawn(move || {
        for sig in signals.forever() {
            match sig {
                SIGTERM | SIGINT => {
                    info!("Received shutdown signal, stopping gracefully...");
                    shutdown.store(true, Ordering::Relaxed);
                    break;
                }
                _ => {}
            }
        }
    });

    Ok(())
}

#[cfg(not(unix))]
fn setup_signal_handlers(_shutdown: Arc<AtomicBool>) -> Result<()> {
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    info!("sky-mirror daemon starting");

    let source_config = config.source.as_ref().ok_or_else(|| {
        SkymirrorError::Config(libskymirror::error::ConfigError::MissingField(
            "source".to_string(),
        ))
    })?;

    let fetcher = ProfileFetcher::new(source_config)?;
    let publisher = create_publisher(&config).await?;

    let db = match &config.database {
        Some(db_config) => Some(Database::new(&db_config.path).await?),
        None => None,
    };

    let capacity = cli.capacity.unwrap_or(config.mirror.capacity);
    let store = SeenLogStore::new(&config.mirror.seen_log);
    let mut mirror = MirrorLoop::new(Box::new(fetcher), publisher, store, capacity, db)?;

    if cli.once {
        let published = mirror.run_once().await?;
        info!(published, "sky-mirror: ran one tick, exiting");
        return Ok(());
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    setup_signal_handlers(shutdown.clone())?;

    let interval = Duration::from_secs(cli.poll_interval.unwrap_or(config.mirror.interval));
    info!("Poll interval: {}s", interval.as_secs());

    mirror.start(interval, shutdown).await?;

    info!("sky-mirror daemon stopped");
    Ok(())
}
