use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod ingest;

#[derive(Debug, Parser)]
#[command(name = "tickersnap_worker")]
struct Args {
    /// Ticker list, one symbol per line. Overrides TICKERS_FILE.
    #[arg(long)]
    tickers_file: Option<PathBuf>,

    /// Snapshot destination. Overrides OUTPUT_PATH.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pause between tickers in milliseconds. Overrides FETCH_DELAY_MS.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Fetch everything but do not write the snapshot.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = tickersnap_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Some(path) = args.tickers_file {
        settings.tickers_file = path;
    }
    if let Some(path) = args.output {
        settings.output_path = path;
    }
    if let Some(ms) = args.delay_ms {
        settings.fetch_delay_ms = ms;
    }

    match run(&settings, args.dry_run).await {
        Ok(()) => Ok(()),
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "snapshot run failed");
            Err(err)
        }
    }
}

async fn run(settings: &tickersnap_core::config::Settings, dry_run: bool) -> anyhow::Result<()> {
    let snapshot = ingest::collect_snapshot(settings).await?;

    if dry_run {
        tracing::info!(
            items = snapshot.items.len(),
            dry_run = true,
            output = %settings.output_path.display(),
            "snapshot not written (dry-run)"
        );
        return Ok(());
    }

    tickersnap_core::storage::write_snapshot(&settings.output_path, &snapshot).await?;
    println!("Wrote {}", settings.output_path.display());
    Ok(())
}

fn init_sentry(settings: &tickersnap_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
