use tickersnap_core::config::Settings;
use tickersnap_core::domain::snapshot::Snapshot;
use tickersnap_core::ingest::investing::InvestingClient;
use tickersnap_core::ingest::tickers::load_tickers;
use tickersnap_core::ingest::yahoo::YahooClient;
use tickersnap_core::ingest::Resolver;

/// One pass over the ticker list. Only a missing ticker file (or a broken client setup) fails
/// the run; per-ticker failures end up as `no_data` items.
pub async fn collect_snapshot(settings: &Settings) -> anyhow::Result<Snapshot> {
    let generated_at = tickersnap_core::time::utc_now_naive();
    let tickers = load_tickers(&settings.tickers_file).await?;

    tracing::info!(
        tickers = tickers.len(),
        file = %settings.tickers_file.display(),
        suffix = %settings.primary_suffix,
        delay_ms = settings.fetch_delay_ms,
        "snapshot run started"
    );

    let http = settings.http_client()?;
    let resolver = Resolver::new(
        Box::new(YahooClient::from_settings(settings, http.clone())),
        Box::new(InvestingClient::from_settings(settings, http)),
        settings.primary_suffix.clone(),
        settings.politeness_delay(),
    );

    let (items, stats) = resolver.resolve_all(&tickers).await;
    tracing::info!(
        items = items.len(),
        primary = stats.primary,
        fallback = stats.fallback,
        errors = stats.errors,
        "snapshot run finished"
    );

    Ok(Snapshot::new(generated_at, items))
}
