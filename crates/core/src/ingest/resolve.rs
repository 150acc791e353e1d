use crate::domain::quote::QuoteRecord;
use crate::ingest::error::FetchError;
use crate::ingest::provider::QuoteSource;
use crate::time::utc_now_naive;
use std::time::Duration;

/// Per-run tally of how each ticker was resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub primary: usize,
    pub fallback: usize,
    pub errors: usize,
}

impl RunStats {
    fn record(&mut self, rec: &QuoteRecord) {
        match rec {
            QuoteRecord::Primary(_) => self.primary += 1,
            QuoteRecord::Fallback(_) => self.fallback += 1,
            QuoteRecord::Error(_) => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.primary + self.fallback + self.errors
    }
}

/// Resolves tickers one at a time: primary for suffixed symbols, then the fallback with the
/// suffix stripped, then a `no_data` record. Sleeps `delay` after every ticker.
pub struct Resolver {
    primary: Box<dyn QuoteSource>,
    fallback: Box<dyn QuoteSource>,
    suffix: String,
    delay: Duration,
}

impl Resolver {
    pub fn new(
        primary: Box<dyn QuoteSource>,
        fallback: Box<dyn QuoteSource>,
        suffix: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            suffix: suffix.into(),
            delay,
        }
    }

    pub async fn resolve_one(&self, ticker: &str) -> QuoteRecord {
        let mut data = None;

        if !self.suffix.is_empty() && ticker.ends_with(&self.suffix) {
            data = attempt(self.primary.as_ref(), ticker).await;
        }

        if data.is_none() {
            let symbol = strip_suffix(ticker, &self.suffix);
            data = attempt(self.fallback.as_ref(), symbol).await;
        }

        data.unwrap_or_else(|| QuoteRecord::no_data(ticker, utc_now_naive()))
    }

    /// One record per input ticker, in input order. Never fails: a ticker nobody could
    /// resolve becomes a `no_data` record.
    pub async fn resolve_all(&self, tickers: &[String]) -> (Vec<QuoteRecord>, RunStats) {
        let total = tickers.len();
        let mut items = Vec::with_capacity(total);
        let mut stats = RunStats::default();

        for (idx, ticker) in tickers.iter().enumerate() {
            let rec = self.resolve_one(ticker).await;
            stats.record(&rec);
            tracing::info!(
                processed = idx + 1,
                total,
                %ticker,
                source = rec.source_label(),
                "ticker resolved"
            );
            items.push(rec);

            // Politeness toward upstreams, not rate limiting.
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        (items, stats)
    }
}

/// Masks every failure of `source` as "no data".
async fn attempt(source: &dyn QuoteSource, ticker: &str) -> Option<QuoteRecord> {
    match source.fetch_quote(ticker).await {
        Ok(Some(rec)) => Some(rec),
        Ok(None) => {
            tracing::debug!(source = source.source_name(), %ticker, "no data from source");
            None
        }
        Err(err) => {
            let stage = err
                .chain()
                .find_map(|e| e.downcast_ref::<FetchError>())
                .map(|diag| diag.stage)
                .unwrap_or("request");
            tracing::debug!(
                source = source.source_name(),
                %ticker,
                stage,
                error = %err,
                "source fetch failed; treating as no data"
            );
            None
        }
    }
}

/// `ticker` without a trailing `suffix`; unchanged when it does not end with one.
pub fn strip_suffix<'a>(ticker: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return ticker;
    }
    ticker.strip_suffix(suffix).unwrap_or(ticker)
}
