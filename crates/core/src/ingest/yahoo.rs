use crate::config::{Settings, DEFAULT_YAHOO_COOKIE_URL, DEFAULT_YAHOO_CRUMB_URL};
use crate::domain::quote::{HistoryBar, PrimaryQuote, PrimarySource, QuoteInfo, QuoteRecord};
use crate::ingest::error::FetchError;
use crate::ingest::provider::QuoteSource;
use crate::ingest::types::{ChartEnvelope, ChartEvents, ChartMeta, ChartResult, QuoteEnvelope};
use crate::time::utc_now_naive;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use reqwest::header::SET_COOKIE;
use reqwest::{StatusCode, Url};
use std::collections::BTreeMap;

const PROVIDER: &str = "yahoo";

const CHART_RANGE: &str = "5d";
const CHART_INTERVAL: &str = "1d";
const CHART_EVENTS: &str = "div|split";

#[derive(Debug)]
pub struct YahooClient {
    http: reqwest::Client,
    chart_base: String,
    quote_base: String,
    cookie_url: String,
    crumb_url: String,
    crumb_cache: tokio::sync::Mutex<Option<String>>,
}

impl YahooClient {
    pub fn new(
        http: reqwest::Client,
        chart_base: impl Into<String>,
        quote_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            chart_base: chart_base.into(),
            quote_base: quote_base.into(),
            cookie_url: DEFAULT_YAHOO_COOKIE_URL.to_string(),
            crumb_url: DEFAULT_YAHOO_CRUMB_URL.to_string(),
            crumb_cache: tokio::sync::Mutex::new(None),
        }
    }

    /// Overrides where the consent cookie and the crumb are obtained.
    pub fn with_session_urls(
        mut self,
        cookie_url: impl Into<String>,
        crumb_url: impl Into<String>,
    ) -> Self {
        self.cookie_url = cookie_url.into();
        self.crumb_url = crumb_url.into();
        self
    }

    /// `http` must keep a cookie store, otherwise the crumb is rejected.
    pub fn from_settings(settings: &Settings, http: reqwest::Client) -> Self {
        Self::new(
            http,
            settings.yahoo_chart_base_url.clone(),
            settings.yahoo_quote_base_url.clone(),
        )
        .with_session_urls(
            settings.yahoo_cookie_url.clone(),
            settings.yahoo_crumb_url.clone(),
        )
    }

    fn chart_url(&self, ticker: &str) -> Result<Url> {
        let mut url = Url::parse(&self.chart_base)
            .with_context(|| format!("invalid chart base URL: {}", self.chart_base))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("chart base URL cannot carry a path: {}", self.chart_base))?
            .pop_if_empty()
            .push(ticker);
        Ok(url)
    }

    async fn fetch_chart(&self, ticker: &str) -> Result<ChartResult> {
        let url = self.chart_url(ticker)?;
        let res = self
            .http
            .get(url)
            .query(&[
                ("range", CHART_RANGE),
                ("interval", CHART_INTERVAL),
                ("events", CHART_EVENTS),
                ("includePrePost", "false"),
            ])
            .send()
            .await
            .context("yahoo chart request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read yahoo chart response")?;
        if !status.is_success() {
            return Err(FetchError::new(PROVIDER, "http", format!("chart HTTP {status}")).into());
        }

        let envelope = serde_json::from_str::<ChartEnvelope>(&text)
            .map_err(|err| FetchError::new(PROVIDER, "parse", err.to_string()))?;
        let node = envelope
            .chart
            .ok_or_else(|| FetchError::new(PROVIDER, "parse", "missing chart node"))?;
        if let Some(err) = node.error {
            return Err(FetchError::new(
                PROVIDER,
                "provider",
                format!("{}: {}", err.code, err.description),
            )
            .into());
        }

        node.result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| FetchError::new(PROVIDER, "empty", "chart has no result").into())
    }

    /// Crumb for the quote endpoint, fetched once per client and reused.
    async fn crumb(&self) -> Result<String> {
        let mut guard = self.crumb_cache.lock().await;
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }

        // The consent host answers with an error status but still sets the session cookie.
        let res = self
            .http
            .get(&self.cookie_url)
            .send()
            .await
            .context("yahoo cookie request failed")?;
        if !res.headers().contains_key(SET_COOKIE) {
            return Err(FetchError::new(PROVIDER, "auth", "no cookie from consent endpoint").into());
        }

        let res = self
            .http
            .get(&self.crumb_url)
            .send()
            .await
            .context("yahoo crumb request failed")?;
        let status = res.status();
        let crumb = res
            .text()
            .await
            .context("failed to read yahoo crumb response")?
            .trim()
            .to_string();
        if !status.is_success() {
            return Err(FetchError::new(PROVIDER, "auth", format!("crumb HTTP {status}")).into());
        }
        if crumb.is_empty() || crumb.contains('{') || crumb.contains('<') {
            return Err(FetchError::new(PROVIDER, "auth", format!("invalid crumb: {crumb}")).into());
        }

        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    /// Best-effort quote lookup for metadata. Never fails the primary record.
    async fn fetch_quote_meta(&self, ticker: &str) -> Result<QuoteInfo> {
        let crumb = self.crumb().await?;
        let res = self
            .http
            .get(&self.quote_base)
            .query(&[("symbols", ticker), ("crumb", crumb.as_str())])
            .send()
            .await
            .context("yahoo quote request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read yahoo quote response")?;
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            // Stale crumb; the next ticker starts a fresh session.
            *self.crumb_cache.lock().await = None;
        }
        if !status.is_success() {
            return Err(FetchError::new(PROVIDER, "http", format!("quote HTTP {status}")).into());
        }

        let envelope = serde_json::from_str::<QuoteEnvelope>(&text)
            .map_err(|err| FetchError::new(PROVIDER, "parse", err.to_string()))?;
        let node = envelope
            .quote_response
            .and_then(|r| r.result.into_iter().next())
            .ok_or_else(|| FetchError::new(PROVIDER, "empty", "quote has no result"))?;

        Ok(QuoteInfo {
            short_name: node.short_name.clone(),
            market_cap: node.market_cap_value(),
        })
    }
}

#[async_trait::async_trait]
impl QuoteSource for YahooClient {
    fn source_name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_quote(&self, ticker: &str) -> Result<Option<QuoteRecord>> {
        let chart = self.fetch_chart(ticker).await?;
        let meta = chart.meta.clone().unwrap_or_default();
        let history = bars_from_chart(&chart);

        let Some(latest) = history.last() else {
            return Ok(None);
        };
        let close = latest.close;
        let (open, high, low, volume) = (latest.open, latest.high, latest.low, latest.volume);

        let quote_meta = match self.fetch_quote_meta(ticker).await {
            Ok(info) => info,
            Err(err) => {
                tracing::debug!(%ticker, error = %err, "yahoo quote metadata unavailable");
                QuoteInfo::default()
            }
        };

        let record = PrimaryQuote {
            source: PrimarySource::Yahoo,
            ticker: ticker.to_string(),
            ts: utc_now_naive(),
            close,
            open: open.unwrap_or(close),
            high: high.unwrap_or(close),
            low: low.unwrap_or(close),
            volume,
            info: merge_info(&meta, quote_meta),
            history,
        };

        Ok(Some(QuoteRecord::Primary(record)))
    }
}

fn merge_info(meta: &ChartMeta, quote: QuoteInfo) -> QuoteInfo {
    QuoteInfo {
        short_name: meta
            .short_name
            .clone()
            .or(quote.short_name)
            .or_else(|| meta.long_name.clone()),
        market_cap: quote.market_cap,
    }
}

/// Zips the chart columns into bars, oldest first. Rows without a close are dropped.
fn bars_from_chart(chart: &ChartResult) -> Vec<HistoryBar> {
    let Some(timestamps) = chart.timestamp.as_deref() else {
        return Vec::new();
    };
    let Some(quote) = chart
        .indicators
        .as_ref()
        .and_then(|ind| ind.quote.first())
    else {
        return Vec::new();
    };

    let offset = chart
        .meta
        .as_ref()
        .and_then(|m| m.gmtoffset)
        .unwrap_or(0);
    let (dividends, splits) = event_maps(chart.events.as_ref(), offset);

    let col = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

    let mut out = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(close) = col(&quote.close, i) else {
            continue;
        };
        let Some(date) = local_date(*ts, offset) else {
            continue;
        };

        out.push(HistoryBar {
            date: midnight(date),
            open: col(&quote.open, i),
            high: col(&quote.high, i),
            low: col(&quote.low, i),
            close,
            volume: col(&quote.volume, i)
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v.round() as u64)
                .unwrap_or(0),
            dividends: dividends.get(&date).copied().unwrap_or(0.0),
            stock_splits: splits.get(&date).copied().unwrap_or(0.0),
        });
    }
    out
}

fn event_maps(
    events: Option<&ChartEvents>,
    offset: i64,
) -> (BTreeMap<NaiveDate, f64>, BTreeMap<NaiveDate, f64>) {
    let mut dividends = BTreeMap::new();
    let mut splits = BTreeMap::new();
    let Some(events) = events else {
        return (dividends, splits);
    };

    for (key, ev) in events.dividends.iter().flatten() {
        let when = ev.date.or_else(|| key.parse().ok());
        if let (Some(date), Some(amount)) = (when.and_then(|t| local_date(t, offset)), ev.amount) {
            *dividends.entry(date).or_insert(0.0) += amount;
        }
    }
    for (key, ev) in events.splits.iter().flatten() {
        let when = ev.date.or_else(|| key.parse().ok());
        if let (Some(date), Some(ratio)) = (when.and_then(|t| local_date(t, offset)), ev.ratio()) {
            splits.insert(date, ratio);
        }
    }
    (dividends, splits)
}

/// Exchange-local calendar date of a chart timestamp.
fn local_date(epoch_secs: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(epoch_secs.checked_add(gmtoffset)?, 0).map(|dt| dt.date_naive())
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
