//! Investing.com fallback: keyword search, follow the first hit, read the displayed price.
//!
//! This scrapes public HTML with structural selectors. Any markup change on the site can make
//! it silently return nothing; that is an accepted limitation of the fallback, not a bug.

use crate::config::Settings;
use crate::domain::quote::{EmptyInfo, FallbackQuote, FallbackSource, QuoteRecord};
use crate::ingest::error::FetchError;
use crate::ingest::provider::QuoteSource;
use crate::time::utc_now_naive;
use anyhow::{Context, Result};
use reqwest::Url;
use scraper::{Html, Selector};

const PROVIDER: &str = "investing";

const SEARCH_RESULT_SELECTOR: &str = "a.js-searchResultItem";
// Tried in order; the first selector that matches anything wins.
const PRICE_SELECTORS: [&str; 2] = ["span[class*=\"text-\"]", "span#last_last"];

#[derive(Debug, Clone)]
pub struct InvestingClient {
    http: reqwest::Client,
    base_url: String,
}

impl InvestingClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings, http: reqwest::Client) -> Self {
        Self::new(http, settings.investing_base_url.clone())
    }

    fn base(&self) -> Result<Url> {
        let base = format!("{}/", self.base_url.trim_end_matches('/'));
        Url::parse(&base).with_context(|| format!("invalid investing base URL: {}", self.base_url))
    }

    async fn get_html(&self, url: Url, stage: &'static str) -> Result<String> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("investing {stage} request failed"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read investing {stage} response"))?;
        if !status.is_success() {
            return Err(FetchError::new(PROVIDER, "http", format!("{stage} HTTP {status}")).into());
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl QuoteSource for InvestingClient {
    fn source_name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Option<QuoteRecord>> {
        let base = self.base()?;

        let mut search_url = base.join("search/").context("invalid investing search URL")?;
        search_url.query_pairs_mut().append_pair("q", symbol);
        let search_html = self.get_html(search_url, "search").await?;

        let Some(href) = first_result_href(&search_html)? else {
            return Ok(None);
        };
        let page_url = base
            .join(&href)
            .with_context(|| format!("invalid instrument link: {href}"))?;

        let page_html = self.get_html(page_url, "instrument").await?;
        let close = extract_price(&page_html)?;

        Ok(Some(QuoteRecord::Fallback(FallbackQuote {
            source: FallbackSource::Investing,
            ticker: symbol.to_string(),
            ts: utc_now_naive(),
            close,
            info: EmptyInfo::default(),
        })))
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow::anyhow!("invalid selector {css}: {err}"))
}

/// `href` of the first search hit, if the results list rendered one.
fn first_result_href(html: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let sel = selector(SEARCH_RESULT_SELECTOR)?;
    Ok(document
        .select(&sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string))
}

/// `Ok(None)` when no price element exists; an error when one exists but is not a number.
fn extract_price(html: &str) -> Result<Option<f64>> {
    let document = Html::parse_document(html);
    for css in PRICE_SELECTORS {
        let sel = selector(css)?;
        if let Some(el) = document.select(&sel).next() {
            let text = el.text().collect::<String>();
            return parse_price(&text).map(Some);
        }
    }
    Ok(None)
}

fn parse_price(text: &str) -> Result<f64> {
    let cleaned = text.trim().replace(',', "");
    cleaned.parse::<f64>().map_err(|_| {
        FetchError::new(PROVIDER, "price", format!("non-numeric price text: {text:?}")).into()
    })
}
