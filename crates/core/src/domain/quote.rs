use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const NO_DATA: &str = "no_data";

/// One resolved ticker. Serialized untagged: the JSON shape alone identifies the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuoteRecord {
    Primary(PrimaryQuote),
    Fallback(FallbackQuote),
    Error(NoDataQuote),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimarySource {
    Yahoo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackSource {
    Investing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorMarker {
    #[serde(rename = "no_data")]
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryQuote {
    pub source: PrimarySource,
    pub ticker: String,
    #[serde(with = "crate::time::iso::naive")]
    pub ts: NaiveDateTime,
    pub close: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
    pub history: Vec<HistoryBar>,
    pub info: QuoteInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackQuote {
    pub source: FallbackSource,
    pub ticker: String,
    #[serde(with = "crate::time::iso::naive")]
    pub ts: NaiveDateTime,
    pub close: Option<f64>,
    pub info: EmptyInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoDataQuote {
    pub ticker: String,
    #[serde(with = "crate::time::iso::naive")]
    pub ts: NaiveDateTime,
    pub error: ErrorMarker,
}

/// Daily bar as reported by the primary source. Keys follow the provider's column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryBar {
    #[serde(rename = "Date", with = "crate::time::iso::naive")]
    pub date: NaiveDateTime,
    #[serde(rename = "Open")]
    pub open: Option<f64>,
    #[serde(rename = "High")]
    pub high: Option<f64>,
    #[serde(rename = "Low")]
    pub low: Option<f64>,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume", default)]
    pub volume: u64,
    #[serde(rename = "Dividends", default)]
    pub dividends: f64,
    #[serde(rename = "Stock Splits", default)]
    pub stock_splits: f64,
}

/// Descriptive metadata. Both keys are always present; absent values serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteInfo {
    #[serde(rename = "shortName", default)]
    pub short_name: Option<String>,
    #[serde(rename = "marketCap", default)]
    pub market_cap: Option<i64>,
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyInfo {}

impl QuoteRecord {
    pub fn no_data(ticker: impl Into<String>, ts: NaiveDateTime) -> Self {
        Self::Error(NoDataQuote {
            ticker: ticker.into(),
            ts,
            error: ErrorMarker::NoData,
        })
    }

    pub fn ticker(&self) -> &str {
        match self {
            Self::Primary(q) => &q.ticker,
            Self::Fallback(q) => &q.ticker,
            Self::Error(q) => &q.ticker,
        }
    }

    /// `yahoo`, `investing`, or `no_data`.
    pub fn source_label(&self) -> &'static str {
        match self {
            Self::Primary(_) => "yahoo",
            Self::Fallback(_) => "investing",
            Self::Error(_) => NO_DATA,
        }
    }
}
