//! Wire shapes of the Yahoo Finance chart (v8) and quote (v7) endpoints.
//! Every field is optional; a missing key degrades to "absent", never to a parse failure.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub chart: Option<ChartNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartNode {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: Option<ChartMeta>,
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    #[serde(default)]
    pub indicators: Option<Indicators>,
    #[serde(default)]
    pub events: Option<ChartEvents>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartMeta {
    #[serde(default, rename = "shortName")]
    pub short_name: Option<String>,
    #[serde(default, rename = "longName")]
    pub long_name: Option<String>,
    #[serde(default)]
    pub gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteBlock {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartEvents {
    #[serde(default)]
    pub dividends: Option<BTreeMap<String, DividendEvent>>,
    #[serde(default)]
    pub splits: Option<BTreeMap<String, SplitEvent>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DividendEvent {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub date: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SplitEvent {
    #[serde(default)]
    pub numerator: Option<f64>,
    #[serde(default)]
    pub denominator: Option<f64>,
    #[serde(default)]
    pub date: Option<i64>,
}

impl SplitEvent {
    pub fn ratio(&self) -> Option<f64> {
        match (self.numerator, self.denominator) {
            (Some(n), Some(d)) if d != 0.0 => Some(n / d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteEnvelope {
    #[serde(default, rename = "quoteResponse")]
    pub quote_response: Option<QuoteResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    #[serde(default)]
    pub result: Vec<QuoteNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteNode {
    #[serde(default, rename = "shortName")]
    pub short_name: Option<String>,
    #[serde(default, rename = "marketCap")]
    pub market_cap: Option<Value>,
}

impl QuoteNode {
    /// Yahoo sends market cap as an integer, occasionally as a float or `{"raw": ..}`.
    pub fn market_cap_value(&self) -> Option<i64> {
        let v = self.market_cap.as_ref()?;
        let v = v.get("raw").unwrap_or(v);
        if let Some(i) = v.as_i64() {
            return Some(i);
        }
        v.as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.round() as i64)
    }
}
