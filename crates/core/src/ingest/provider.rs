use crate::domain::quote::QuoteRecord;
use anyhow::Result;

/// A quote source queried for one ticker at a time.
///
/// `Ok(None)` means the source had nothing for the ticker. The resolver treats errors the same
/// way, so implementations are free to propagate with `?`.
#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch_quote(&self, ticker: &str) -> Result<Option<QuoteRecord>>;
}
