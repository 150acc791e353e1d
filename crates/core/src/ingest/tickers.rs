use anyhow::Context;
use std::path::Path;

/// Non-empty, whitespace-trimmed lines in file order. No dedup, no validation.
pub fn parse_tickers(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn load_tickers(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read tickers file {}", path.display()))?;
    Ok(parse_tickers(&text))
}
