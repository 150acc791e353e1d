use crate::domain::snapshot::Snapshot;
use anyhow::Context;
use std::path::Path;

/// Writes `snapshot` as pretty JSON, replacing whatever was at `path`.
///
/// The parent directory is created on demand. There is no temp-file rename and no backup:
/// a crash mid-write can leave a truncated file, and the next run overwrites it anyway.
pub async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }

    let body = serde_json::to_string_pretty(snapshot).context("failed to serialize snapshot")?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::{EmptyInfo, FallbackQuote, FallbackSource, QuoteRecord};
    use crate::time::utc_now_naive;
    use std::path::PathBuf;

    async fn read_snapshot(path: &Path) -> Snapshot {
        let text = tokio::fs::read_to_string(path).await.unwrap();
        serde_json::from_str(&text).unwrap()
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("tickersnap-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn creates_missing_directory_and_round_trips() {
        let dir = scratch_dir();
        let path = dir.join("data").join("tickers.json");
        let now = utc_now_naive();
        let snapshot = Snapshot::new(
            now,
            vec![
                QuoteRecord::Fallback(FallbackQuote {
                    source: FallbackSource::Investing,
                    ticker: "BBRI".to_string(),
                    ts: now,
                    close: Some(4_560.0),
                    info: EmptyInfo::default(),
                }),
                QuoteRecord::no_data("XXXX.JK", now),
            ],
        );

        write_snapshot(&path, &snapshot).await.unwrap();
        let back = read_snapshot(&path).await;
        assert_eq!(back, snapshot);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn second_write_replaces_first() {
        let dir = scratch_dir();
        let path = dir.join("tickers.json");
        let now = utc_now_naive();

        let first = Snapshot::new(now, vec![QuoteRecord::no_data("OLD.JK", now)]);
        write_snapshot(&path, &first).await.unwrap();
        let second = Snapshot::new(now, vec![]);
        write_snapshot(&path, &second).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("OLD.JK"));
        assert_eq!(read_snapshot(&path).await.items.len(), 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn keeps_non_ascii_and_two_space_indent() {
        let dir = scratch_dir();
        let path = dir.join("tickers.json");
        let now = utc_now_naive();
        let snapshot = Snapshot::new(now, vec![QuoteRecord::no_data("삼성전자", now)]);

        write_snapshot(&path, &snapshot).await.unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"ticker\": \"삼성전자\""));
        assert!(text.starts_with("{\n  \"generated_at\": "));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn unwritable_target_is_an_error() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        // A directory where the file should be.
        let path = dir.join("tickers.json");
        std::fs::create_dir_all(&path).unwrap();

        let now = utc_now_naive();
        let err = write_snapshot(&path, &Snapshot::new(now, vec![]))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to write snapshot"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
