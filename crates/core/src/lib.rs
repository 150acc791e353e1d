pub mod domain;
pub mod ingest;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;
    use std::time::Duration;

    pub const DEFAULT_TICKERS_FILE: &str = "tickers.txt";
    pub const DEFAULT_OUTPUT_PATH: &str = "data/tickers.json";
    pub const DEFAULT_PRIMARY_SUFFIX: &str = ".JK";
    pub const DEFAULT_FETCH_DELAY_MS: u64 = 1000;
    pub const DEFAULT_YAHOO_CHART_BASE_URL: &str =
        "https://query1.finance.yahoo.com/v8/finance/chart/";
    pub const DEFAULT_YAHOO_QUOTE_BASE_URL: &str =
        "https://query1.finance.yahoo.com/v7/finance/quote";
    pub const DEFAULT_YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com/consent";
    pub const DEFAULT_YAHOO_CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
    pub const DEFAULT_INVESTING_BASE_URL: &str = "https://www.investing.com";
    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub tickers_file: PathBuf,
        pub output_path: PathBuf,
        pub primary_suffix: String,
        pub fetch_delay_ms: u64,
        pub yahoo_chart_base_url: String,
        pub yahoo_quote_base_url: String,
        pub yahoo_cookie_url: String,
        pub yahoo_crumb_url: String,
        pub investing_base_url: String,
        pub http_timeout_secs: Option<u64>,
        pub user_agent: String,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                tickers_file: PathBuf::from(DEFAULT_TICKERS_FILE),
                output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
                primary_suffix: DEFAULT_PRIMARY_SUFFIX.to_string(),
                fetch_delay_ms: DEFAULT_FETCH_DELAY_MS,
                yahoo_chart_base_url: DEFAULT_YAHOO_CHART_BASE_URL.to_string(),
                yahoo_quote_base_url: DEFAULT_YAHOO_QUOTE_BASE_URL.to_string(),
                yahoo_cookie_url: DEFAULT_YAHOO_COOKIE_URL.to_string(),
                yahoo_crumb_url: DEFAULT_YAHOO_CRUMB_URL.to_string(),
                investing_base_url: DEFAULT_INVESTING_BASE_URL.to_string(),
                http_timeout_secs: None,
                user_agent: DEFAULT_USER_AGENT.to_string(),
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();
            Ok(Self {
                tickers_file: env_non_empty("TICKERS_FILE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.tickers_file),
                output_path: env_non_empty("OUTPUT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.output_path),
                primary_suffix: env_non_empty("PRIMARY_SUFFIX")
                    .unwrap_or(defaults.primary_suffix),
                fetch_delay_ms: std::env::var("FETCH_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(defaults.fetch_delay_ms),
                yahoo_chart_base_url: env_non_empty("YAHOO_CHART_BASE_URL")
                    .unwrap_or(defaults.yahoo_chart_base_url),
                yahoo_quote_base_url: env_non_empty("YAHOO_QUOTE_BASE_URL")
                    .unwrap_or(defaults.yahoo_quote_base_url),
                yahoo_cookie_url: env_non_empty("YAHOO_COOKIE_URL")
                    .unwrap_or(defaults.yahoo_cookie_url),
                yahoo_crumb_url: env_non_empty("YAHOO_CRUMB_URL")
                    .unwrap_or(defaults.yahoo_crumb_url),
                investing_base_url: env_non_empty("INVESTING_BASE_URL")
                    .unwrap_or(defaults.investing_base_url),
                http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok()),
                user_agent: env_non_empty("USER_AGENT").unwrap_or(defaults.user_agent),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn politeness_delay(&self) -> Duration {
            Duration::from_millis(self.fetch_delay_ms)
        }

        /// Shared HTTP client for both fetchers. Cookies persist across requests like a browser
        /// session. No timeout unless `HTTP_TIMEOUT_SECS` is set.
        pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
            let mut builder = reqwest::Client::builder()
                .user_agent(self.user_agent.clone())
                .cookie_store(true);
            if let Some(secs) = self.http_timeout_secs {
                builder = builder.timeout(Duration::from_secs(secs));
            }
            builder.build().context("failed to build http client")
        }
    }

    fn env_non_empty(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn defaults_match_batch_layout() {
            let s = Settings::default();
            assert_eq!(s.tickers_file, PathBuf::from("tickers.txt"));
            assert_eq!(s.output_path, PathBuf::from("data/tickers.json"));
            assert_eq!(s.primary_suffix, ".JK");
            assert_eq!(s.politeness_delay(), Duration::from_secs(1));
            assert!(s.http_timeout_secs.is_none());
            assert_eq!(s.yahoo_cookie_url, "https://fc.yahoo.com/consent");
            assert!(s.yahoo_crumb_url.ends_with("/v1/test/getcrumb"));
        }

        #[test]
        fn builds_http_client_with_and_without_timeout() {
            let mut s = Settings::default();
            assert!(s.http_client().is_ok());
            s.http_timeout_secs = Some(5);
            assert!(s.http_client().is_ok());
        }
    }
}
