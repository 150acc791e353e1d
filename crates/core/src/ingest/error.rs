use std::fmt;

/// Where a fetch gave up. Carried as the root of the `anyhow` chain so the masked failure can
/// still be inspected in debug logs.
#[derive(Debug, Clone)]
pub struct FetchError {
    pub provider: &'static str,
    pub stage: &'static str,
    pub detail: String,
}

impl FetchError {
    pub fn new(provider: &'static str, stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            provider,
            stage,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetch error (provider={}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for FetchError {}
