pub mod error;
pub mod investing;
pub mod provider;
pub mod resolve;
pub mod tickers;
pub mod types;
pub mod yahoo;

pub use provider::QuoteSource;
pub use resolve::{Resolver, RunStats};
