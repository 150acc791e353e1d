pub mod quote;
pub mod snapshot;
