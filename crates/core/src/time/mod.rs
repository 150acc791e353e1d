pub mod iso;

pub use iso::{format_iso_naive, parse_iso_naive, utc_now_naive};
