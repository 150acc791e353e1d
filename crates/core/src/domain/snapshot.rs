use crate::domain::quote::QuoteRecord;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One run's output document. Replaced wholesale on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(with = "crate::time::iso::naive")]
    pub generated_at: NaiveDateTime,
    pub items: Vec<QuoteRecord>,
}

impl Snapshot {
    pub fn new(generated_at: NaiveDateTime, items: Vec<QuoteRecord>) -> Self {
        Self {
            generated_at,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    #[test]
    fn empty_snapshot_is_well_formed() {
        let at = NaiveDate::from_ymd_opt(2026, 1, 27)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let v = serde_json::to_value(Snapshot::new(at, vec![])).unwrap();
        assert_eq!(v, json!({"generated_at": "2026-01-27T10:00:00", "items": []}));
    }

    #[test]
    fn round_trips_generated_at_and_items() {
        let at = NaiveDate::from_ymd_opt(2026, 1, 27)
            .unwrap()
            .and_hms_micro_opt(10, 0, 0, 5)
            .unwrap();
        let snapshot = Snapshot::new(
            at,
            vec![
                QuoteRecord::no_data("AAA.JK", at),
                QuoteRecord::no_data("BBB", at),
            ],
        );

        let text = serde_json::to_string_pretty(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, snapshot);

        let reserialized: Value = serde_json::to_value(&parsed).unwrap();
        let original: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reserialized["generated_at"], original["generated_at"]);
        assert_eq!(reserialized["items"], original["items"]);
    }
}
