//! CSV price-history loader.
//!
//! Expected CSV columns:
//!   item_id, category, price, is_current
//!
//! Each row is one observed price. Rows are grouped by `item_id`; the last
//! row flagged `is_current` becomes the quoted price and every other row is
//! history.

use std::collections::BTreeMap;
use std::io::Read;

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::types::PriceObservation;

#[derive(Debug, Clone, Deserialize)]
pub struct PriceRecord {
    pub item_id: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default, deserialize_with = "deserialize_bool")]
    pub is_current: bool,
}

/// Load price records from a CSV reader.
pub fn load_price_history<R: Read>(reader: R) -> EngineResult<Vec<PriceRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let record: PriceRecord = result.map_err(|source| EngineError::Csv {
            line: line_num + 2,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Load price records from a CSV file path.
pub fn load_price_history_file(path: &str) -> EngineResult<Vec<PriceRecord>> {
    let file = std::fs::File::open(path).map_err(|source| EngineError::Io {
        path: path.to_string(),
        source,
    })?;
    let records = load_price_history(file)?;
    log::info!("Loaded {} price records from {}", records.len(), path);
    Ok(records)
}

/// Build one observation per item, ordered by `item_id`.
///
/// Items without a current-price row are skipped with a warning.
pub fn group_into_observations(records: &[PriceRecord]) -> Vec<PriceObservation> {
    #[derive(Default)]
    struct Group {
        category: String,
        current: Option<f64>,
        history: Vec<f64>,
    }

    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();
    for record in records {
        let group = groups.entry(record.item_id.as_str()).or_default();
        if group.category.is_empty() {
            group.category = record.category.clone();
        }
        if record.is_current {
            // An earlier current row is demoted to history.
            if let Some(previous) = group.current.replace(record.price) {
                group.history.push(previous);
            }
        } else {
            group.history.push(record.price);
        }
    }

    groups
        .into_iter()
        .filter_map(|(item_id, group)| {
            let Some(current) = group.current else {
                log::warn!("Item '{}' has no current price row; skipping", item_id);
                return None;
            };
            let mut observation = PriceObservation::new(current, group.history);
            observation.item_id = Some(item_id.to_string());
            if !group.category.is_empty() {
                observation.item_category = group.category;
            }
            Some(observation)
        })
        .collect()
}

/// Flexible bool deserializer: handles "true"/"false", "1"/"0", "yes"/"no".
fn deserialize_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.to_lowercase().trim() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected bool value, got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
item_id,category,price,is_current
LAP-01,Electronics,45000,false
LAP-01,Electronics,46000,no
LAP-01,Electronics,44000,0
LAP-01,Electronics,75000,true
CHR-09,Furniture,3200,
CHR-09,Furniture,3100,
CHR-09,Furniture,3350,yes
DSK-44,Furniture,9000,false
";

    #[test]
    fn load_sample_csv() {
        let records = load_price_history(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 8);
        assert_eq!(records[0].item_id, "LAP-01");
        assert!((records[3].price - 75000.0).abs() < 1e-9);
        assert!(records[3].is_current);
        assert!(!records[4].is_current);
        assert!(records[6].is_current);
    }

    #[test]
    fn groups_sorted_and_skips_items_without_current() {
        let records = load_price_history(SAMPLE_CSV.as_bytes()).unwrap();
        let observations = group_into_observations(&records);
        assert_eq!(observations.len(), 2);

        assert_eq!(observations[0].item_id.as_deref(), Some("CHR-09"));
        assert_eq!(observations[0].current_price, 3350.0);
        assert_eq!(observations[0].historical_prices, vec![3200.0, 3100.0]);
        assert_eq!(observations[0].item_category, "Furniture");

        assert_eq!(observations[1].item_id.as_deref(), Some("LAP-01"));
        assert_eq!(observations[1].current_price, 75000.0);
        assert_eq!(observations[1].historical_prices.len(), 3);
    }

    #[test]
    fn last_current_row_wins() {
        let csv_data = "\
item_id,category,price,is_current
X,General,10,true
X,General,11,false
X,General,12,true
";
        let records = load_price_history(csv_data.as_bytes()).unwrap();
        let observations = group_into_observations(&records);
        assert_eq!(observations[0].current_price, 12.0);
        assert_eq!(observations[0].historical_prices, vec![11.0, 10.0]);
    }

    #[test]
    fn bad_bool_reports_line() {
        let csv_data = "\
item_id,category,price,is_current
X,General,10,maybe
";
        let err = load_price_history(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::Csv { line: 2, .. }));
    }

    #[test]
    fn bad_price_is_an_error() {
        let csv_data = "\
item_id,category,price,is_current
X,General,cheap,true
";
        assert!(load_price_history(csv_data.as_bytes()).is_err());
    }

    #[test]
    fn missing_file() {
        let err = load_price_history_file("/nonexistent/prices.csv").unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
