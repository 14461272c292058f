use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single spreadsheet cell as it arrives on the wire.
///
/// The sheet export types cells as strings, numbers, booleans, or null; no
/// other shapes occur. Everything downstream of the normalizer goes through
/// the coercion helpers rather than matching on this directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Flag(bool),
    Number(f64),
    Text(String),
}

impl Default for Cell {
    fn default() -> Self {
        Self::Null
    }
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One sheet row as a column-label → value mapping, before schema mapping.
/// Missing cells are present with a [`Cell::Null`] value.
pub type RawRecord = BTreeMap<String, Cell>;

/// Maps the conceptual record fields onto the sheet's column labels.
///
/// A renamed spreadsheet column is a configuration change here, not a silent
/// stream of zeroed fields in the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetSchema {
    pub date: String,
    pub primary: String,
    pub lead: String,
    pub upsell1: String,
    pub upsell2: String,
    pub categories: String,
    pub channel: String,
    pub new_customer: String,
    pub contact: String,
    pub customer_name: String,
}

impl Default for SheetSchema {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            primary: "P1".to_string(),
            lead: "P2".to_string(),
            upsell1: "Upsell P1".to_string(),
            upsell2: "Upsell P2".to_string(),
            categories: "Category".to_string(),
            channel: "Channel".to_string(),
            new_customer: "New Customer".to_string(),
            contact: "Phone".to_string(),
            customer_name: "Customer".to_string(),
        }
    }
}

/// A fully coerced sales record, the unit the aggregation engine operates on.
///
/// Produced by the normalizer's schema-mapping step; immutable afterwards.
/// `date` stays optional because unparseable dates are excluded by the period
/// filter rather than raised as errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: Option<NaiveDate>,
    /// First-stage purchase amount ("P1").
    pub primary: f64,
    /// Second-stage additional purchase amount.
    pub upsell1: f64,
    /// Third-stage additional purchase amount.
    pub upsell2: f64,
    /// Whether the lead-indicator field was marked on this row.
    pub lead: bool,
    /// Classification tags, already split and trimmed.
    pub categories: Vec<String>,
    /// Acquisition source label; `None` buckets under "Unknown".
    pub channel: Option<String>,
    pub new_customer: bool,
    /// Contact identifier used for the upsell join.
    pub contact: Option<String>,
    pub customer_name: Option<String>,
}

impl SalesRecord {
    /// Total revenue on this record across all three stages.
    pub fn total(&self) -> f64 {
        self.primary + self.upsell1 + self.upsell2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_deserializes_all_wire_shapes() {
        let cells: Vec<Cell> = serde_json::from_str(r#"["abc", 12.5, true, null]"#).unwrap();
        assert_eq!(
            cells,
            vec![
                Cell::Text("abc".to_string()),
                Cell::Number(12.5),
                Cell::Flag(true),
                Cell::Null,
            ]
        );
    }

    #[test]
    fn test_record_total() {
        let record = SalesRecord {
            primary: 100.0,
            upsell1: 40.0,
            upsell2: 10.0,
            ..Default::default()
        };
        assert_eq!(record.total(), 150.0);
    }
}
