//! Normalizes the published-sheet export into typed [`SalesRecord`]s.
//!
//! The export arrives as a JSON-like body wrapped in non-JSON prefix/suffix
//! text, describing column labels and rows of typed cell values. Rows pass
//! through without validation; all coercion happens in the schema-mapping
//! step so the engine only ever sees typed fields.

use crate::coerce::{
    is_present, is_truthy_flag, parse_categories, parse_sheet_date, to_key_text, to_number,
};
use crate::error::{FunnelError, Result};
use crate::schema::{Cell, RawRecord, SalesRecord, SheetSchema};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SheetPayload {
    pub table: SheetTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetTable {
    #[serde(default)]
    pub cols: Vec<SheetColumn>,
    #[serde(default)]
    pub rows: Vec<SheetRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetColumn {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
}

impl SheetColumn {
    /// Column key: the label when present, else the id.
    pub fn key(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetRow {
    #[serde(default)]
    pub c: Vec<Option<SheetCell>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetCell {
    #[serde(default)]
    pub v: Cell,
}

/// Strips the non-JSON wrapper around the export body, returning the
/// substring from the first `{` to the last `}` inclusive.
pub fn strip_sheet_wrapper(body: &str) -> Result<&str> {
    let start = body
        .find('{')
        .ok_or_else(|| FunnelError::SheetFormat("no opening brace in response".to_string()))?;
    let end = body
        .rfind('}')
        .ok_or_else(|| FunnelError::SheetFormat("no closing brace in response".to_string()))?;
    if end < start {
        return Err(FunnelError::SheetFormat(
            "braces out of order in response".to_string(),
        ));
    }
    Ok(&body[start..=end])
}

/// Parses a raw export body (wrapper included) into the tabular payload.
pub fn parse_sheet_payload(body: &str) -> Result<SheetPayload> {
    let json = strip_sheet_wrapper(body)?;
    Ok(serde_json::from_str(json)?)
}

/// Converts the columnar table into one key→value record per row.
///
/// Missing or short cells become [`Cell::Null`]; cells beyond the column
/// count are dropped. Misaligned rows are not an error.
pub fn raw_records(table: &SheetTable) -> Vec<RawRecord> {
    table
        .rows
        .iter()
        .map(|row| {
            table
                .cols
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let value = row
                        .c
                        .get(i)
                        .and_then(|cell| cell.as_ref().map(|c| c.v.clone()))
                        .unwrap_or(Cell::Null);
                    (col.key().to_string(), value)
                })
                .collect()
        })
        .collect()
}

/// The schema-mapping boundary: coerces one raw record into a typed
/// [`SalesRecord`] using the configured column labels.
pub fn map_record(raw: &RawRecord, schema: &SheetSchema) -> SalesRecord {
    let cell = |label: &str| raw.get(label).unwrap_or(&Cell::Null);

    SalesRecord {
        date: parse_sheet_date(cell(&schema.date)),
        primary: to_number(cell(&schema.primary)),
        upsell1: to_number(cell(&schema.upsell1)),
        upsell2: to_number(cell(&schema.upsell2)),
        lead: is_present(cell(&schema.lead)),
        categories: parse_categories(cell(&schema.categories)),
        channel: to_key_text(cell(&schema.channel)),
        new_customer: is_truthy_flag(cell(&schema.new_customer)),
        contact: to_key_text(cell(&schema.contact)),
        customer_name: to_key_text(cell(&schema.customer_name)),
    }
}

/// Normalizes a parsed table straight to typed records.
pub fn normalize_table(table: &SheetTable, schema: &SheetSchema) -> Vec<SalesRecord> {
    raw_records(table)
        .iter()
        .map(|raw| map_record(raw, schema))
        .collect()
}

/// Parses and normalizes a raw export body in one step.
pub fn records_from_body(body: &str, schema: &SheetSchema) -> Result<Vec<SalesRecord>> {
    let payload = parse_sheet_payload(body)?;
    Ok(normalize_table(&payload.table, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE_BODY: &str = concat!(
        "/*O_o*/\n",
        "google.visualization.Query.setResponse({\"version\":\"0.6\",\"table\":{",
        "\"cols\":[",
        "{\"id\":\"A\",\"label\":\"Date\",\"type\":\"date\"},",
        "{\"id\":\"B\",\"label\":\"P1\",\"type\":\"number\"},",
        "{\"id\":\"C\",\"label\":\"P2\",\"type\":\"string\"},",
        "{\"id\":\"D\",\"label\":\"Upsell P1\",\"type\":\"number\"},",
        "{\"id\":\"E\",\"label\":\"Upsell P2\",\"type\":\"number\"},",
        "{\"id\":\"F\",\"label\":\"Category\",\"type\":\"string\"},",
        "{\"id\":\"G\",\"label\":\"Channel\",\"type\":\"string\"},",
        "{\"id\":\"H\",\"label\":\"New Customer\",\"type\":\"string\"},",
        "{\"id\":\"I\",\"label\":\"Phone\",\"type\":\"string\"},",
        "{\"id\":\"J\",\"label\":\"Customer\",\"type\":\"string\"}",
        "],",
        "\"rows\":[",
        "{\"c\":[{\"v\":\"Date(2024,0,5)\"},{\"v\":100},null,{\"v\":0},{\"v\":0},",
        "{\"v\":\"A,B\"},{\"v\":\"Facebook\"},{\"v\":\"true\"},{\"v\":\"555\"},{\"v\":\"Ann\"}]},",
        "{\"c\":[{\"v\":\"Date(2024,0,10)\"},{\"v\":\"1,250.75\"},{\"v\":\"x\"}]}",
        "]}});"
    );

    #[test]
    fn test_strip_sheet_wrapper() {
        let stripped = strip_sheet_wrapper("prefix({\"a\":1});").unwrap();
        assert_eq!(stripped, "{\"a\":1}");

        assert!(strip_sheet_wrapper("no json here").is_err());
    }

    #[test]
    fn test_records_from_body() {
        let records = records_from_body(SAMPLE_BODY, &SheetSchema::default()).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.date, Some(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()));
        assert_eq!(first.primary, 100.0);
        assert!(!first.lead);
        assert_eq!(first.categories, vec!["A", "B"]);
        assert_eq!(first.channel.as_deref(), Some("Facebook"));
        assert!(first.new_customer);
        assert_eq!(first.contact.as_deref(), Some("555"));
        assert_eq!(first.customer_name.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_short_row_fills_null() {
        let records = records_from_body(SAMPLE_BODY, &SheetSchema::default()).unwrap();
        let second = &records[1];
        // Locale-formatted amount still coerces; absent trailing cells zero out.
        assert_eq!(second.primary, 1250.75);
        assert!(second.lead);
        assert_eq!(second.upsell1, 0.0);
        assert!(second.categories.is_empty());
        assert_eq!(second.channel, None);
        assert!(!second.new_customer);
    }

    #[test]
    fn test_column_key_falls_back_to_id() {
        let col = SheetColumn {
            id: "A".to_string(),
            label: String::new(),
        };
        assert_eq!(col.key(), "A");
    }

    #[test]
    fn test_misaligned_long_row_drops_extras() {
        let table = SheetTable {
            cols: vec![SheetColumn {
                id: "A".to_string(),
                label: "P1".to_string(),
            }],
            rows: vec![SheetRow {
                c: vec![
                    Some(SheetCell {
                        v: Cell::Number(10.0),
                    }),
                    Some(SheetCell {
                        v: Cell::Number(99.0),
                    }),
                ],
            }],
        };
        let raws = raw_records(&table);
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0].len(), 1);
        assert_eq!(raws[0].get("P1"), Some(&Cell::Number(10.0)));
    }
}
