//! # Sales Funnel Analytics
//!
//! A library for joining advertising-spend data from a backend API with
//! sales data from a published spreadsheet export, producing the structured
//! aggregates a reporting surface renders: period summaries, channel and
//! category breakdowns, and upsell-path attribution.
//!
//! ## Core Concepts
//!
//! - **Sales record**: one sheet row coerced into typed fields at the
//!   normalizer boundary (date, three stage amounts, categories, channel,
//!   flags, contact).
//! - **Period summary**: bill/lead/customer counters and revenue totals for
//!   an inclusive date range.
//! - **Category attribution**: a record's revenue is split evenly across its
//!   comma-separated categories, so category totals never double-count.
//! - **Upsell path**: a later upsell purchase linked back (by contact) to the
//!   contact's earliest primary sale, attributing revenue across the
//!   origin × destination category cross-product.
//!
//! The core is pure: it takes records and returns aggregates, and knows
//! nothing about rendering. The optional `fetch` feature adds the async
//! client that performs the two concurrent fetches per refresh with a
//! single-flight session cache for the sheet rows.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sales_funnel_analytics::*;
//! use chrono::NaiveDate;
//!
//! let records = records_from_body(&export_body, &SheetSchema::default())?;
//! let report = build_sales_report(
//!     &records,
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//! )?;
//! println!("{}", text_summary(&report.summary, &report.channels));
//! ```

pub mod ads;
pub mod coerce;
pub mod drilldown;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod linker;
pub mod report;
pub mod schema;

#[cfg(feature = "fetch")]
pub mod fetch;

pub use ads::{format_ads_range, roas, Ad, AdInsights, AdsData, AdsResponse, AdsTotals, Campaign};
pub use coerce::*;
pub use drilldown::{filter_channel_stage, filter_stage, StageFilter};
pub use engine::{
    aggregate, filter_by_period, CategoryDetail, ChannelBreakdown, ChannelStats, PeriodSummary,
    UNKNOWN_CHANNEL,
};
pub use error::{FunnelError, Result};
pub use ingestion::*;
pub use linker::{link_upsell_paths, UpsellPath};
pub use report::{growth, text_summary, Growth, GrowthDirection};
pub use schema::*;

#[cfg(feature = "fetch")]
pub use fetch::{DashboardClient, DashboardConfig, DashboardSnapshot, SheetCache};

use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;

/// Everything one refresh derives from the sales side: the summary, both
/// breakdowns, the upsell paths, and the filtered rows the drill-down
/// popups re-filter.
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub summary: PeriodSummary,
    pub channels: ChannelBreakdown,
    pub categories: Vec<CategoryDetail>,
    pub upsell_paths: Vec<UpsellPath>,
    pub filtered: Vec<SalesRecord>,
}

pub struct SalesReportBuilder;

impl SalesReportBuilder {
    pub fn build(
        records: &[SalesRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SalesReport> {
        if end < start {
            return Err(FunnelError::InvalidRange { start, end });
        }

        info!(
            "Building sales report for {} records over [{}, {}]",
            records.len(),
            start,
            end
        );

        let filtered = filter_by_period(records, start, end);
        debug!("{} records fall inside the period", filtered.len());

        let (summary, channels, categories) = aggregate(&filtered);
        let upsell_paths = link_upsell_paths(&filtered);

        Ok(SalesReport {
            summary,
            channels,
            categories,
            upsell_paths,
            filtered,
        })
    }
}

/// Filters, aggregates, and links one period's records.
pub fn build_sales_report(
    records: &[SalesRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SalesReport> {
    SalesReportBuilder::build(records, start, end)
}
