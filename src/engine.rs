//! Period filtering and the single-pass aggregation over filtered records.
//!
//! One forward pass produces the period summary, the per-channel breakdown,
//! and the per-category breakdown with fractional revenue attribution. The
//! counter rules here pin down one canonical choice for each ambiguity the
//! source data allows (see DESIGN.md): leads count on any present lead
//! marker, total customers is primary bills plus upsell-2 bills, and rows
//! without a channel label bucket under "Unknown".

use crate::schema::SalesRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Aggregate counters and revenue totals for one date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// Records with any revenue at all.
    pub total_bills: u32,
    pub total_revenue: f64,
    pub primary_revenue: f64,
    pub upsell1_revenue: f64,
    pub upsell2_revenue: f64,
    pub primary_bills: u32,
    pub upsell1_bills: u32,
    pub upsell2_bills: u32,
    pub leads: u32,
    pub new_customers: u32,
    /// Records with revenue but no new-customer flag.
    pub old_customers: u32,
    /// Defined as `primary_bills + upsell2_bills`.
    pub total_customers: u32,
}

/// Per-channel counters within the period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelStats {
    pub primary_bills: u32,
    pub leads: u32,
    pub upsell2_bills: u32,
    pub new_customers: u32,
    pub revenue: f64,
}

/// Channel label → stats. Unlabeled records appear under [`UNKNOWN_CHANNEL`].
pub type ChannelBreakdown = BTreeMap<String, ChannelStats>;

pub const UNKNOWN_CHANNEL: &str = "Unknown";

/// Per-category accumulation with fractional revenue splitting and the
/// contributing records kept for drill-down.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryDetail {
    pub name: String,
    /// Revenue attributed fractionally: each record contributes
    /// `total / categories.len()` so category totals never double-count.
    pub total_revenue: f64,
    pub primary_revenue: f64,
    pub upsell1_revenue: f64,
    pub upsell2_revenue: f64,
    /// Stage bill counters increment whenever the stage amount is positive,
    /// regardless of how many categories share the record.
    pub primary_bills: u32,
    pub upsell1_bills: u32,
    pub upsell2_bills: u32,
    pub transactions: Vec<SalesRecord>,
}

/// Restricts records to the inclusive `[start, end]` day range. Records
/// whose date failed to parse are silently excluded, so the operation is
/// idempotent.
pub fn filter_by_period(
    records: &[SalesRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<SalesRecord> {
    records
        .iter()
        .filter(|r| matches!(r.date, Some(d) if d >= start && d <= end))
        .cloned()
        .collect()
}

/// Single forward pass over the filtered records.
pub fn aggregate(
    filtered: &[SalesRecord],
) -> (PeriodSummary, ChannelBreakdown, Vec<CategoryDetail>) {
    let mut summary = PeriodSummary::default();
    let mut channels = ChannelBreakdown::new();
    let mut categories: Vec<CategoryDetail> = Vec::new();
    let mut category_index: HashMap<String, usize> = HashMap::new();

    for record in filtered {
        let total = record.total();

        if total > 0.0 {
            summary.total_bills += 1;
        }
        if record.primary > 0.0 {
            summary.primary_bills += 1;
            summary.primary_revenue += record.primary;
        }
        if record.upsell1 > 0.0 {
            summary.upsell1_bills += 1;
            summary.upsell1_revenue += record.upsell1;
        }
        if record.upsell2 > 0.0 {
            summary.upsell2_bills += 1;
            summary.upsell2_revenue += record.upsell2;
        }
        if record.lead {
            summary.leads += 1;
        }
        summary.total_revenue += total;

        if record.new_customer {
            summary.new_customers += 1;
        } else if total > 0.0 {
            summary.old_customers += 1;
        }

        let label = record.channel.as_deref().unwrap_or(UNKNOWN_CHANNEL);
        let channel = channels.entry(label.to_string()).or_default();
        if record.primary > 0.0 {
            channel.primary_bills += 1;
        }
        if record.lead {
            channel.leads += 1;
        }
        if record.upsell2 > 0.0 {
            channel.upsell2_bills += 1;
        }
        if record.new_customer {
            channel.new_customers += 1;
        }
        channel.revenue += total;

        if total > 0.0 && !record.categories.is_empty() {
            let share = record.categories.len() as f64;
            for name in &record.categories {
                let idx = *category_index.entry(name.clone()).or_insert_with(|| {
                    categories.push(CategoryDetail {
                        name: name.clone(),
                        ..Default::default()
                    });
                    categories.len() - 1
                });
                let detail = &mut categories[idx];
                detail.total_revenue += total / share;
                detail.primary_revenue += record.primary / share;
                detail.upsell1_revenue += record.upsell1 / share;
                detail.upsell2_revenue += record.upsell2 / share;
                if record.primary > 0.0 {
                    detail.primary_bills += 1;
                }
                if record.upsell1 > 0.0 {
                    detail.upsell1_bills += 1;
                }
                if record.upsell2 > 0.0 {
                    detail.upsell2_bills += 1;
                }
                detail.transactions.push(record.clone());
            }
        }
    }

    summary.total_customers = summary.primary_bills + summary.upsell2_bills;

    // Stable sort keeps first-appearance order for revenue ties.
    categories.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(Ordering::Equal)
    });

    (summary, channels, categories)
}
