//! Comparison-period growth figures and the plain-text period digest.

use crate::engine::{ChannelBreakdown, PeriodSummary};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrowthDirection {
    Positive,
    Negative,
    Flat,
}

/// Percent change between two periods. `percent` is `None` when the previous
/// value was zero and the current one positive (unbounded growth).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Growth {
    pub percent: Option<f64>,
    pub direction: GrowthDirection,
}

pub fn growth(current: f64, previous: f64) -> Growth {
    if previous == 0.0 {
        return if current > 0.0 {
            Growth {
                percent: None,
                direction: GrowthDirection::Positive,
            }
        } else {
            Growth {
                percent: Some(0.0),
                direction: GrowthDirection::Flat,
            }
        };
    }
    let percent = (current - previous) / previous * 100.0;
    let direction = if percent > 0.0 {
        GrowthDirection::Positive
    } else if percent < 0.0 {
        GrowthDirection::Negative
    } else {
        GrowthDirection::Flat
    };
    Growth {
        percent: Some(percent),
        direction,
    }
}

/// Builds the copyable plain-text digest of a period: headline totals, stage
/// revenue, and one line per channel sorted by revenue.
pub fn text_summary(summary: &PeriodSummary, channels: &ChannelBreakdown) -> String {
    let mut out = String::new();
    writeln!(out, "--- [Current period] ---").unwrap();
    writeln!(out, "* Total revenue: {:.2}", summary.total_revenue).unwrap();
    writeln!(out, "* Bills: {}", summary.total_bills).unwrap();
    writeln!(
        out,
        "* P1: {:.2} | Upsell 1: {:.2} | Upsell 2: {:.2}",
        summary.primary_revenue, summary.upsell1_revenue, summary.upsell2_revenue
    )
    .unwrap();
    writeln!(
        out,
        "* Customers: {} ({} new / {} returning)",
        summary.total_customers, summary.new_customers, summary.old_customers
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "--- [By channel] ---").unwrap();

    let mut ordered: Vec<_> = channels.iter().collect();
    ordered.sort_by(|a, b| {
        b.1.revenue
            .partial_cmp(&a.1.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (label, stats) in ordered {
        writeln!(
            out,
            "* {}: P1={}, leads={}, upsell2={}, revenue={:.2}",
            label, stats.primary_bills, stats.leads, stats.upsell2_bills, stats.revenue
        )
        .unwrap();
    }
    out
}
