//! Wire types for the advertising-spend backend and the small derived
//! figures the dashboard computes from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Top-level ads API payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub totals: AdsTotals,
    #[serde(default)]
    pub data: AdsData,
}

/// Aggregate ad-account figures for the requested range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdsTotals {
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub purchases: u64,
    #[serde(default)]
    pub messaging_conversations: u64,
    #[serde(default)]
    pub cpm: f64,
    #[serde(default)]
    pub ctr: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdsData {
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub insights: AdInsights,
    #[serde(default)]
    pub ads: Vec<Ad>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ad {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub insights: AdInsights,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdInsights {
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub purchases: u64,
    #[serde(default)]
    pub messaging_conversations: u64,
    #[serde(default)]
    pub cpm: f64,
}

/// Formats the `since`/`until` query parameters the ads backend expects:
/// day-month-year, dash-separated.
pub fn format_ads_range(start: NaiveDate, end: NaiveDate) -> (String, String) {
    (
        start.format("%d-%m-%Y").to_string(),
        end.format("%d-%m-%Y").to_string(),
    )
}

/// Return on ad spend; zero when nothing was spent.
pub fn roas(revenue: f64, spend: f64) -> f64 {
    if spend > 0.0 {
        revenue / spend
    } else {
        0.0
    }
}
