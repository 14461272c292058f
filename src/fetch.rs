//! The refresh cycle: both external fetches issued concurrently and awaited
//! jointly, with the sheet rows cached once per client session.
//!
//! Either fetch failing aborts the whole refresh; there is no retry and no
//! partial result. The cache is never invalidated by date range — later
//! refreshes re-filter the cached rows.

use crate::ads::{format_ads_range, AdsResponse};
use crate::error::{FunnelError, Result};
use crate::ingestion::records_from_body;
use crate::schema::{SalesRecord, SheetSchema};
use crate::{build_sales_report, SalesReport};
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::sync::OnceCell;

const SHEET_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Full URL of the ads totals endpoint, queried with `since`/`until`.
    pub ads_endpoint: String,
    pub sheet_id: String,
    pub sheet_name: String,
    #[serde(default)]
    pub schema: SheetSchema,
}

/// Session-scoped sheet cache with single-flight population: concurrent
/// callers before the first population share one underlying fetch.
#[derive(Debug, Default)]
pub struct SheetCache {
    cell: OnceCell<Vec<SalesRecord>>,
}

impl SheetCache {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<&[SalesRecord]>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<SalesRecord>>>,
    {
        Ok(self.cell.get_or_try_init(fetch).await?.as_slice())
    }

    pub fn populated(&self) -> bool {
        self.cell.initialized()
    }
}

/// One refresh cycle's combined result.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub ads: AdsResponse,
    pub sales: SalesReport,
}

pub struct DashboardClient {
    client: Client,
    config: DashboardConfig,
    sheet_base_url: String,
    cache: SheetCache,
}

impl DashboardClient {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            sheet_base_url: SHEET_BASE_URL.to_string(),
            cache: SheetCache::new(),
        }
    }

    /// Fetches aggregate ad figures for the inclusive range. A non-success
    /// HTTP status or a `success: false` payload is an error.
    pub async fn fetch_ads(&self, start: NaiveDate, end: NaiveDate) -> Result<AdsResponse> {
        let (since, until) = format_ads_range(start, end);
        let url = format!(
            "{}?since={}&until={}",
            self.config.ads_endpoint, since, until
        );
        debug!("Fetching ads totals from {}", url);

        let res = self.client.get(&url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FunnelError::AdsApi(format!("status {}", status)));
        }

        let body: AdsResponse = res.json().await?;
        if !body.success {
            return Err(FunnelError::AdsApi("backend reported failure".to_string()));
        }
        Ok(body)
    }

    async fn fetch_sheet_rows(&self) -> Result<Vec<SalesRecord>> {
        let url = format!(
            "{}/{}/gviz/tq?tqx=out:json&sheet={}",
            self.sheet_base_url, self.config.sheet_id, self.config.sheet_name
        );
        debug!("Fetching sheet rows from {}", url);
        let text = self.client.get(&url).send().await?.text().await?;
        records_from_body(&text, &self.config.schema)
    }

    /// The full normalized sheet, fetched at most once per client session.
    pub async fn sheet_records(&self) -> Result<&[SalesRecord]> {
        let this = self;
        self.cache
            .get_or_fetch(move || this.fetch_sheet_rows())
            .await
    }

    /// Runs one refresh: both fetches concurrently, then the aggregation
    /// pipeline over the cached rows.
    pub async fn refresh(&self, start: NaiveDate, end: NaiveDate) -> Result<DashboardSnapshot> {
        let (ads, records) = tokio::try_join!(self.fetch_ads(start, end), self.sheet_records())?;
        let sales = build_sales_report(records, start, end)?;
        info!(
            "Refresh complete: {} filtered records, {} campaigns",
            sales.filtered.len(),
            ads.data.campaigns.len()
        );
        Ok(DashboardSnapshot { ads, sales })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_cache_populates_once_under_concurrent_refreshes() {
        let cache = SheetCache::new();
        let fetches = AtomicUsize::new(0);

        let counter = &fetches;
        let load = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            // Yield mid-fetch so a racing caller gets a chance to run.
            tokio::task::yield_now().await;
            Ok(vec![SalesRecord::default()])
        };

        let (a, b) = tokio::join!(cache.get_or_fetch(load), cache.get_or_fetch(load));
        assert_eq!(a.unwrap().len(), 1);
        assert_eq!(b.unwrap().len(), 1);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(cache.populated());
    }

    #[tokio::test]
    async fn test_cache_failure_leaves_cache_unpopulated() {
        let cache = SheetCache::new();

        let failed = cache
            .get_or_fetch(|| async { Err(FunnelError::SheetFormat("boom".to_string())) })
            .await;
        assert!(failed.is_err());
        assert!(!cache.populated());

        // A later attempt can still populate.
        let ok = cache
            .get_or_fetch(|| async { Ok(vec![SalesRecord::default()]) })
            .await;
        assert!(ok.is_ok());
        assert!(cache.populated());
    }
}
