//! Pure re-filtering of already-computed transaction lists, the logic
//! behind the drill-down popups. The presentation layer decides what to do
//! with the returned rows; nothing here renders.

use crate::schema::SalesRecord;

/// Which aspect of a record a drill-down cell filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageFilter {
    All,
    Primary,
    Lead,
    Upsell1,
    Upsell2,
    NewCustomer,
}

impl StageFilter {
    pub fn matches(&self, record: &SalesRecord) -> bool {
        match self {
            StageFilter::All => true,
            StageFilter::Primary => record.primary > 0.0,
            StageFilter::Lead => record.lead,
            StageFilter::Upsell1 => record.upsell1 > 0.0,
            StageFilter::Upsell2 => record.upsell2 > 0.0,
            StageFilter::NewCustomer => record.new_customer,
        }
    }
}

/// Filters a computed transaction list by stage (the category popup).
pub fn filter_stage<'a>(rows: &'a [SalesRecord], filter: StageFilter) -> Vec<&'a SalesRecord> {
    rows.iter().filter(|r| filter.matches(r)).collect()
}

/// Filters the period's rows by channel label and stage (the channel popup).
/// Records without a channel only match a `None` filter label.
pub fn filter_channel_stage<'a>(
    rows: &'a [SalesRecord],
    channel: Option<&str>,
    filter: StageFilter,
) -> Vec<&'a SalesRecord> {
    rows.iter()
        .filter(|r| r.channel.as_deref() == channel)
        .filter(|r| filter.matches(r))
        .collect()
}
