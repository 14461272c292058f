//! Links later upsell purchases back to the contact's first primary sale and
//! attributes the upsell revenue across origin × destination category pairs.

use crate::schema::SalesRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Accumulated revenue flow from an origin purchase's category to a later
/// upsell's category for the same contact.
#[derive(Debug, Clone, Serialize)]
pub struct UpsellPath {
    pub origin: String,
    pub destination: String,
    pub count: u32,
    pub revenue: f64,
    pub transactions: Vec<SalesRecord>,
}

struct OriginSale {
    date: NaiveDate,
    categories: Vec<String>,
}

/// Two-phase join over the filtered records.
///
/// Phase 1 indexes each contact's earliest record with a positive primary
/// amount. Phase 2 takes every record with a positive first-upsell amount
/// whose date is on or after that origin's date and explodes the pair of
/// category lists, attributing `upsell1 / (origins × destinations)` to each
/// pair. An empty category list on either side produces no pairs; that
/// record's upsell revenue is silently dropped.
pub fn link_upsell_paths(filtered: &[SalesRecord]) -> Vec<UpsellPath> {
    let mut origins: HashMap<&str, OriginSale> = HashMap::new();
    for record in filtered {
        let (Some(contact), Some(date)) = (record.contact.as_deref(), record.date) else {
            continue;
        };
        if record.primary <= 0.0 {
            continue;
        }
        match origins.get(contact) {
            Some(existing) if existing.date <= date => {}
            _ => {
                origins.insert(
                    contact,
                    OriginSale {
                        date,
                        categories: record.categories.clone(),
                    },
                );
            }
        }
    }

    let mut paths: Vec<UpsellPath> = Vec::new();
    let mut path_index: HashMap<(String, String), usize> = HashMap::new();

    for record in filtered {
        if record.upsell1 <= 0.0 {
            continue;
        }
        let (Some(contact), Some(date)) = (record.contact.as_deref(), record.date) else {
            continue;
        };
        let Some(origin) = origins.get(contact) else {
            continue;
        };
        if date < origin.date {
            continue;
        }
        if origin.categories.is_empty() || record.categories.is_empty() {
            continue;
        }

        let pair_count = (origin.categories.len() * record.categories.len()) as f64;
        let share = record.upsell1 / pair_count;

        for from in &origin.categories {
            for to in &record.categories {
                let key = (from.clone(), to.clone());
                let idx = *path_index.entry(key).or_insert_with(|| {
                    paths.push(UpsellPath {
                        origin: from.clone(),
                        destination: to.clone(),
                        count: 0,
                        revenue: 0.0,
                        transactions: Vec::new(),
                    });
                    paths.len() - 1
                });
                let path = &mut paths[idx];
                path.count += 1;
                path.revenue += share;
                path.transactions.push(record.clone());
            }
        }
    }

    paths.sort_by(|a, b| b.revenue.partial_cmp(&a.revenue).unwrap_or(Ordering::Equal));
    paths
}
