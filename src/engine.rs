// Filter/sort/paginate core of the hotel listing. recompute is a pure
// function of (catalog, query); pagination only ever appends to the visible
// prefix and never re-filters.

use serde::Serialize;
use tracing::debug;

use crate::catalog::HotelRecord;
use crate::query::{PriceRange, Query, SortBy};

pub const PAGE_SIZE: usize = 10;

// Derived listing state. `displayed()` is always a prefix of the full
// filtered sequence, at most `page * PAGE_SIZE` records long.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultState {
    filtered: Vec<HotelRecord>,
    visible: usize,
    page: usize,
    has_more: bool,
}

impl ResultState {
    pub fn displayed(&self) -> &[HotelRecord] {
        &self.filtered[..self.visible]
    }

    pub fn full_results(&self) -> &[HotelRecord] {
        &self.filtered
    }

    pub fn total(&self) -> usize {
        self.filtered.len()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    // Reveals the next page, returning how many records were appended. With
    // nothing left this is a strict no-op.
    pub fn load_more(&mut self) -> usize {
        if !self.has_more {
            return 0;
        }

        let offset = self.page * PAGE_SIZE;
        if offset >= self.filtered.len() {
            // Only reachable if the full set shrank under the cursor, which
            // recompute's pagination reset rules out today. Guarded anyway.
            self.has_more = false;
            return 0;
        }

        let end = (offset + PAGE_SIZE).min(self.filtered.len());
        let appended = end - offset;
        self.visible = end;
        self.page += 1;
        self.has_more = self.visible < self.filtered.len();
        appended
    }
}

// Derives the full result state for a query over a catalog snapshot.
// Deterministic: identical inputs produce an identical ResultState.
pub fn recompute(catalog: &[HotelRecord], query: &Query) -> ResultState {
    let price_range = query.price_range.normalized();

    let mut filtered: Vec<HotelRecord> = catalog
        .iter()
        .filter(|record| matches(query, &price_range, record))
        .cloned()
        .collect();

    sort_records(&mut filtered, query.sort);

    let visible = filtered.len().min(PAGE_SIZE);
    let has_more = visible < filtered.len();
    debug!(
        total = filtered.len(),
        visible,
        sort = ?query.sort,
        "recomputed listing"
    );

    ResultState {
        filtered,
        visible,
        page: 1,
        has_more,
    }
}

fn matches(query: &Query, price_range: &PriceRange, record: &HotelRecord) -> bool {
    if let Some(city) = &query.city {
        if record.city != *city {
            return false;
        }
    }

    if !query.keyword.is_empty() {
        let needle = query.keyword.to_lowercase();
        if !record.name.to_lowercase().contains(&needle)
            && !record.address.to_lowercase().contains(&needle)
        {
            return false;
        }
    }

    if !price_range.contains(record.price) {
        return false;
    }

    if !query.stars.is_empty() && !query.stars.contains(&record.star_bucket()) {
        return false;
    }

    true
}

// All sorts are stable: equal-key records keep their catalog order, so
// re-sorting with an unchanged selector never visibly reorders anything.
fn sort_records(records: &mut [HotelRecord], sort: SortBy) {
    match sort {
        SortBy::PriceAsc => records.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortBy::PriceDesc => records.sort_by(|a, b| b.price.total_cmp(&a.price)),
        // Default intentionally mirrors Rating: descending by rating.
        SortBy::Default | SortBy::Rating => {
            records.sort_by(|a, b| b.rating.total_cmp(&a.rating))
        }
    }
}
