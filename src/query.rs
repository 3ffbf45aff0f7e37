// Search parameters and the listing query. URL parameters arrive from the
// home screen; the listing screen owns a Query and re-derives its results
// whenever any part of it changes.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_CITY: &str = "北京";

// Placeholder stay used when the URL carries no dates (or a broken pair).
const DEFAULT_CHECK_IN: (i32, u32, u32) = (2024, 2, 27);
const DEFAULT_CHECK_OUT: (i32, u32, u32) = (2024, 2, 28);

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum QueryError {
    #[error("Invalid price range: min {min} is greater than max {max}")]
    InvalidPriceRange { min: f64, max: f64 },

    #[error("Invalid stay: check-out {check_out} must be after check-in {check_in}")]
    InvalidStay {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
}

// A validated check-in/check-out pair. Date ordering is enforced here, once;
// the home-screen search and the booking quote both construct this type
// instead of re-checking the invariant locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDates {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayDates {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, QueryError> {
        if check_out <= check_in {
            return Err(QueryError::InvalidStay {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

impl Default for StayDates {
    fn default() -> Self {
        let (iy, im, id) = DEFAULT_CHECK_IN;
        let (oy, om, od) = DEFAULT_CHECK_OUT;
        Self {
            check_in: NaiveDate::from_ymd_opt(iy, im, id).unwrap(),
            check_out: NaiveDate::from_ymd_opt(oy, om, od).unwrap(),
        }
    }
}

// What the home screen hands to the listing screen via the URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub city: String,
    pub keyword: String,
    pub stay: StayDates,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            city: DEFAULT_CITY.to_string(),
            keyword: String::new(),
            stay: StayDates::default(),
        }
    }
}

impl SearchParams {
    // Parses a raw `a=b&c=d` query string. Unknown keys are ignored.
    pub fn from_query_str(raw: &str) -> Self {
        Self::from_pairs(raw.split('&').filter_map(|kv| kv.split_once('=')))
    }

    // Absent or malformed values fall back to the defaults; a reversed date
    // pair should have been rejected upstream, so it is dropped with a
    // warning rather than carried into the listing.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut params = Self::default();
        let mut check_in: Option<NaiveDate> = None;
        let mut check_out: Option<NaiveDate> = None;

        for (key, value) in pairs {
            match key {
                "city" if !value.is_empty() => params.city = value.to_string(),
                "keyword" => params.keyword = value.to_string(),
                "checkIn" => check_in = value.parse().ok(),
                "checkOut" => check_out = value.parse().ok(),
                _ => {}
            }
        }

        if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
            match StayDates::new(check_in, check_out) {
                Ok(stay) => params.stay = stay,
                Err(err) => {
                    warn!(%err, "dropping invalid stay dates from URL");
                }
            }
        }

        params
    }
}

// Inclusive price bound. Default is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }.normalized()
    }

    // A reversed pair is swapped rather than silently matching nothing.
    pub fn normalized(self) -> Self {
        if self.min > self.max {
            warn!(min = self.min, max = self.max, "price range reversed, swapping bounds");
            Self {
                min: self.max,
                max: self.min,
            }
        } else {
            self
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: f64::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    // Currently indistinguishable from Rating; kept as a separate selector
    // value because the quick-filter widget emits it.
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    Rating,
}

// The combined filter/sort criteria for one listing. The screen recreates
// the whole value on any input change, which invalidates derived state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    // None keeps every city.
    pub city: Option<String>,
    // Case-insensitive substring over name and address; empty keeps all.
    pub keyword: String,
    pub price_range: PriceRange,
    // Star buckets (floor of rating) to include; empty set keeps all.
    pub stars: BTreeSet<u8>,
    pub sort: SortBy,
}

impl Query {
    pub fn from_search(params: &SearchParams) -> Self {
        Self {
            city: Some(params.city.clone()),
            keyword: params.keyword.clone(),
            ..Self::default()
        }
    }

    // Strict counterpart of PriceRange::normalized for callers that want a
    // hard rejection instead of a repaired value.
    pub fn validate(&self) -> Result<(), QueryError> {
        if !self.price_range.is_valid() {
            return Err(QueryError::InvalidPriceRange {
                min: self.price_range.min,
                max: self.price_range.max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn stay_dates_reject_reversed_pair() {
        let err = StayDates::new(date(2024, 3, 1), date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, QueryError::InvalidStay { .. }));

        let err = StayDates::new(date(2024, 3, 2), date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, QueryError::InvalidStay { .. }));
    }

    #[test]
    fn stay_dates_count_nights() {
        let stay = StayDates::new(date(2024, 3, 1), date(2024, 3, 4)).unwrap();
        assert_eq!(stay.nights(), 3);
        assert_eq!(StayDates::default().nights(), 1);
    }

    #[test]
    fn params_default_when_absent() {
        let params = SearchParams::from_query_str("");
        assert_eq!(params.city, DEFAULT_CITY);
        assert_eq!(params.keyword, "");
        assert_eq!(params.stay, StayDates::default());
    }

    #[test]
    fn params_parse_from_url() {
        let params =
            SearchParams::from_query_str("city=上海&checkIn=2024-05-01&checkOut=2024-05-03&keyword=外滩");
        assert_eq!(params.city, "上海");
        assert_eq!(params.keyword, "外滩");
        assert_eq!(params.stay.nights(), 2);
    }

    #[test]
    fn params_ignore_unknown_keys_and_bad_dates() {
        let params = SearchParams::from_query_str("city=杭州&foo=bar&checkIn=garbage&checkOut=2024-05-03");
        assert_eq!(params.city, "杭州");
        // Half a date pair falls back to the placeholder stay.
        assert_eq!(params.stay, StayDates::default());
    }

    #[test]
    fn params_drop_reversed_url_dates() {
        let params = SearchParams::from_query_str("checkIn=2024-05-03&checkOut=2024-05-01");
        assert_eq!(params.stay, StayDates::default());
    }

    #[test]
    fn price_range_swaps_reversed_bounds() {
        let range = PriceRange::new(800.0, 200.0);
        assert_eq!(range.min, 200.0);
        assert_eq!(range.max, 800.0);
        assert!(range.contains(200.0));
        assert!(range.contains(800.0));
        assert!(!range.contains(801.0));
    }

    #[test]
    fn validate_rejects_reversed_literal_range() {
        let query = Query {
            price_range: PriceRange {
                min: 500.0,
                max: 100.0,
            },
            ..Query::default()
        };
        assert_eq!(
            query.validate(),
            Err(QueryError::InvalidPriceRange {
                min: 500.0,
                max: 100.0
            })
        );

        assert!(Query::default().validate().is_ok());
    }

    #[test]
    fn query_from_search_pins_the_city() {
        let params = SearchParams {
            city: "成都".to_string(),
            keyword: "春熙路".to_string(),
            stay: StayDates::default(),
        };
        let query = Query::from_search(&params);
        assert_eq!(query.city.as_deref(), Some("成都"));
        assert_eq!(query.keyword, "春熙路");
        assert_eq!(query.sort, SortBy::Default);
        assert!(query.stars.is_empty());
    }

    #[test]
    fn sort_by_serializes_as_widget_values() {
        assert_eq!(serde_json::to_string(&SortBy::PriceAsc).unwrap(), "\"priceAsc\"");
        assert_eq!(serde_json::to_string(&SortBy::Default).unwrap(), "\"default\"");
        assert_eq!(serde_json::to_string(&SortBy::Rating).unwrap(), "\"rating\"");
    }
}
