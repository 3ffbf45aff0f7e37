// Hotel catalog: the record type, the source trait, and the mock data
// generator that stands in for a supplier feed in this demo.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::StayDates;

// Sentinel city meaning "no scoping" when fetching from a source.
pub const CITY_ALL: &str = "all";

// Errors surfaced by catalog sources. Every variant is retryable: the
// listing keeps its current results on failure and the caller may try again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        true
    }
}

// Category labels shown on hotel cards. The label set is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HotelCategory {
    #[serde(rename = "经济型")]
    Economy,
    #[serde(rename = "舒适型")]
    Comfort,
    #[serde(rename = "豪华型")]
    Luxury,
    #[serde(rename = "商务型")]
    Business,
}

impl HotelCategory {
    pub const ALL: [HotelCategory; 4] = [
        HotelCategory::Economy,
        HotelCategory::Comfort,
        HotelCategory::Luxury,
        HotelCategory::Business,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HotelCategory::Economy => "经济型",
            HotelCategory::Comfort => "舒适型",
            HotelCategory::Luxury => "豪华型",
            HotelCategory::Business => "商务型",
        }
    }
}

// One hotel as the consumer flow sees it. Immutable for the lifetime of a
// query cycle; the engine never mutates catalog records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelRecord {
    pub id: u32,
    pub name: String,
    pub city: String,
    pub address: String,
    // In [1.0, 5.0], one decimal.
    pub rating: f64,
    pub review_count: u32,
    pub price: f64,
    pub original_price: f64,
    // Advertised flat markdown ("立减N元").
    pub discount: f64,
    pub category: HotelCategory,
    // Display order is insertion order; matching is membership only.
    pub facilities: Vec<String>,
    // Non-empty, ordered.
    pub images: Vec<String>,
    // Display-only; the listing engine does not sort on distance.
    pub distance_km: f64,
}

impl HotelRecord {
    // Star bucket used by the star filter: the integer part of the rating.
    pub fn star_bucket(&self) -> u8 {
        self.rating.floor() as u8
    }

    pub fn has_facility(&self, facility: &str) -> bool {
        self.facilities.iter().any(|f| f == facility)
    }
}

// Supplies the ordered record sequence the engine filters against. The
// in-repo implementation is the mock generator below; a production system
// would put a paged supplier query behind the same trait.
#[async_trait]
pub trait CatalogSource: Send + Sync + 'static {
    async fn fetch(&self, city: &str, stay: &StayDates) -> Result<Vec<HotelRecord>, FetchError>;
}

pub struct MockCatalogSource {
    records: Vec<HotelRecord>,
}

impl MockCatalogSource {
    pub fn new(records: Vec<HotelRecord>) -> Self {
        Self { records }
    }

    pub fn with_mock_data() -> Self {
        Self::new(mock_catalog())
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    async fn fetch(&self, city: &str, _stay: &StayDates) -> Result<Vec<HotelRecord>, FetchError> {
        if city == CITY_ALL {
            return Ok(self.records.clone());
        }
        Ok(self
            .records
            .iter()
            .filter(|r| r.city == city)
            .cloned()
            .collect())
    }
}

pub const MOCK_CITIES: [&str; 6] = ["北京", "上海", "广州", "深圳", "杭州", "成都"];

const NAME_STEMS: [&str; 6] = [
    "王府井大酒店",
    "外滩华尔道夫",
    "珠江新城威斯汀",
    "西湖国宾馆",
    "春熙路君悦",
    "大唐不夜城酒店",
];

const STREET_KINDS: [&str; 3] = ["区", "路", "大街"];

const FACILITY_POOL: [&str; 8] = [
    "免费WiFi",
    "停车场",
    "游泳池",
    "健身房",
    "餐厅",
    "商务中心",
    "会议室",
    "洗衣服务",
];

const MOCK_SEED: u64 = 20240227;
const MOCK_CATALOG_SIZE: usize = 50;

// Deterministic generator: the same seed always yields the same catalog, so
// tests and the demo binary see identical data run to run.
pub fn generate_catalog(count: usize, seed: u64) -> Vec<HotelRecord> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|i| {
            let city = MOCK_CITIES[i % MOCK_CITIES.len()];
            let facility_count = rng.gen_range(3..=7);
            HotelRecord {
                id: (i + 1) as u32,
                name: format!("{}{}{}号店", city, NAME_STEMS[i % NAME_STEMS.len()], i + 1),
                city: city.to_string(),
                address: format!("{}{}{}号", city, STREET_KINDS[i % STREET_KINDS.len()], i + 1),
                rating: f64::from(rng.gen_range(40..=50u32)) / 10.0,
                review_count: rng.gen_range(100..1100),
                price: f64::from(rng.gen_range(200..600u32)),
                original_price: f64::from(rng.gen_range(600..800u32)),
                discount: f64::from(rng.gen_range(20..100u32)),
                category: HotelCategory::ALL[i % HotelCategory::ALL.len()],
                facilities: FACILITY_POOL[..facility_count]
                    .iter()
                    .map(|f| f.to_string())
                    .collect(),
                images: vec![
                    format!(
                        "https://images.unsplash.com/photo-1566073771259-6a8506099945?w=400&h=300&fit=crop&{}",
                        i
                    ),
                    format!(
                        "https://images.unsplash.com/photo-1551882547-ff40c63fe5fa?w=400&h=300&fit=crop&{}",
                        i
                    ),
                ],
                distance_km: f64::from(rng.gen_range(0..100u32)) / 10.0,
            }
        })
        .collect()
}

// The 50-record list the consumer flow browses.
pub fn mock_catalog() -> Vec<HotelRecord> {
    generate_catalog(MOCK_CATALOG_SIZE, MOCK_SEED)
}
