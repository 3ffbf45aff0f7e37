// Management console: the review/approval dashboard over the hotel
// inventory, and the draft editor behind the hotel-edit form.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::catalog::MOCK_CITIES;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminError {
    #[error("Unknown hotel: {0}")]
    UnknownHotel(u32),

    #[error("Hotel {id} is already {status:?}")]
    InvalidTransition { id: u32, status: ReviewStatus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Published,
    Offline,
}

impl ReviewStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "待审核",
            ReviewStatus::Published => "已发布",
            ReviewStatus::Offline => "已下线",
        }
    }
}

// One row of the review table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: u32,
    pub name: String,
    pub city: String,
    pub status: ReviewStatus,
    pub rating: f64,
    pub price: f64,
    pub room_count: u32,
    pub created: NaiveDate,
    pub updated: NaiveDate,
}

// Dashboard filter criteria. Every field is optional in the sense that its
// empty/None form keeps all records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewQuery {
    // Case-insensitive over name and city.
    pub keyword: String,
    pub status: Option<ReviewStatus>,
    pub city: Option<String>,
    // Created strictly inside the bounds, matching the console's picker.
    pub created_between: Option<(NaiveDate, NaiveDate)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablePage {
    pub current: usize,
    pub page_size: usize,
}

impl Default for TablePage {
    fn default() -> Self {
        Self {
            current: 1,
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewPage {
    pub items: Vec<ReviewRecord>,
    pub total: usize,
    pub current: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewStats {
    pub total: usize,
    pub pending: usize,
    pub published: usize,
    pub offline: usize,
}

pub struct ReviewBoard {
    records: Vec<ReviewRecord>,
}

impl ReviewBoard {
    pub fn new(records: Vec<ReviewRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    // Filters and pages the table. Pure over the current data set; a new
    // search always starts from page 1 in the console, which is the
    // caller's TablePage::default().
    pub fn search(&self, query: &ReviewQuery, page: TablePage) -> ReviewPage {
        let keyword = query.keyword.to_lowercase();

        let matched: Vec<&ReviewRecord> = self
            .records
            .iter()
            .filter(|record| {
                if !keyword.is_empty()
                    && !record.name.to_lowercase().contains(&keyword)
                    && !record.city.to_lowercase().contains(&keyword)
                {
                    return false;
                }
                if let Some(status) = query.status {
                    if record.status != status {
                        return false;
                    }
                }
                if let Some(city) = &query.city {
                    if record.city != *city {
                        return false;
                    }
                }
                if let Some((start, end)) = query.created_between {
                    if record.created <= start || record.created >= end {
                        return false;
                    }
                }
                true
            })
            .collect();

        let total = matched.len();
        let page_size = page.page_size.max(1);
        let current = page.current.max(1);
        let total_pages = (total + page_size - 1) / page_size;
        let items = matched
            .into_iter()
            .skip((current - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect();

        ReviewPage {
            items,
            total,
            current,
            page_size,
            total_pages,
        }
    }

    // Review passed: publish. Republishing is rejected so the console can
    // tell a stale button press from a real decision.
    pub fn approve(&mut self, id: u32) -> Result<(), AdminError> {
        let record = self.record_mut(id)?;
        if record.status == ReviewStatus::Published {
            return Err(AdminError::InvalidTransition {
                id,
                status: record.status,
            });
        }
        record.status = ReviewStatus::Published;
        info!(id, "hotel approved and published");
        Ok(())
    }

    pub fn take_offline(&mut self, id: u32) -> Result<(), AdminError> {
        let record = self.record_mut(id)?;
        if record.status == ReviewStatus::Offline {
            return Err(AdminError::InvalidTransition {
                id,
                status: record.status,
            });
        }
        record.status = ReviewStatus::Offline;
        info!(id, "hotel taken offline");
        Ok(())
    }

    // Counts over the full data set, not the filtered view.
    pub fn stats(&self) -> ReviewStats {
        let count =
            |status| self.records.iter().filter(|r| r.status == status).count();
        ReviewStats {
            total: self.records.len(),
            pending: count(ReviewStatus::Pending),
            published: count(ReviewStatus::Published),
            offline: count(ReviewStatus::Offline),
        }
    }

    fn record_mut(&mut self, id: u32) -> Result<&mut ReviewRecord, AdminError> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AdminError::UnknownHotel(id))
    }
}

const REVIEW_NAME_STEMS: [&str; 6] = ["王府井", "外滩", "珠江新城", "西湖", "春熙路", "大唐不夜城"];
const REVIEW_MOCK_SIZE: usize = 35;
const REVIEW_MOCK_SEED: u64 = 35;

// Deterministic review inventory relative to `today`, mirroring the demo
// console's data shape.
pub fn mock_review_data(today: NaiveDate) -> Vec<ReviewRecord> {
    let statuses = [
        ReviewStatus::Pending,
        ReviewStatus::Published,
        ReviewStatus::Offline,
    ];
    let mut rng = StdRng::seed_from_u64(REVIEW_MOCK_SEED);

    (0..REVIEW_MOCK_SIZE)
        .map(|i| {
            let city = MOCK_CITIES[i % MOCK_CITIES.len()];
            ReviewRecord {
                id: (i + 1) as u32,
                name: format!(
                    "{}{}大酒店{}号店",
                    city,
                    REVIEW_NAME_STEMS[i % REVIEW_NAME_STEMS.len()],
                    i + 1
                ),
                city: city.to_string(),
                status: statuses[i % statuses.len()],
                rating: f64::from(rng.gen_range(35..=50u32)) / 10.0,
                price: f64::from(rng.gen_range(200..600u32)),
                room_count: rng.gen_range(20..70),
                created: today - Duration::days(rng.gen_range(0..30)),
                updated: today - Duration::days(rng.gen_range(0..7)),
            }
        })
        .collect()
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

// Row of the room-type table inside the edit form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDraft {
    pub id: u32,
    pub name: String,
    pub price: f64,
    // Discount factor, e.g. 0.88 for 8.8折.
    pub discount: Option<f64>,
}

// Working state behind the hotel-edit form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelDraft {
    pub name: String,
    pub city: String,
    pub address: String,
    pub open_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub description: String,
    pub images: Vec<String>,
    pub attractions: Vec<String>,
    pub transport: String,
    pub rooms: Vec<RoomDraft>,
}

impl HotelDraft {
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.name.trim().is_empty() {
            return Err(DraftError::MissingField("name"));
        }
        if self.city.trim().is_empty() {
            return Err(DraftError::MissingField("city"));
        }
        if self.address.trim().is_empty() {
            return Err(DraftError::MissingField("address"));
        }
        Ok(())
    }

    // Ids survive removals, so a fresh row never collides with an old one.
    pub fn add_room(&mut self, name: impl Into<String>, price: f64, discount: Option<f64>) -> u32 {
        let id = self.rooms.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        self.rooms.push(RoomDraft {
            id,
            name: name.into(),
            price,
            discount,
        });
        id
    }

    pub fn remove_room(&mut self, id: u32) -> bool {
        let before = self.rooms.len();
        self.rooms.retain(|room| room.id != id);
        self.rooms.len() != before
    }
}
