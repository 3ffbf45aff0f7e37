// Hotel detail view model and the booking quote. Room types render cheapest
// first; the quote prices a validated stay, so date ordering is already
// guaranteed by the time a selection reaches this module.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::catalog::HotelRecord;
use crate::query::StayDates;

pub const MIN_ROOMS: u32 = 1;
pub const MAX_ROOMS: u32 = 5;
pub const MIN_GUESTS: u32 = 1;
pub const MAX_GUESTS: u32 = 10;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingError {
    #[error("Unknown room type: {0}")]
    UnknownRoom(u32),

    #[error("Room count {0} out of range ({MIN_ROOMS}-{MAX_ROOMS})")]
    RoomCount(u32),

    #[error("Guest count {0} out of range ({MIN_GUESTS}-{MAX_GUESTS})")]
    GuestCount(u32),
}

// A bookable room type on the detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomOffer {
    pub id: u32,
    pub name: String,
    pub facilities: Vec<String>,
    pub price: f64,
    pub original_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookingSelection {
    pub room_id: u32,
    pub rooms: u32,
    pub guests: u32,
    pub stay: StayDates,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingQuote {
    pub room_id: u32,
    pub room_name: String,
    pub nights: i64,
    pub rooms: u32,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelDetail {
    pub record: HotelRecord,
    pub rooms: Vec<RoomOffer>,
}

impl HotelDetail {
    pub fn new(record: HotelRecord, rooms: Vec<RoomOffer>) -> Self {
        Self { record, rooms }
    }

    // Room types ordered cheapest first; equal prices keep insertion order.
    pub fn rooms_by_price(&self) -> Vec<&RoomOffer> {
        let mut rooms: Vec<&RoomOffer> = self.rooms.iter().collect();
        rooms.sort_by(|a, b| a.price.total_cmp(&b.price));
        rooms
    }

    pub fn room(&self, id: u32) -> Option<&RoomOffer> {
        self.rooms.iter().find(|room| room.id == id)
    }

    // Prices a selection: room price x rooms x nights. Nights come from the
    // validated stay, never from an ad hoc date subtraction.
    pub fn quote(&self, selection: &BookingSelection) -> Result<BookingQuote, BookingError> {
        if !(MIN_ROOMS..=MAX_ROOMS).contains(&selection.rooms) {
            return Err(BookingError::RoomCount(selection.rooms));
        }
        if !(MIN_GUESTS..=MAX_GUESTS).contains(&selection.guests) {
            return Err(BookingError::GuestCount(selection.guests));
        }
        let room = self
            .room(selection.room_id)
            .ok_or(BookingError::UnknownRoom(selection.room_id))?;

        let nights = selection.stay.nights();
        let total = room.price * f64::from(selection.rooms) * nights as f64;
        debug!(
            hotel = self.record.id,
            room = room.id,
            nights,
            total,
            "priced booking selection"
        );

        Ok(BookingQuote {
            room_id: room.id,
            room_name: room.name.clone(),
            nights,
            rooms: selection.rooms,
            total,
        })
    }
}

// The room types shown on the demo detail page.
pub fn sample_rooms() -> Vec<RoomOffer> {
    vec![
        RoomOffer {
            id: 1,
            name: "高级大床房".to_string(),
            facilities: vec!["免费WiFi".to_string(), "早餐".to_string()],
            price: 599.0,
            original_price: 799.0,
        },
        RoomOffer {
            id: 2,
            name: "豪华双床房".to_string(),
            facilities: vec![
                "免费WiFi".to_string(),
                "早餐".to_string(),
                "海景".to_string(),
            ],
            price: 899.0,
            original_price: 1099.0,
        },
        RoomOffer {
            id: 3,
            name: "行政套房".to_string(),
            facilities: vec![
                "免费WiFi".to_string(),
                "早餐".to_string(),
                "海景".to_string(),
                "行政酒廊".to_string(),
            ],
            price: 1299.0,
            original_price: 1599.0,
        },
    ]
}
