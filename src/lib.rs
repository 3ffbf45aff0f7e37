// EasyStay hotel-booking core: the consumer search/listing/booking flow and
// the management console behind it. All data is in-memory mock data; the
// source traits mark where a real supplier backend would plug in.

pub mod admin;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod detail;
pub mod engine;
pub mod listing;
pub mod query;

// Re-export key types for convenience
pub use admin::{AdminError, HotelDraft, ReviewBoard, ReviewQuery, ReviewStatus, TablePage};
pub use auth::{AdminDirectory, AuthError, Session};
pub use cache::{CacheConfig, CacheStats, CatalogCache};
pub use catalog::{
    mock_catalog, CatalogSource, FetchError, HotelCategory, HotelRecord, MockCatalogSource,
};
pub use detail::{BookingError, BookingSelection, HotelDetail, RoomOffer};
pub use engine::{recompute, ResultState, PAGE_SIZE};
pub use listing::{ListingScreen, LoadOutcome, LoadTicket};
pub use query::{PriceRange, Query, QueryError, SearchParams, SortBy, StayDates};
