// Drives the consumer flow end to end: home-screen search parameters, the
// listing with a sort change, load-more to exhaustion, and a booking quote.

use std::time::Duration;

use anyhow::Result;

use easystay::detail::sample_rooms;
use easystay::{
    mock_catalog, BookingSelection, HotelDetail, ListingScreen, Query, SearchParams, SortBy,
    StayDates,
};

#[tokio::main]
async fn main() -> Result<()> {
    let params = SearchParams::from_query_str("city=北京&checkIn=2024-02-27&checkOut=2024-02-28");
    let mut screen = ListingScreen::new(mock_catalog(), &params);
    screen.set_latency(Duration::from_millis(50));

    println!(
        "{} hotels in {}, showing {}",
        screen.state().total(),
        params.city,
        screen.state().displayed().len()
    );

    // Cheapest-first, then scroll to the end of the list.
    let query = Query {
        sort: SortBy::PriceAsc,
        ..screen.query().clone()
    };
    screen.set_query(query)?;
    while screen.state().has_more() {
        let outcome = screen.load_more().await?;
        println!("loaded more: {:?}", outcome);
    }

    println!("{}", serde_json::to_string_pretty(screen.state().displayed())?);

    // Book two nights in the first hotel on the list.
    let top = screen.state().displayed()[0].clone();
    let detail = HotelDetail::new(top, sample_rooms());
    let stay = StayDates::new(
        params.stay.check_in(),
        params.stay.check_in() + chrono::Duration::days(2),
    )?;
    let quote = detail.quote(&BookingSelection {
        room_id: 1,
        rooms: 1,
        guests: 2,
        stay,
    })?;
    println!(
        "{}: {} x {} night(s) = ¥{}",
        detail.record.name, quote.room_name, quote.nights, quote.total
    );

    Ok(())
}
