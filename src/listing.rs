// Listing screen state machine. The screen is Idle or Loading; a query
// change supersedes any in-flight load, and a stale completion is discarded
// without touching the newer results.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::catalog::{FetchError, HotelRecord};
use crate::engine::{recompute, ResultState};
use crate::query::{Query, QueryError, SearchParams};

// Matches the simulated network delay of the original flow.
pub const SIMULATED_LATENCY: Duration = Duration::from_millis(500);

// Tags an in-flight load with the query generation it was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    // Appended this many records to the visible list (0 when there was
    // nothing to load).
    Applied(usize),
    // The query changed while the load was in flight; nothing was applied.
    Stale,
}

// Per-query-lifetime state of the hotel list screen. All mutation happens
// through &mut self on one logical task; the only suspension point is the
// simulated latency inside load_more.
pub struct ListingScreen {
    catalog: Arc<Vec<HotelRecord>>,
    query: Query,
    state: ResultState,
    generation: u64,
    loading: bool,
    latency: Duration,
    fail_next_loads: usize,
}

impl ListingScreen {
    // Entry point for URL-carried parameters from the home screen. Params
    // always produce a valid query, so this cannot fail.
    pub fn new(catalog: Vec<HotelRecord>, params: &SearchParams) -> Self {
        let query = Query::from_search(params);
        let catalog = Arc::new(catalog);
        let state = recompute(&catalog, &query);
        Self {
            catalog,
            query,
            state,
            generation: 0,
            loading: false,
            latency: SIMULATED_LATENCY,
            fail_next_loads: 0,
        }
    }

    pub fn with_query(catalog: Vec<HotelRecord>, query: Query) -> Result<Self, QueryError> {
        let mut screen = Self::new(catalog, &SearchParams::default());
        screen.set_query(query)?;
        Ok(screen)
    }

    pub fn state(&self) -> &ResultState {
        &self.state
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_latency(&mut self, latency: Duration) {
        self.latency = latency;
    }

    // Makes the next `count` load_more calls fail with a retryable transport
    // error, mirroring a flaky backend.
    pub fn fail_next_loads(&mut self, count: usize) {
        self.fail_next_loads = count;
    }

    // Any filter/sort/URL change lands here: re-derive everything from the
    // catalog snapshot, reset pagination, and cancel a pending load by
    // advancing the generation.
    pub fn set_query(&mut self, query: Query) -> Result<(), QueryError> {
        query.validate()?;
        self.generation += 1;
        if self.loading {
            debug!(generation = self.generation, "query change cancels pending load");
            self.loading = false;
        }
        self.state = recompute(&self.catalog, &query);
        self.query = query;
        Ok(())
    }

    // Scroll threshold reached. Returns None when there is nothing left or a
    // load is already in flight (at most one at a time).
    pub fn begin_load_more(&mut self) -> Option<LoadTicket> {
        if self.loading || !self.state.has_more() {
            return None;
        }
        self.loading = true;
        Some(LoadTicket {
            generation: self.generation,
        })
    }

    // Load completion. A ticket from a superseded query is discarded
    // silently; the state stays exactly as the newer recompute produced it.
    pub fn commit_load(&mut self, ticket: LoadTicket) -> LoadOutcome {
        if ticket.generation != self.generation {
            return LoadOutcome::Stale;
        }
        self.loading = false;
        LoadOutcome::Applied(self.state.load_more())
    }

    // Abandons an in-flight load after a transport failure. Visible results
    // and has_more are untouched so the caller can retry.
    pub fn abort_load(&mut self, ticket: LoadTicket) {
        if ticket.generation == self.generation {
            self.loading = false;
        }
    }

    // Convenience driver: begin, wait out the simulated latency, commit.
    pub async fn load_more(&mut self) -> Result<LoadOutcome, FetchError> {
        let Some(ticket) = self.begin_load_more() else {
            return Ok(LoadOutcome::Applied(0));
        };

        if self.latency > Duration::ZERO {
            tokio::time::sleep(self.latency).await;
        }

        if self.fail_next_loads > 0 {
            self.fail_next_loads -= 1;
            self.abort_load(ticket);
            warn!("simulated transport failure during load-more");
            return Err(FetchError::Network("simulated transport failure".to_string()));
        }

        Ok(self.commit_load(ticket))
    }
}
