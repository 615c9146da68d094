//! The search pipeline turns one (source, destination) selection into a
//! bounded ranked list of route candidates:
//!
//! 1. Validate the selection against the graph.
//! 2. Enumerate every simple path between the endpoints (depth-first
//!    backtracking, deterministic neighbor order, bounded by the budget).
//! 3. Aggregate each path into a scored candidate as it is discovered.
//! 4. Keep the K cheapest candidates, ties broken by discovery order.
//!
//! Paths are streamed straight from the enumerator into the ranked list, so
//! memory stays proportional to K and the current trail, not to the number of
//! paths in the graph.

pub(crate) mod enumerate;
pub(crate) mod rank;

use tracing::debug;

use crate::search::enumerate::{Enumerator, Stop};
use crate::search::rank::TopK;
use crate::service::CancelToken;
use crate::{Graph, InvalidSelection, PlaceId, RouteCandidate, SearchBudget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of best candidates to keep.
    pub k: usize,
    /// Bound on enumeration work for a single search.
    pub budget: SearchBudget,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            k: 3,
            budget: SearchBudget::default(),
        }
    }
}

/// How a search run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SearchOutcome {
    /// The search space was fully enumerated; the ranking is exact.
    Complete,
    /// The budget ran out first; the ranking covers only the paths discovered
    /// so far. Retrying with a larger budget may find cheaper routes.
    Truncated,
    /// The search was superseded by a newer selection.
    Cancelled,
}

/// Ranked result of one search, together with how the run ended.
///
/// An empty candidate list with a `Complete` outcome means the endpoints are
/// disconnected; that is a normal result, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSearch {
    /// Best candidates, ascending by total distance.
    pub candidates: Vec<RouteCandidate>,
    pub outcome: SearchOutcome,
}

/// Finds the `k` cheapest simple paths between two places.
///
/// Fails with [`InvalidSelection`] before any search work if the endpoints
/// coincide or either is not part of the graph.
pub fn find_routes(
    graph: &Graph,
    source: &PlaceId,
    destination: &PlaceId,
    config: &SearchConfig,
) -> Result<RouteSearch, InvalidSelection> {
    find_routes_with_token(graph, source, destination, config, &CancelToken::never())
}

/// Like [`find_routes`] but checks the token at every node visit, so a search
/// superseded by a newer selection stops cooperatively instead of running to
/// completion.
pub fn find_routes_with_token(
    graph: &Graph,
    source: &PlaceId,
    destination: &PlaceId,
    config: &SearchConfig,
    token: &CancelToken,
) -> Result<RouteSearch, InvalidSelection> {
    if source == destination {
        return Err(InvalidSelection::SameEndpoints(source.clone()));
    }

    // Re-borrow the ids from the graph so the enumerator can keep references
    // in its visited set for the whole run.
    let source = match graph.place(source) {
        Some(place) => &place.id,
        None => return Err(InvalidSelection::UnknownPlace(source.clone())),
    };
    let destination = match graph.place(destination) {
        Some(place) => &place.id,
        None => return Err(InvalidSelection::UnknownPlace(destination.clone())),
    };

    debug!("Searching routes {source} -> {destination} with {config:?}");

    let mut ranked = TopK::new(config.k);
    let mut enumerator = Enumerator::new(graph, destination, config.budget, token.clone());
    let run = enumerator.run(source, &mut |trail| {
        ranked.insert(rank::aggregate(graph, trail));
    });

    let outcome = match run {
        Ok(()) => SearchOutcome::Complete,
        Err(Stop::Budget) => SearchOutcome::Truncated,
        Err(Stop::Cancelled) => SearchOutcome::Cancelled,
    };

    let candidates = ranked.into_ranked();
    debug!(
        "Search {source} -> {destination} ended {outcome} with {} candidates",
        candidates.len()
    );

    Ok(RouteSearch {
        candidates,
        outcome,
    })
}
