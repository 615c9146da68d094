use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::{
    Graph, InvalidSelection, PlaceId, RouteSearch, SearchConfig, SearchOutcome,
    find_routes_with_token,
};

/// Cooperative cancellation handle for one search run.
///
/// A token is issued against the generation current at that moment and is
/// considered cancelled as soon as the generation moves on. The enumerator
/// checks the token at every node visit.
#[derive(Debug, Clone)]
pub struct CancelToken {
    current: Arc<AtomicU64>,
    issued: u64,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        Self {
            current: Arc::new(AtomicU64::new(0)),
            issued: 0,
        }
    }

    /// A token that is already cancelled.
    pub fn cancelled() -> Self {
        Self {
            current: Arc::new(AtomicU64::new(1)),
            issued: 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.current.load(Ordering::Relaxed) != self.issued
    }
}

/// Atomic generation counter shared between a [`RouteQueryService`] and the
/// tokens it hands out. Bumping the generation cancels every token issued
/// before the bump; it is safe to bump from another thread while a search is
/// in flight.
#[derive(Debug, Clone, Default)]
pub struct SearchGeneration(Arc<AtomicU64>);

impl SearchGeneration {
    pub fn token(&self) -> CancelToken {
        CancelToken {
            current: Arc::clone(&self.0),
            issued: self.0.load(Ordering::Relaxed),
        }
    }

    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

/// Where the two-click selection flow currently stands.
#[derive(Debug, Clone, PartialEq, strum::Display)]
pub enum SelectionState {
    /// No endpoint picked yet.
    Idle,
    /// A source is picked; the next pick becomes the destination.
    AwaitingDestination { source: PlaceId },
    /// Both endpoints picked, enumeration in flight.
    Searching {
        source: PlaceId,
        destination: PlaceId,
    },
    /// The search finished and its results were delivered.
    Done {
        source: PlaceId,
        destination: PlaceId,
        results: RouteSearch,
    },
}

/// Orchestrates the search pipeline per (source, destination) selection and
/// owns cancellation of superseded requests.
///
/// Picking a new "from" point always restarts the flow and bumps the
/// generation, so a still-running search for the previous selection can never
/// deliver its results: at most one result is installed per selection
/// generation.
#[derive(Debug)]
pub struct RouteQueryService {
    graph: Arc<Graph>,
    config: SearchConfig,
    generation: SearchGeneration,
    state: SelectionState,
}

impl RouteQueryService {
    pub fn new(graph: Arc<Graph>, config: SearchConfig) -> Self {
        Self {
            graph,
            config,
            generation: SearchGeneration::default(),
            state: SelectionState::Idle,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Gets the delivered results, if the flow is in the `Done` state.
    pub fn results(&self) -> Option<&RouteSearch> {
        match &self.state {
            SelectionState::Done { results, .. } => Some(results),
            _ => None,
        }
    }

    /// A handle another thread can use to cancel the in-flight search.
    pub fn cancel_handle(&self) -> SearchGeneration {
        self.generation.clone()
    }

    /// Discards any selection and in-flight search and returns to `Idle`.
    pub fn reset(&mut self) {
        self.generation.bump();
        self.state = SelectionState::Idle;
    }

    /// Applies the two-click selection gesture to `place`.
    ///
    /// From `Idle`, `Searching` or `Done` the place becomes a fresh source and
    /// any previous search is cancelled. From `AwaitingDestination` the place
    /// becomes the destination and the search pipeline runs to completion,
    /// unless the place is the current source, which is rejected with
    /// [`InvalidSelection::SameEndpoints`] and leaves the state unchanged.
    pub fn select(&mut self, place: PlaceId) -> Result<&SelectionState, InvalidSelection> {
        if !self.graph.contains(&place) {
            return Err(InvalidSelection::UnknownPlace(place));
        }

        match &self.state {
            SelectionState::AwaitingDestination { source } if *source == place => {
                Err(InvalidSelection::SameEndpoints(place))
            }
            SelectionState::AwaitingDestination { source } => {
                let source = source.clone();
                let token = self.generation.token();

                self.state = SelectionState::Searching {
                    source: source.clone(),
                    destination: place.clone(),
                };

                match find_routes_with_token(&self.graph, &source, &place, &self.config, &token) {
                    Ok(results) => {
                        self.state = self.deliver(source, place, results, &token);
                        Ok(&self.state)
                    }
                    Err(error) => {
                        self.state = SelectionState::AwaitingDestination { source };
                        Err(error)
                    }
                }
            }
            _ => {
                self.generation.bump();
                self.state = SelectionState::AwaitingDestination { source: place };
                Ok(&self.state)
            }
        }
    }

    /// Installs the results of a finished search, unless the selection was
    /// superseded while it ran, in which case the stale results are discarded
    /// and the flow falls back to waiting for a destination.
    fn deliver(
        &self,
        source: PlaceId,
        destination: PlaceId,
        results: RouteSearch,
        token: &CancelToken,
    ) -> SelectionState {
        if token.is_cancelled() || results.outcome == SearchOutcome::Cancelled {
            debug!("Discarding stale results for {source} -> {destination}");
            return SelectionState::AwaitingDestination { source };
        }

        SelectionState::Done {
            source,
            destination,
            results,
        }
    }
}
