use rustc_hash::FxHashSet;
use tracing::debug;

use crate::service::CancelToken;
use crate::{Graph, PlaceId};

/// Bound on the amount of enumeration work a single search may perform.
///
/// Simple-path enumeration is combinatorial (worst case factorial in dense
/// graphs), so an unbounded search over the wrong input can effectively hang.
/// Either limit stops the search early with a `Truncated` outcome; the ranked
/// candidates gathered up to that point are still returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    /// Maximum number of node visits (including revisits on backtracking).
    pub max_nodes_explored: usize,
    /// Maximum number of complete paths emitted.
    pub max_paths: usize,
}

impl SearchBudget {
    pub const UNBOUNDED: Self = Self {
        max_nodes_explored: usize::MAX,
        max_paths: usize::MAX,
    };
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            max_nodes_explored: 1 << 20,
            max_paths: 1 << 16,
        }
    }
}

/// Why enumeration stopped before the search space was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stop {
    Budget,
    Cancelled,
}

/// Depth-first backtracking enumeration of every simple path between two
/// places.
///
/// The `visited` set and the edge trail are exclusively owned by one
/// enumerator and mutated/restored in strict LIFO order, so concurrent
/// searches over the same shared graph never race. Paths are streamed to the
/// sink as trails of edge indexes; nothing is materialized beyond the current
/// trail.
pub(crate) struct Enumerator<'g> {
    graph: &'g Graph,
    destination: &'g PlaceId,
    budget: SearchBudget,
    token: CancelToken,
    visited: FxHashSet<&'g PlaceId>,
    trail: Vec<usize>,
    nodes_explored: usize,
    paths_emitted: usize,
}

impl<'g> Enumerator<'g> {
    pub(crate) fn new(
        graph: &'g Graph,
        destination: &'g PlaceId,
        budget: SearchBudget,
        token: CancelToken,
    ) -> Self {
        Self {
            graph,
            destination,
            budget,
            token,
            visited: FxHashSet::default(),
            trail: vec![],
            nodes_explored: 0,
            paths_emitted: 0,
        }
    }

    /// Runs the enumeration from `source`, streaming each complete path to
    /// `sink`. Returns `Err` if the search stopped before exhausting the
    /// search space.
    pub(crate) fn run(
        &mut self,
        source: &'g PlaceId,
        sink: &mut dyn FnMut(&[usize]),
    ) -> Result<(), Stop> {
        self.visited.insert(source);
        let result = self.explore(source, sink);

        if let Err(stop) = result {
            debug!(
                "Enumeration stopped ({stop:?}) after {} nodes and {} paths",
                self.nodes_explored, self.paths_emitted
            );
        }

        result
    }

    fn explore(&mut self, current: &'g PlaceId, sink: &mut dyn FnMut(&[usize])) -> Result<(), Stop> {
        // The per-node boundary: both cancellation and the node budget are
        // checked exactly once per visit.
        if self.token.is_cancelled() {
            return Err(Stop::Cancelled);
        }

        self.nodes_explored += 1;
        if self.nodes_explored > self.budget.max_nodes_explored {
            return Err(Stop::Budget);
        }

        let graph = self.graph;
        for (index, _, other) in graph.neighbor_entries(current) {
            if other == self.destination {
                self.trail.push(index);
                sink(&self.trail);
                self.trail.pop();

                self.paths_emitted += 1;
                if self.paths_emitted >= self.budget.max_paths {
                    return Err(Stop::Budget);
                }
            } else if !self.visited.contains(other) {
                self.visited.insert(other);
                self.trail.push(index);

                let explored = self.explore(other, sink);

                self.trail.pop();
                self.visited.remove(other);
                explored?;
            }
        }

        Ok(())
    }
}
