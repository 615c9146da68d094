use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::{DriveEdge, GraphIntegrityError, Place, PlaceId};

/// Immutable snapshot of places and drive edges for one query session.
///
/// The adjacency index is built once from the raw node/edge lists and resolves
/// each incident edge together with its opposite endpoint, so neighbor lookup
/// is O(1) amortized. Edges are indexed in both directions because the stored
/// `from`/`to` orientation is irrelevant for search.
///
/// The graph is read-only after construction and safe to share across
/// concurrent searches without locking.
#[derive(Debug)]
pub struct Graph {
    places: FxHashMap<PlaceId, Place>,
    edges: Vec<DriveEdge>,
    adjacency: FxHashMap<PlaceId, Vec<Neighbor>>,
}

#[derive(Debug, Clone)]
struct Neighbor {
    /// Index into `edges`.
    edge: usize,
    other: PlaceId,
}

impl Graph {
    /// Builds the graph from a snapshot of the backing store, validating it as
    /// a whole: dangling edge endpoints, duplicate ids and negative or
    /// non-finite weights all fail the build.
    pub fn new(places: Vec<Place>, edges: Vec<DriveEdge>) -> Result<Self, GraphIntegrityError> {
        let mut place_index = FxHashMap::default();
        for place in places {
            let id = place.id.clone();
            if place_index.insert(id.clone(), place).is_some() {
                return Err(GraphIntegrityError::DuplicatePlace(id));
            }
        }

        let mut edge_ids = FxHashSet::default();
        for edge in &edges {
            if !edge_ids.insert(edge.id.clone()) {
                return Err(GraphIntegrityError::DuplicateEdge(edge.id.clone()));
            }

            for endpoint in [&edge.from, &edge.to] {
                if !place_index.contains_key(endpoint) {
                    return Err(GraphIntegrityError::DanglingEdge {
                        edge: edge.id.clone(),
                        place: endpoint.clone(),
                    });
                }
            }

            for (field, value) in [("km", edge.km), ("minute", edge.minute)] {
                if !value.is_finite() || value < 0.0 {
                    return Err(GraphIntegrityError::InvalidWeight {
                        edge: edge.id.clone(),
                        field,
                        value,
                    });
                }
            }
        }

        let mut adjacency: FxHashMap<PlaceId, Vec<Neighbor>> = FxHashMap::default();
        for (index, edge) in edges.iter().enumerate() {
            adjacency.entry(edge.from.clone()).or_default().push(Neighbor {
                edge: index,
                other: edge.to.clone(),
            });
            adjacency.entry(edge.to.clone()).or_default().push(Neighbor {
                edge: index,
                other: edge.from.clone(),
            });
        }

        // Ascending edge id fixes the neighbor-iteration order, which in turn
        // fixes path discovery order and the top-K tie-break.
        for neighbors in adjacency.values_mut() {
            neighbors.sort_by(|a, b| edges[a.edge].id.cmp(&edges[b.edge].id));
        }

        debug!(
            "Built graph with {} places and {} edges",
            place_index.len(),
            edges.len()
        );

        Ok(Self {
            places: place_index,
            edges,
            adjacency,
        })
    }

    /// Gets the place with the given id, if it belongs to the graph.
    pub fn place(&self, id: &PlaceId) -> Option<&Place> {
        self.places.get(id)
    }

    pub fn contains(&self, id: &PlaceId) -> bool {
        self.places.contains_key(id)
    }

    /// Gets an iterator over the incident edges of a place, each paired with
    /// the endpoint on the other side. Ordered ascending by edge id.
    /// Returns an empty iterator for an isolated or unknown place.
    pub fn neighbors<'g>(
        &'g self,
        id: &PlaceId,
    ) -> impl Iterator<Item = (&'g DriveEdge, &'g PlaceId)> + use<'g> {
        self.neighbor_entries(id).map(|(_, edge, other)| (edge, other))
    }

    /// Like [`Graph::neighbors`] but also yields the internal edge index used
    /// by the enumerator to keep its trail allocation-free.
    pub(crate) fn neighbor_entries<'g>(
        &'g self,
        id: &PlaceId,
    ) -> impl Iterator<Item = (usize, &'g DriveEdge, &'g PlaceId)> + use<'g> {
        let edges = &self.edges;
        self.adjacency
            .get(id)
            .into_iter()
            .flatten()
            .map(move |neighbor| (neighbor.edge, &edges[neighbor.edge], &neighbor.other))
    }

    pub(crate) fn edge_at(&self, index: usize) -> &DriveEdge {
        &self.edges[index]
    }

    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.places.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &DriveEdge> {
        self.edges.iter()
    }

    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::EdgeId;
    use crate::tests::{edge, place};

    #[test]
    fn graph_build_001() {
        let graph = Graph::new(
            vec![place("a"), place("b"), place("c")],
            vec![edge("e1", "a", "b", 2.0, 3.0), edge("e2", "b", "c", 1.0, 2.0)],
        )
        .unwrap();

        assert_eq!(graph.place_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.contains(&PlaceId::from("a")));
        assert!(!graph.contains(&PlaceId::from("x")));
        assert_eq!(graph.place(&PlaceId::from("b")).unwrap().name, "B");
    }

    #[test]
    fn graph_neighbors_are_undirected_001() {
        let graph = Graph::new(
            vec![place("a"), place("b")],
            vec![edge("e1", "a", "b", 2.0, 3.0)],
        )
        .unwrap();

        let from_a: Vec<_> = graph.neighbors(&PlaceId::from("a")).collect();
        let from_b: Vec<_> = graph.neighbors(&PlaceId::from("b")).collect();

        assert_eq!(from_a, vec![(graph.edge_at(0), &PlaceId::from("b"))]);
        assert_eq!(from_b, vec![(graph.edge_at(0), &PlaceId::from("a"))]);
    }

    #[test]
    fn graph_neighbors_sorted_by_edge_id_001() {
        // insertion order deliberately reversed
        let graph = Graph::new(
            vec![place("a"), place("b"), place("c"), place("d")],
            vec![
                edge("e3", "a", "d", 1.0, 1.0),
                edge("e1", "a", "b", 1.0, 1.0),
                edge("e2", "a", "c", 1.0, 1.0),
            ],
        )
        .unwrap();

        let ids: Vec<_> = graph
            .neighbors(&PlaceId::from("a"))
            .map(|(e, _)| e.id.clone())
            .collect();

        assert_eq!(
            ids,
            vec![EdgeId::from("e1"), EdgeId::from("e2"), EdgeId::from("e3")]
        );
    }

    #[test]
    fn graph_isolated_place_has_no_neighbors_001() {
        let graph = Graph::new(vec![place("a")], vec![]).unwrap();

        assert_eq!(graph.neighbors(&PlaceId::from("a")).count(), 0);
        assert_eq!(graph.neighbors(&PlaceId::from("missing")).count(), 0);
    }

    #[test]
    fn graph_build_rejects_dangling_edge_001() {
        let result = Graph::new(vec![place("a")], vec![edge("e1", "a", "ghost", 1.0, 1.0)]);

        assert_eq!(
            result.unwrap_err(),
            GraphIntegrityError::DanglingEdge {
                edge: EdgeId::from("e1"),
                place: PlaceId::from("ghost"),
            }
        );
    }

    #[test]
    fn graph_build_rejects_invalid_weight_001() {
        let negative = Graph::new(
            vec![place("a"), place("b")],
            vec![edge("e1", "a", "b", -2.0, 3.0)],
        );
        assert_eq!(
            negative.unwrap_err(),
            GraphIntegrityError::InvalidWeight {
                edge: EdgeId::from("e1"),
                field: "km",
                value: -2.0,
            }
        );

        let nan = Graph::new(
            vec![place("a"), place("b")],
            vec![edge("e1", "a", "b", 2.0, f64::NAN)],
        );
        assert!(matches!(
            nan.unwrap_err(),
            GraphIntegrityError::InvalidWeight { field: "minute", .. }
        ));
    }

    #[test]
    fn graph_build_rejects_duplicates_001() {
        let dup_place = Graph::new(vec![place("a"), place("a")], vec![]);
        assert_eq!(
            dup_place.unwrap_err(),
            GraphIntegrityError::DuplicatePlace(PlaceId::from("a"))
        );

        let dup_edge = Graph::new(
            vec![place("a"), place("b")],
            vec![edge("e1", "a", "b", 1.0, 1.0), edge("e1", "b", "a", 1.0, 1.0)],
        );
        assert_eq!(
            dup_edge.unwrap_err(),
            GraphIntegrityError::DuplicateEdge(EdgeId::from("e1"))
        );
    }
}
