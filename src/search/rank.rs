use ordered_float::OrderedFloat;

use crate::{DriveEdge, Graph};

/// A simple path scored for presentation: exact totals over its edges plus
/// the ordered edge sequence from source to destination.
///
/// Totals are exact sums of the edge weights; any rounding is left to the
/// rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCandidate {
    pub total_km: f64,
    pub total_minute: f64,
    pub edges: Vec<DriveEdge>,
}

/// Reduces a trail of edge indexes to a scored candidate.
pub(crate) fn aggregate(graph: &Graph, trail: &[usize]) -> RouteCandidate {
    let edges: Vec<DriveEdge> = trail.iter().map(|&i| graph.edge_at(i).clone()).collect();
    let total_km = edges.iter().map(|e| e.km).sum();
    let total_minute = edges.iter().map(|e| e.minute).sum();

    RouteCandidate {
        total_km,
        total_minute,
        edges,
    }
}

/// Bounded ranked list of the best `k` candidates seen so far, ordered
/// ascending by total distance.
///
/// Candidates are inserted after all entries with an equal total, so ties
/// keep their discovery order (first found wins). Combined with the fixed
/// neighbor-iteration order of the graph this makes the ranked output fully
/// deterministic.
pub(crate) struct TopK {
    k: usize,
    ranked: Vec<RouteCandidate>,
}

impl TopK {
    pub(crate) fn new(k: usize) -> Self {
        Self { k, ranked: vec![] }
    }

    pub(crate) fn insert(&mut self, candidate: RouteCandidate) {
        if self.k == 0 {
            return;
        }

        let at = self
            .ranked
            .partition_point(|c| OrderedFloat(c.total_km) <= OrderedFloat(candidate.total_km));

        if at < self.k {
            self.ranked.insert(at, candidate);
            self.ranked.truncate(self.k);
        }
    }

    pub(crate) fn into_ranked(self) -> Vec<RouteCandidate> {
        self.ranked
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use test_log::test;

    use super::*;
    use crate::tests::{diamond_graph, place_id};

    fn candidate(total_km: f64, tag: &str) -> RouteCandidate {
        let graph = diamond_graph();
        let mut edges = vec![graph.edge_at(0).clone()];
        edges[0].id = crate::EdgeId::from(tag);
        RouteCandidate {
            total_km,
            total_minute: total_km * 2.0,
            edges,
        }
    }

    #[test]
    fn aggregate_sums_exactly_001() {
        let graph = diamond_graph();
        // a -e1- b -e2- d
        let candidate = aggregate(&graph, &[0, 1]);

        assert_abs_diff_eq!(candidate.total_km, 5.0);
        assert_abs_diff_eq!(candidate.total_minute, 8.0);
        assert_eq!(candidate.edges.len(), 2);
        assert_eq!(candidate.edges[0].other_endpoint(&place_id("a")), &place_id("b"));
    }

    #[test]
    fn top_k_orders_ascending_001() {
        let mut top = TopK::new(3);
        top.insert(candidate(6.0, "x"));
        top.insert(candidate(2.0, "y"));
        top.insert(candidate(4.0, "z"));

        let totals: Vec<_> = top.into_ranked().iter().map(|c| c.total_km).collect();
        assert_eq!(totals, vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn top_k_truncates_to_k_001() {
        let mut top = TopK::new(2);
        top.insert(candidate(6.0, "x"));
        top.insert(candidate(2.0, "y"));
        top.insert(candidate(4.0, "z"));
        top.insert(candidate(1.0, "w"));

        let totals: Vec<_> = top.into_ranked().iter().map(|c| c.total_km).collect();
        assert_eq!(totals, vec![1.0, 2.0]);
    }

    #[test]
    fn top_k_ties_keep_discovery_order_001() {
        let mut top = TopK::new(2);
        top.insert(candidate(3.0, "first"));
        top.insert(candidate(3.0, "second"));
        top.insert(candidate(3.0, "third"));

        let tags: Vec<_> = top
            .into_ranked()
            .iter()
            .map(|c| c.edges[0].id.0.clone())
            .collect();
        assert_eq!(tags, vec!["first", "second"]);
    }

    #[test]
    fn top_k_zero_keeps_nothing_001() {
        let mut top = TopK::new(0);
        top.insert(candidate(3.0, "x"));
        assert!(top.into_ranked().is_empty());
    }
}
