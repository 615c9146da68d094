use thiserror::Error;

use crate::{EdgeId, PlaceId};

/// A graph snapshot failed validation while being indexed.
/// Fatal for the affected graph build; no record is ever dropped silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphIntegrityError {
    #[error("duplicate place id: {0}")]
    DuplicatePlace(PlaceId),
    #[error("duplicate edge id: {0}")]
    DuplicateEdge(EdgeId),
    #[error("edge {edge} references unknown place {place}")]
    DanglingEdge { edge: EdgeId, place: PlaceId },
    #[error("edge {edge} has invalid {field}: {value} (expected a non-negative number)")]
    InvalidWeight {
        edge: EdgeId,
        field: &'static str,
        value: f64,
    },
}

/// A (source, destination) pair was rejected before any search started.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidSelection {
    #[error("source and destination are both {0}")]
    SameEndpoints(PlaceId),
    #[error("place {0} is not part of the graph")]
    UnknownPlace(PlaceId),
}
