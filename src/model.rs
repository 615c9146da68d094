use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;

/// Uniquely identifies a [`Place`] within a graph snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub String);

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlaceId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Uniquely identifies a [`DriveEdge`] within a graph snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// A location on the map: a graph node with its geographic coordinate and a
/// set of category labels carried through from the backing store.
/// Immutable once the graph is built for a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub labels: BTreeSet<String>,
}

/// A drivable connection between two places, weighted by distance (km) and
/// travel time (minutes).
///
/// The relation is stored with a `from`/`to` direction but is traversable in
/// either direction during search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriveEdge {
    pub id: EdgeId,
    pub from: PlaceId,
    pub to: PlaceId,
    pub km: f64,
    pub minute: f64,
}

impl DriveEdge {
    /// Gets the endpoint on the opposite side of `place`.
    pub fn other_endpoint(&self, place: &PlaceId) -> &PlaceId {
        if &self.from == place { &self.to } else { &self.from }
    }
}
