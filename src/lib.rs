#![doc = include_str!("../README.md")]

mod error;
mod graph;
mod model;
mod search;
mod service;

pub use error::{GraphIntegrityError, InvalidSelection};
pub use graph::Graph;
pub use model::{DriveEdge, EdgeId, Place, PlaceId};
pub use search::enumerate::SearchBudget;
pub use search::rank::RouteCandidate;
pub use search::{RouteSearch, SearchConfig, SearchOutcome, find_routes, find_routes_with_token};
pub use service::{CancelToken, RouteQueryService, SearchGeneration, SelectionState};
