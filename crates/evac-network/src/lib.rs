//! `evac-network` — path network, hazards, spatial indexing, and routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`graph`]    | `ModeGraph` (CSR), `ModeGraphBuilder`                         |
//! | [`topology`] | `GraphProvider` trait, `ProvidedNetwork`, synthetic grid      |
//! | [`hazard`]   | `HazardOverlay`, `EdgeObservation`, `BeliefView`              |
//! | [`geocode`]  | `Geocoder` trait, `Snap`, R-tree node indexes                 |
//! | [`router`]   | `Router` trait, `Route`, `DijkstraRouter`                     |
//! | [`model`]    | `NetworkModel`: cost, observation, and blocking queries      |
//! | [`shelter`]  | `select_shelters`                                             |
//! | [`error`]    | `NetworkError`, `NetworkResult<T>`                            |
//!
//! # Lifecycle
//!
//! A [`NetworkModel`] is built once, before any agent exists: topology
//! (from a provider, or the synthetic grid fallback), then ground-truth
//! hazards, then shelters.  After that it is only ever borrowed immutably.

pub mod error;
pub mod geocode;
pub mod graph;
pub mod hazard;
pub mod model;
pub mod router;
pub mod shelter;
pub mod topology;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use geocode::{Geocoder, Snap};
pub use graph::{ModeGraph, ModeGraphBuilder};
pub use hazard::{BeliefView, EdgeObservation, HazardOverlay, Observation};
pub use model::{NetworkModel, TopologyOrigin};
pub use router::{DijkstraRouter, Route, Router};
pub use shelter::select_shelters;
pub use topology::{
    GraphProvider, ModeTopology, ProvidedEdge, ProvidedNetwork, ProvidedNode, StaticGraphProvider,
    synthetic_grid,
};
