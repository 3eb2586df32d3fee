//! `evac-core` — foundational types for the evacuation simulator.
//!
//! This crate is a dependency of every other `evac-*` crate.  It has no
//! `evac-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`ids`]      | `AgentId`, `NodeId`, `EdgeId`                            |
//! | [`geo`]      | `GeoPoint` (WGS-84, haversine), `Point2` (projected)     |
//! | [`mode`]     | `TravelMode`, `ModeTable<T>`, `AgentKind`, `AgentRole`   |
//! | [`time`]     | `Tick`                                                   |
//! | [`rng`]      | `AgentRng` (per-agent), `SimRng` (setup)                 |
//! | [`config`]   | `EvacConfig` and its grouped sub-configs                 |
//! | [`error`]    | `CoreError`, `CoreResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod mode;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{EvacConfig, FeedConfig, GridConfig, HazardConfig, PopulationConfig};
pub use error::{CoreError, CoreResult};
pub use geo::{GeoPoint, Point2};
pub use ids::{AgentId, EdgeId, NodeId};
pub use mode::{AgentKind, AgentRole, ModeTable, TravelMode};
pub use rng::{AgentRng, SimRng};
pub use time::Tick;
