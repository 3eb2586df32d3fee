//! `evac-agent` — evacuee and shuttle agents.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`belief`]  | `Belief`: per-agent edge hazard memory                       |
//! | [`state`]   | `MovementState`: node, in-transit edge, edge progress        |
//! | [`evacuee`] | `AgentCore`: observe / plan / move state machine             |
//! | [`kinds`]   | `PedestrianAgent`, `VehicleAgent`                             |
//! | [`shuttle`] | `ShuttleAgent`: cyclic route following with stop dwell       |
//!
//! # Ownership
//!
//! Every agent exclusively owns its belief, its movement state, and its
//! RNG.  The [`NetworkModel`](evac_network::NetworkModel) is only ever
//! borrowed immutably, so any number of agents can step concurrently.
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | `Belief` uses `FxHashMap` instead of `HashMap`.          |
//! | `serde`   | Derives `Serialize`/`Deserialize` on state types.        |

pub mod belief;
pub mod evacuee;
pub mod kinds;
pub mod shuttle;
pub mod state;


pub use belief::Belief;
pub use evacuee::{AgentCore, STUCK_PENALTY, StepOutcome};
pub use kinds::{PedestrianAgent, VehicleAgent};
pub use shuttle::ShuttleAgent;
pub use state::MovementState;

use evac_core::{AgentId, AgentKind, AgentRole, Point2};
use evac_network::{NetworkModel, Router};

/// Common per-tick interface of every agent kind.
///
/// `step` is infallible: every failure inside a tick (no route, blocked
/// edge, degenerate path) is an expected outcome handled by the agent.
pub trait Agent: Send {
    fn id(&self) -> AgentId;

    fn kind(&self) -> AgentKind;

    fn role(&self) -> AgentRole;

    /// Advance this agent by one tick.
    fn step(&mut self, net: &NetworkModel, router: &dyn Router);

    /// Interpolated planar position for visualisation.
    fn position(&self, net: &NetworkModel) -> Point2;

    fn reached(&self) -> bool {
        false
    }

    fn exposure(&self) -> f64 {
        0.0
    }
}
