//! `evac-sim` — population setup and the tick loop.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.step_limit:
//!   ① Pedestrians   AgentCore::step on the walk graph
//!   ② Vehicles      AgentCore::step on the drive graph
//!   ③ Shuttles      ShuttleAgent::advance along their routes
//!   ④ Metrics       TickMetrics over pedestrians + vehicles
//!   ⑤ Snapshot      AgentPosition for every agent, every
//!                   `output_interval_ticks` ticks
//! ```
//!
//! Groups always run in this order.  Within a group agents are
//! independent (each reads the shared network and mutates only itself), so
//! the `parallel` feature steps a group on Rayon's pool without changing
//! results.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Steps each agent group on Rayon's thread pool.         |
//! | `fx-hash`  | FxHash belief maps.                                    |
//! | `serde`    | Derives on `TickMetrics` / `AgentPosition`.            |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use evac_core::EvacConfig;
//! use evac_sim::{NoopObserver, setup};
//! use evac_transit::StaticFeedSource;
//!
//! let mut sim = setup(EvacConfig::default(), None, &StaticFeedSource(None))?;
//! sim.run(&mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod sim;


pub use builder::{SimBuilder, setup};
pub use error::{SimError, SimResult};
pub use metrics::{AgentPosition, TickMetrics};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
