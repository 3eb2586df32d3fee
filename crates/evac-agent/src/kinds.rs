//! Pedestrian and vehicle agents: [`AgentCore`] fixed to one travel mode.

use evac_core::{AgentId, AgentKind, AgentRole, EvacConfig, NodeId, Point2, TravelMode};
use evac_network::{NetworkModel, Router};

use crate::{Agent, AgentCore};

macro_rules! mode_agent {
    ($(#[$meta:meta])* $name:ident, $kind:expr, $mode:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            core: AgentCore,
        }

        impl $name {
            pub const MODE: TravelMode = $mode;

            /// Create an agent at `start` heading for `goal`, moving at the
            /// configured speed for its mode.
            pub fn new(
                id:     AgentId,
                role:   AgentRole,
                start:  NodeId,
                goal:   NodeId,
                config: &EvacConfig,
            ) -> Self {
                Self::with_speed(id, role, start, goal, config.speed[$mode], config.seed)
            }

            pub fn with_speed(
                id:    AgentId,
                role:  AgentRole,
                start: NodeId,
                goal:  NodeId,
                speed: f64,
                seed:  u64,
            ) -> Self {
                Self { core: AgentCore::new(id, $mode, role, speed, start, goal, seed) }
            }

            pub fn core(&self) -> &AgentCore {
                &self.core
            }

            pub fn core_mut(&mut self) -> &mut AgentCore {
                &mut self.core
            }
        }

        impl Agent for $name {
            fn id(&self) -> AgentId {
                self.core.id
            }

            fn kind(&self) -> AgentKind {
                $kind
            }

            fn role(&self) -> AgentRole {
                self.core.role
            }

            fn step(&mut self, net: &NetworkModel, router: &dyn Router) {
                self.core.step(net, router);
            }

            fn position(&self, net: &NetworkModel) -> Point2 {
                self.core.position(net)
            }

            fn reached(&self) -> bool {
                self.core.reached
            }

            fn exposure(&self) -> f64 {
                self.core.exposure
            }
        }
    };
}

mode_agent!(
    /// An evacuee on foot, routing over the walk graph.
    PedestrianAgent, AgentKind::Pedestrian, TravelMode::Walk
);

mode_agent!(
    /// An evacuee in a private vehicle, routing over the drive graph.
    VehicleAgent, AgentKind::Vehicle, TravelMode::Drive
);
