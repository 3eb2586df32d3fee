//! Travel modes and the per-mode capability table.
//!
//! Everything that differs between walking and driving (which graph to
//! search, which hazard overlay to read, how fast agents move, how noisy
//! their observations are) is looked up through a [`ModeTable`] indexed by
//! [`TravelMode`], so call sites never branch on the mode themselves.

use std::ops::{Index, IndexMut};

/// The network an agent moves on.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TravelMode {
    /// On foot, over the walk graph.
    Walk,
    /// By road vehicle (private car or shuttle), over the drive graph.
    Drive,
}

impl TravelMode {
    /// Both modes, in table order.
    pub const ALL: [TravelMode; 2] = [TravelMode::Walk, TravelMode::Drive];

    /// Human-readable label, useful for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Walk  => "walk",
            TravelMode::Drive => "drive",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ModeTable ─────────────────────────────────────────────────────────────────

/// One value per [`TravelMode`].
///
/// ```
/// use evac_core::{ModeTable, TravelMode};
///
/// let speed = ModeTable::new(1.4, 8.0);
/// assert_eq!(speed[TravelMode::Drive], 8.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeTable<T> {
    pub walk:  T,
    pub drive: T,
}

impl<T> ModeTable<T> {
    pub const fn new(walk: T, drive: T) -> Self {
        Self { walk, drive }
    }

    /// Build a table by evaluating `f` once per mode.
    pub fn from_fn(mut f: impl FnMut(TravelMode) -> T) -> Self {
        Self {
            walk:  f(TravelMode::Walk),
            drive: f(TravelMode::Drive),
        }
    }

    /// Apply `f` to both entries.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> ModeTable<U> {
        ModeTable {
            walk:  f(self.walk),
            drive: f(self.drive),
        }
    }

    /// Iterate `(mode, &value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (TravelMode, &T)> {
        [(TravelMode::Walk, &self.walk), (TravelMode::Drive, &self.drive)].into_iter()
    }
}

impl<T> Index<TravelMode> for ModeTable<T> {
    type Output = T;
    #[inline]
    fn index(&self, mode: TravelMode) -> &T {
        match mode {
            TravelMode::Walk  => &self.walk,
            TravelMode::Drive => &self.drive,
        }
    }
}

impl<T> IndexMut<TravelMode> for ModeTable<T> {
    #[inline]
    fn index_mut(&mut self, mode: TravelMode) -> &mut T {
        match mode {
            TravelMode::Walk  => &mut self.walk,
            TravelMode::Drive => &mut self.drive,
        }
    }
}

// ── Agent tags ────────────────────────────────────────────────────────────────

/// Which population group an agent belongs to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentKind {
    Pedestrian,
    Vehicle,
    Shuttle,
}

impl AgentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::Pedestrian => "pedestrian",
            AgentKind::Vehicle    => "vehicle",
            AgentKind::Shuttle    => "shuttle",
        }
    }

    /// The graph this kind of agent moves on.
    pub fn mode(self) -> TravelMode {
        match self {
            AgentKind::Pedestrian => TravelMode::Walk,
            AgentKind::Vehicle | AgentKind::Shuttle => TravelMode::Drive,
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Population role.  Carried for reporting; movement ignores it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentRole {
    Faculty,
    #[default]
    Staff,
}

impl AgentRole {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentRole::Faculty => "faculty",
            AgentRole::Staff   => "staff",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
