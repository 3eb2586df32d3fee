//! Simulation configuration.
//!
//! Every tunable of a run lives in one [`EvacConfig`] value, passed to the
//! network model and the simulation builder.  Nothing reads process-wide
//! state.  The binary crate loads it from a JSON file (feature `serde`);
//! libraries only ever receive the value.

use crate::{CoreError, CoreResult, GeoPoint, ModeTable};

// ── EvacConfig ────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// `Default` reproduces the reference campus scenario.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvacConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Total ticks to simulate.
    pub step_limit: u64,

    /// Emit agent position snapshots every N ticks (0 disables snapshots).
    pub output_interval_ticks: u64,

    pub population: PopulationConfig,
    pub hazards:    HazardConfig,

    /// Observation radius in projected metres.
    pub observation_radius_m: f64,

    /// Probability that an observed `blocked` flag is reported inverted.
    pub observation_error: ModeTable<f64>,

    /// Metres advanced per tick for pedestrians (walk) and vehicles (drive).
    pub speed: ModeTable<f64>,

    /// Metres advanced per tick by shuttles.
    pub shuttle_speed: f64,

    /// Ticks a shuttle idles after arriving at a stop node.
    pub shuttle_dwell_ticks: u32,

    /// Number of shelters sampled from the walk graph.
    pub shelter_count: usize,

    pub feed: FeedConfig,
    pub grid: GridConfig,
}

impl Default for EvacConfig {
    fn default() -> Self {
        Self {
            seed:                  42,
            step_limit:            600,
            output_interval_ticks: 5,
            population:            PopulationConfig::default(),
            hazards:               HazardConfig::default(),
            observation_radius_m:  80.0,
            observation_error:     ModeTable::new(0.1, 0.0),
            speed:                 ModeTable::new(1.4, 8.0),
            shuttle_speed:         6.0,
            shuttle_dwell_ticks:   3,
            shelter_count:         6,
            feed:                  FeedConfig::default(),
            grid:                  GridConfig::default(),
        }
    }
}

impl EvacConfig {
    /// Check value ranges.  Called by the simulation builder before any
    /// setup work happens.
    pub fn validate(&self) -> CoreResult<()> {
        for (mode, &p) in self.observation_error.iter() {
            check_probability(&format!("observation_error.{mode}"), p)?;
        }
        for (mode, &s) in self.speed.iter() {
            check_positive(&format!("speed.{mode}"), s)?;
        }
        check_positive("shuttle_speed", self.shuttle_speed)?;
        check_non_negative("observation_radius_m", self.observation_radius_m)?;
        self.population.validate()?;
        self.hazards.validate()?;
        self.feed.validate()?;
        self.grid.validate()
    }
}

// ── PopulationConfig ──────────────────────────────────────────────────────────

/// Population composition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PopulationConfig {
    pub pedestrians: usize,
    pub vehicles:    usize,
    pub shuttles:    usize,
    /// Probability that a pedestrian or vehicle agent is tagged `Faculty`.
    pub faculty_ratio: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self { pedestrians: 40, vehicles: 15, shuttles: 8, faculty_ratio: 0.25 }
    }
}

impl PopulationConfig {
    fn validate(&self) -> CoreResult<()> {
        check_probability("population.faculty_ratio", self.faculty_ratio)
    }
}

// ── HazardConfig ──────────────────────────────────────────────────────────────

/// Ground-truth hazard generation and the hazard-weighted cost function.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HazardConfig {
    /// Independent per-edge probability of being blocked.
    pub block_probability: f64,
    pub snow_min: f64,
    pub snow_max: f64,
    /// Cost multiplier per unit of snow depth.
    pub snow_alpha: f64,
    /// Cost multiplier per unit of slope.
    pub slope_alpha: f64,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            block_probability: 0.08,
            snow_min:          0.0,
            snow_max:          1.0,
            snow_alpha:        1.2,
            slope_alpha:       0.6,
        }
    }
}

impl HazardConfig {
    fn validate(&self) -> CoreResult<()> {
        check_probability("hazards.block_probability", self.block_probability)?;
        check_non_negative("hazards.snow_min", self.snow_min)?;
        if self.snow_max < self.snow_min {
            return Err(CoreError::Config(format!(
                "hazards.snow_max ({}) is below snow_min ({})",
                self.snow_max, self.snow_min
            )));
        }
        check_non_negative("hazards.snow_alpha", self.snow_alpha)?;
        check_non_negative("hazards.slope_alpha", self.slope_alpha)
    }
}

// ── FeedConfig ────────────────────────────────────────────────────────────────

/// Transit feed location and the snapping rules used to turn it into a
/// shuttle route.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeedConfig {
    /// Feed endpoint.  `None` skips the fetch and goes straight to the
    /// synthetic loop.
    pub url: Option<String>,
    pub timeout_secs: u64,
    /// Reference center for radius filtering.
    pub center: GeoPoint,
    /// Geodesic radius around `center` that feed points must fall within.
    pub radius_m: f64,
    /// Keep every Nth polyline point before snapping.
    pub sample_stride: usize,
    /// Maximum metric distance between a feed point and its snapped node.
    pub snap_max_m: f64,
    /// Number of surrogate stops in the synthetic fallback loop.
    pub synthetic_stops: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: Some(
                "https://uofubus.com/Services/JSONPRelay.svc/\
                 GetRoutesForMapWithScheduleWithEncodedLine?apiKey=ride1791&isDispatch=false"
                    .to_owned(),
            ),
            timeout_secs:    10,
            center:          GeoPoint::new(40.764_936_8, -111.842_102_1),
            radius_m:        1_200.0,
            sample_stride:   20,
            snap_max_m:      250.0,
            synthetic_stops: 6,
        }
    }
}

impl FeedConfig {
    fn validate(&self) -> CoreResult<()> {
        check_non_negative("feed.radius_m", self.radius_m)?;
        check_non_negative("feed.snap_max_m", self.snap_max_m)
    }
}

// ── GridConfig ────────────────────────────────────────────────────────────────

/// Synthetic bidirectional grid used when no topology provider is available.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// Nodes per side.
    pub size: usize,
    /// Distance between adjacent nodes in metres.
    pub spacing_m: f64,
    /// Slope assigned to every grid edge.
    pub slope: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { size: 6, spacing_m: 120.0, slope: 0.05 }
    }
}

impl GridConfig {
    fn validate(&self) -> CoreResult<()> {
        if self.size == 0 {
            return Err(CoreError::Config("grid.size must be at least 1".into()));
        }
        check_positive("grid.spacing_m", self.spacing_m)?;
        check_non_negative("grid.slope", self.slope)
    }
}

// ── Range checks ──────────────────────────────────────────────────────────────

fn check_probability(name: &str, p: f64) -> CoreResult<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be within [0, 1], got {p}")))
    }
}

fn check_positive(name: &str, v: f64) -> CoreResult<()> {
    if v > 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be positive, got {v}")))
    }
}

fn check_non_negative(name: &str, v: f64) -> CoreResult<()> {
    if v >= 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be non-negative, got {v}")))
    }
}
