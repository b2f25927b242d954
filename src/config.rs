//! Configuration for the street-grid robot
//!
//! Every tunable threshold of the control loop lives here so it can be
//! adjusted per robot and per map from a TOML file. Missing sections and
//! fields fall back to the defaults below.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

/// Raw labels the colour sensor can report
pub const SENSOR_LABELS: RangeInclusive<i32> = 0..=7;

/// Turns within this much of zero are skipped, so it must stay below the
/// 45 degree step onto the first corner of a scan
pub const MAX_TURN_TOLERANCE_DEG: f64 = 45.0;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CoreConfig {
    pub robot: RobotConfig,
    pub classifier: ClassifierConfig,
    pub turn: TurnConfig,
    pub tracker: TrackerConfig,
    pub filter: FilterConfig,
    pub localization: LocalizationConfig,
    pub navigation: NavigationConfig,
    pub mission: MissionConfig,
    pub simulation: SimConfig,
}

/// Robot I/O channel
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Robot backend; only `sim` is built into this crate
    pub backend: String,
    /// Colour sensor port
    pub color_port: u8,
    /// Gyroscope port
    pub gyro_port: u8,
    /// Sleep between motion polls, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        RobotConfig {
            backend: "sim".to_string(),
            color_port: 3,
            gyro_port: 2,
            poll_interval_ms: 5,
        }
    }
}

/// Colour classification thresholds
///
/// `min_label`, `max_label` and `min_agreement` are the values an offline
/// calibration run would tune.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Burst length while following a street
    pub street_samples: usize,
    /// Burst length when reading a building at an intersection
    pub building_samples: usize,
    /// Smallest raw label accepted
    pub min_label: i32,
    /// Largest raw label accepted
    pub max_label: i32,
    /// Fraction of accepted samples the winning label must hold
    pub min_agreement: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            street_samples: 9,
            building_samples: 50,
            min_label: 1,
            max_label: 6,
            min_agreement: 0.0,
        }
    }
}

/// Gyro-controlled turning
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TurnConfig {
    /// Wheel power while turning
    pub power: i32,
    /// Accepted shortfall against the target angle, in degrees
    pub tolerance_deg: f64,
    /// Gyro polls before a turn is declared stalled
    pub max_polls: usize,
}

impl Default for TurnConfig {
    fn default() -> Self {
        TurnConfig {
            power: 20,
            tolerance_deg: 0.5,
            max_polls: 2000,
        }
    }
}

/// Street following and street search
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Wheel power while driving along a street
    pub drive_power: i32,
    /// First sweep of the oscillating search, in degrees
    pub search_angle_deg: f64,
    /// Full search rounds before the robot is declared lost
    pub max_search_attempts: usize,
    /// Colour polls spent backing up between search rounds
    pub backup_polls: usize,
    /// Colour polls driven past the first yellow reading to centre on the intersection
    pub center_polls: usize,
    /// Colour polls allowed for one leg before giving up
    pub max_drive_polls: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            drive_power: 20,
            search_angle_deg: 30.0,
            max_search_attempts: 3,
            backup_polls: 4,
            center_polls: 14,
            max_drive_polls: 400,
        }
    }
}

/// How a scan is scored against the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikelihoodModel {
    /// All four corners must agree for the match likelihood
    Exact,
    /// Each corner contributes a match or mismatch factor
    PerCorner,
}

/// Histogram filter parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    pub match_likelihood: f64,
    pub mismatch_likelihood: f64,
    /// Belief a single hypothesis needs to be committed
    pub convergence_threshold: f64,
    /// Mass given to edge cells with no predecessor, relative to a uniform hypothesis
    pub edge_floor: f64,
    pub likelihood_model: LikelihoodModel,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            match_likelihood: 0.95,
            mismatch_likelihood: 0.05,
            convergence_threshold: 0.75,
            edge_floor: 0.01,
            likelihood_model: LikelihoodModel::Exact,
        }
    }
}

/// Exploration loop
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocalizationConfig {
    /// Intersection visits before localization is abandoned
    pub max_visits: usize,
    /// Legs driven straight between exploration turns
    pub straight_legs: usize,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        LocalizationConfig {
            max_visits: 40,
            straight_legs: 1,
        }
    }
}

/// Route execution
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Re-scan every stop and compare against the map
    pub verify_stops: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        NavigationConfig { verify_stops: true }
    }
}

/// Localize/navigate retry policy
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MissionConfig {
    /// Localization runs allowed, including the first
    pub max_attempts: usize,
}

impl Default for MissionConfig {
    fn default() -> Self {
        MissionConfig { max_attempts: 3 }
    }
}

/// Simulated robot placement and physics, in cell units
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    pub start_x: f64,
    pub start_y: f64,
    /// Clockwise from Up
    pub start_heading_deg: f64,
    /// Distance of the colour sensor ahead of the wheel axis
    pub sensor_offset: f64,
    pub street_half_width: f64,
    pub intersection_half_size: f64,
    /// Distance from the outer intersections to the red border
    pub boundary_margin: f64,
    pub boundary_width: f64,
    /// Cells travelled per tick per unit of wheel power
    pub drive_step: f64,
    /// Degrees rotated per tick per unit of differential power
    pub turn_step: f64,
    /// Probability a colour read returns a random label
    pub misread_rate: f64,
    /// Uniform heading jitter per driving tick, in degrees
    pub heading_noise_deg: f64,
    /// RNG seed, 0 draws from entropy
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            start_x: 0.0,
            start_y: 0.5,
            start_heading_deg: 0.0,
            sensor_offset: 0.25,
            street_half_width: 0.06,
            intersection_half_size: 0.08,
            boundary_margin: 0.6,
            boundary_width: 0.1,
            drive_step: 0.000125,
            turn_step: 0.05,
            misread_rate: 0.0,
            heading_noise_deg: 0.0,
            seed: 0,
        }
    }
}

impl CoreConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: CoreConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the control loop cannot work with
    pub fn validate(&self) -> Result<()> {
        let c = &self.classifier;
        if c.street_samples == 0 || c.building_samples == 0 {
            return Err(Error::InvalidConfig("sample counts must be positive".to_string()));
        }
        if !SENSOR_LABELS.contains(&c.min_label) || !SENSOR_LABELS.contains(&c.max_label) {
            return Err(Error::InvalidConfig(format!(
                "label range {}..={} must lie within the sensor's {}..={}",
                c.min_label,
                c.max_label,
                SENSOR_LABELS.start(),
                SENSOR_LABELS.end()
            )));
        }
        if c.min_label > c.max_label {
            return Err(Error::InvalidConfig(format!(
                "label range {}..={} is empty",
                c.min_label, c.max_label
            )));
        }
        if !(0.0..=1.0).contains(&c.min_agreement) {
            return Err(Error::InvalidConfig("min_agreement must be within [0, 1]".to_string()));
        }

        if self.turn.power <= 0 || self.tracker.drive_power <= 0 {
            return Err(Error::InvalidConfig("motor powers must be positive".to_string()));
        }
        if !(0.0..MAX_TURN_TOLERANCE_DEG).contains(&self.turn.tolerance_deg) {
            return Err(Error::InvalidConfig(format!(
                "turn tolerance must be within [0, {}) degrees",
                MAX_TURN_TOLERANCE_DEG
            )));
        }
        if self.tracker.search_angle_deg <= 0.0 || self.tracker.search_angle_deg > 90.0 {
            return Err(Error::InvalidConfig("search angle must be within (0, 90]".to_string()));
        }

        let f = &self.filter;
        let in_unit = |p: f64| p > 0.0 && p <= 1.0;
        if !in_unit(f.match_likelihood) || !in_unit(f.mismatch_likelihood) {
            return Err(Error::InvalidConfig("likelihoods must be within (0, 1]".to_string()));
        }
        if f.mismatch_likelihood >= f.match_likelihood {
            return Err(Error::InvalidConfig(
                "mismatch likelihood must be below match likelihood".to_string(),
            ));
        }
        if !in_unit(f.convergence_threshold) {
            return Err(Error::InvalidConfig("convergence threshold must be within (0, 1]".to_string()));
        }
        if f.edge_floor <= 0.0 {
            return Err(Error::InvalidConfig("edge floor must be positive".to_string()));
        }

        if self.localization.max_visits == 0 || self.mission.max_attempts == 0 {
            return Err(Error::InvalidConfig("visit and attempt caps must be positive".to_string()));
        }
        Ok(())
    }
}
