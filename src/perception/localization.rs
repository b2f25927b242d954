//! Localization module
//!
//! Drives the robot from intersection to intersection, scanning each one and
//! feeding the scan into the histogram filter until a single pose holds
//! enough of the belief. Legs alternate between going straight and turning,
//! with the turn direction flipping each time, so the robot wanders a
//! staircase across the map instead of bouncing along one street.

use super::belief::HistogramFilter;
use super::scanner::IntersectionScanner;
use crate::common::types::{Pose, Turn};
use crate::config::LocalizationConfig;
use crate::control::controllers::TurnController;
use crate::control::street_tracker::{Arrival, BoundaryPolicy, StreetTracker};
use crate::error::{Error, Result};
use crate::hardware::RobotIo;
use crate::map::StreetMap;

/// Finds the robot's pose on a known map from colour scans alone
pub struct Localizer {
    filter: HistogramFilter,
    scanner: IntersectionScanner,
    turner: TurnController,
    config: LocalizationConfig,
}

impl Localizer {
    /// Create a new localizer
    pub fn new(
        filter: HistogramFilter,
        scanner: IntersectionScanner,
        turner: TurnController,
        config: LocalizationConfig,
    ) -> Self {
        Localizer {
            filter,
            scanner,
            turner,
            config,
        }
    }

    /// Current belief
    pub fn filter(&self) -> &HistogramFilter {
        &self.filter
    }

    /// Explore until the belief converges.
    ///
    /// Starts from a uniform belief. The robot may be anywhere on a street;
    /// it is stopped on the converged intersection when this returns.
    pub fn localize(&mut self, robot: &mut dyn RobotIo, tracker: &mut StreetTracker, map: &StreetMap) -> Result<Pose> {
        self.filter.reset();
        tracker.find_street(robot)?;

        let mut next_turn = Turn::Right;
        let mut scanned = false;

        for visit in 1..=self.config.max_visits {
            let arrival = tracker.drive_to_intersection(robot, BoundaryPolicy::Reverse)?;
            let reversed = matches!(arrival, Arrival::Intersection { reversed: true });

            // The first leg starts mid-street, so there is no motion to apply
            if scanned {
                if reversed {
                    self.filter.observe_boundary(map);
                    self.filter.rotate(Turn::Around);
                } else {
                    self.filter.predict_advance();
                }
            }

            let observation = self.scanner.scan(robot)?;
            self.filter.observe(map, &observation);
            scanned = true;

            let (best, belief) = self.filter.best();
            log::info!(
                "Visit {}: scanned {}, best guess {} ({:.3})",
                visit,
                observation,
                best,
                belief
            );

            if let Some(pose) = self.filter.converged() {
                log::info!("Localized at {} after {} visits", pose, visit);
                return Ok(pose);
            }

            if visit % (self.config.straight_legs + 1) == 0 {
                self.turner.turn(robot, next_turn.degrees())?;
                self.filter.rotate(next_turn);
                next_turn = next_turn.mirrored();
            }
        }

        robot.stop()?;
        log::warn!("Belief did not converge after {} visits", self.config.max_visits);
        Err(Error::LocalizationFailed {
            visits: self.config.max_visits,
        })
    }
}
