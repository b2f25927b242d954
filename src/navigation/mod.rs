//! Navigation module: route planning and route execution
pub mod planner;

use self::planner::{PathPlanner, RouteAction};
use crate::common::types::{Cell, Observation, Pose};
use crate::config::NavigationConfig;
use crate::control::controllers::TurnController;
use crate::control::street_tracker::{Arrival, BoundaryPolicy, StreetTracker};
use crate::error::{Error, Result};
use crate::hardware::RobotIo;
use crate::map::StreetMap;
use crate::perception::scanner::IntersectionScanner;

/// Why a route was abandoned before the goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deviation {
    /// The red border showed up where the route expected a street
    Boundary,
    /// The scan at a stop disagreed with the map for the believed pose
    CornerMismatch { expected: Pose, observed: Observation },
    /// The street was lost and could not be found again
    Lost,
    /// The believed pose has no street ahead
    OffMap,
}

/// Result of executing a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Arrived(Pose),
    Deviated(Deviation),
}

/// Executes planned routes from a known pose
pub struct Navigator {
    planner: Box<dyn PathPlanner>,
    scanner: IntersectionScanner,
    turner: TurnController,
    config: NavigationConfig,
}

impl Navigator {
    /// Create a new navigator
    pub fn new(
        planner: Box<dyn PathPlanner>,
        scanner: IntersectionScanner,
        turner: TurnController,
        config: NavigationConfig,
    ) -> Self {
        Navigator {
            planner,
            scanner,
            turner,
            config,
        }
    }

    /// Set the route planner
    pub fn set_planner<T: PathPlanner + 'static>(&mut self, planner: T) {
        self.planner = Box::new(planner);
    }

    /// Drive from `start` to the intersection `goal`.
    ///
    /// Any disagreement between the route and what the robot sees ends the
    /// run with [`NavigationOutcome::Deviated`] and the robot stopped, so the
    /// caller can relocalize. Hardware failures are returned as errors.
    pub fn go_to(
        &self,
        robot: &mut dyn RobotIo,
        tracker: &mut StreetTracker,
        map: &StreetMap,
        start: Pose,
        goal: Cell,
    ) -> Result<NavigationOutcome> {
        let route = self.planner.plan_path(start, goal)?;
        log::info!("Route from {} to {}: {} actions", start, goal, route.len());

        let mut pose = start;
        for action in route {
            log::debug!("At {}: {}", pose, action);
            match action {
                RouteAction::Turn(turn) => {
                    self.turner.turn(robot, turn.degrees())?;
                    pose.heading = pose.heading.turned(turn);
                }
                RouteAction::Advance => {
                    let Some(next) = map.neighbor(pose.cell, pose.heading) else {
                        return self.deviate(robot, Deviation::OffMap);
                    };
                    match tracker.drive_to_intersection(robot, BoundaryPolicy::Abort) {
                        Ok(Arrival::Intersection { .. }) => pose.cell = next,
                        Ok(Arrival::Boundary) => return self.deviate(robot, Deviation::Boundary),
                        Err(Error::StreetLost { .. }) | Err(Error::DriveTimeout { .. }) => {
                            return self.deviate(robot, Deviation::Lost)
                        }
                        Err(e) => return Err(e),
                    }

                    if self.config.verify_stops {
                        let observed = self.scanner.scan(robot)?;
                        if !observed.matches(&map.expected_observation(pose)) {
                            return self.deviate(robot, Deviation::CornerMismatch { expected: pose, observed });
                        }
                    }
                }
            }
        }

        robot.stop()?;
        log::info!("Arrived at {}", pose);
        Ok(NavigationOutcome::Arrived(pose))
    }

    fn deviate(&self, robot: &mut dyn RobotIo, deviation: Deviation) -> Result<NavigationOutcome> {
        robot.stop()?;
        log::warn!("Route abandoned: {:?}", deviation);
        Ok(NavigationOutcome::Deviated(deviation))
    }
}
