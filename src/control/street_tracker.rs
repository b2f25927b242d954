//! Street following
//!
//! Keeps the robot on the black street surface and stops it centred on the
//! next yellow intersection. Every transition is driven by the classified
//! colour under the sensor:
//!
//! | Surface        | Action                                                  |
//! |----------------|---------------------------------------------------------|
//! | black          | keep driving                                            |
//! | yellow         | drive on to centre the robot, stop (`AtIntersection`)   |
//! | red            | stop; reverse or abort depending on [`BoundaryPolicy`]  |
//! | anything else  | stop and run the oscillating street search (`Seeking`)  |

use super::controllers::TurnController;
use crate::common::types::Color;
use crate::config::TrackerConfig;
use crate::error::{Error, Result};
use crate::hardware::RobotIo;
use crate::perception::sensors::ColorClassifier;

/// Where the tracker believes the robot is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Seeking,
    OnStreet,
    AtIntersection,
    AtBoundary,
    Lost,
}

/// What to do when the red map border shows up under the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Turn around and keep driving
    Reverse,
    /// Stop and report the boundary to the caller
    Abort,
}

/// How a leg along a street ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// Stopped on an intersection; `reversed` if the robot turned around at
    /// the border on the way
    Intersection { reversed: bool },
    /// Stopped at the border under [`BoundaryPolicy::Abort`]
    Boundary,
}

#[derive(Debug, Clone)]
pub struct StreetTracker {
    classifier: ColorClassifier,
    turner: TurnController,
    config: TrackerConfig,
    state: TrackerState,
}

impl StreetTracker {
    /// Create a new street tracker
    pub fn new(classifier: ColorClassifier, turner: TurnController, config: TrackerConfig) -> Self {
        StreetTracker {
            classifier,
            turner,
            config,
            state: TrackerState::Seeking,
        }
    }

    /// Last state the tracker reached
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Get the robot onto a street or intersection.
    ///
    /// Sweeps left by the search angle, then right by twice that, then
    /// returns to the starting heading and backs up before trying again.
    /// The robot is stopped when this returns.
    pub fn find_street(&mut self, robot: &mut dyn RobotIo) -> Result<()> {
        self.state = TrackerState::Seeking;
        robot.stop()?;
        let angle = self.config.search_angle_deg;

        for attempt in 1..=self.config.max_search_attempts {
            if self.on_street(robot)? || self.sweep(robot, -angle)? || self.sweep(robot, 2.0 * angle)? {
                log::debug!("Street found on search attempt {}", attempt);
                self.state = TrackerState::OnStreet;
                return Ok(());
            }

            self.turner.turn(robot, -angle)?;
            log::warn!("Street search attempt {} failed, backing up", attempt);
            robot.drive(-self.config.drive_power)?;
            for _ in 0..self.config.backup_polls {
                self.poll(robot)?;
            }
            robot.stop()?;
        }

        if self.on_street(robot)? {
            self.state = TrackerState::OnStreet;
            return Ok(());
        }
        self.state = TrackerState::Lost;
        Err(Error::StreetLost {
            attempts: self.config.max_search_attempts,
        })
    }

    /// Follow the street to the next intersection and stop centred on it
    pub fn drive_to_intersection(&mut self, robot: &mut dyn RobotIo, policy: BoundaryPolicy) -> Result<Arrival> {
        let power = self.config.drive_power;
        let mut reversed = false;
        // Starting on an intersection pad: drive off it before looking for the next one
        let mut leaving = self.poll(robot)? == Some(Color::Yellow);

        self.state = TrackerState::OnStreet;
        robot.drive(power)?;

        for _ in 0..self.config.max_drive_polls {
            match self.poll(robot)? {
                Some(Color::Yellow) if leaving => {}
                Some(Color::Yellow) => {
                    self.center(robot)?;
                    self.state = TrackerState::AtIntersection;
                    log::debug!("Stopped at intersection");
                    return Ok(Arrival::Intersection { reversed });
                }
                Some(Color::Black) => leaving = false,
                Some(Color::Red) => {
                    robot.stop()?;
                    self.state = TrackerState::AtBoundary;
                    match policy {
                        BoundaryPolicy::Abort => {
                            log::warn!("Map boundary reached, stopping");
                            return Ok(Arrival::Boundary);
                        }
                        BoundaryPolicy::Reverse => {
                            log::info!("Map boundary reached, turning around");
                            self.turner.turn(robot, 180.0)?;
                            reversed = !reversed;
                            leaving = false;
                            self.state = TrackerState::OnStreet;
                            robot.drive(power)?;
                        }
                    }
                }
                other => {
                    robot.stop()?;
                    log::debug!("Left the street ({:?}), searching", other);
                    self.find_street(robot)?;
                    robot.drive(power)?;
                }
            }
        }

        robot.stop()?;
        self.state = TrackerState::Lost;
        Err(Error::DriveTimeout {
            polls: self.config.max_drive_polls,
        })
    }

    /// Drive past the first yellow reading so the wheel axis, not the
    /// sensor, ends up over the intersection
    fn center(&self, robot: &mut dyn RobotIo) -> Result<()> {
        for _ in 0..self.config.center_polls {
            self.poll(robot)?;
        }
        robot.stop()
    }

    /// Short-burst classification that stops the wheels on failure
    fn poll(&self, robot: &mut dyn RobotIo) -> Result<Option<Color>> {
        match self.classifier.street(robot) {
            Ok(color) => Ok(color),
            Err(e) => {
                robot.stop()?;
                Err(e)
            }
        }
    }

    fn on_street(&self, robot: &mut dyn RobotIo) -> Result<bool> {
        Ok(self.poll(robot)?.map_or(false, Color::is_drivable))
    }

    /// Rotate by `angle`, stopping as soon as the street shows up
    fn sweep(&self, robot: &mut dyn RobotIo, angle: f64) -> Result<bool> {
        let classifier = &self.classifier;
        let rotation = self.turner.rotate_until(robot, angle, |r| {
            Ok(classifier.street(r)?.map_or(false, Color::is_drivable))
        })?;
        if rotation.interrupted {
            Ok(true)
        } else {
            self.on_street(robot)
        }
    }
}
