pub mod common;
pub mod config;
pub mod control;
pub mod error;
pub mod hardware;
pub mod map;
pub mod navigation;
pub mod perception;

pub use crate::error::{Error, Result};

use crate::common::types::{Cell, Pose};
use crate::config::CoreConfig;
use crate::control::{StreetTracker, TurnController};
use crate::hardware::{Port, RobotIo, SimRobot};
use crate::map::StreetMap;
use crate::navigation::planner::ManhattanPlanner;
use crate::navigation::{NavigationOutcome, Navigator};
use crate::perception::{ColorClassifier, HistogramFilter, IntersectionScanner, Localizer};
use std::time::Duration;

/// Summary of one mission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissionReport {
    pub reached: bool,
    /// Pose at the end of the last navigation attempt, if it arrived
    pub final_pose: Option<Pose>,
    /// Localize-and-navigate attempts used
    pub attempts: usize,
}

/// Core functionality for the street-grid robot
pub struct CityGridCore {
    map: StreetMap,
    classifier: ColorClassifier,
    tracker: StreetTracker,
    localizer: Localizer,
    navigator: Navigator,
    max_attempts: usize,
}

impl CityGridCore {
    /// Wire every component from one configuration
    pub fn new(map: StreetMap, config: &CoreConfig) -> Self {
        let poll_interval = Duration::from_millis(config.robot.poll_interval_ms);
        let classifier = ColorClassifier::new(Port(config.robot.color_port), &config.classifier);
        let turner = TurnController::new(Port(config.robot.gyro_port), &config.turn, poll_interval);
        let scanner = IntersectionScanner::new(classifier.clone(), turner.clone());

        let tracker = StreetTracker::new(classifier.clone(), turner.clone(), config.tracker.clone());
        let localizer = Localizer::new(
            HistogramFilter::for_map(&map, config.filter.clone()),
            scanner.clone(),
            turner.clone(),
            config.localization.clone(),
        );
        let navigator = Navigator::new(
            Box::new(ManhattanPlanner::new(map.width(), map.height())),
            scanner,
            turner,
            config.navigation.clone(),
        );

        CityGridCore {
            map,
            classifier,
            tracker,
            localizer,
            navigator,
            max_attempts: config.mission.max_attempts,
        }
    }

    /// The map the robot localizes on
    pub fn map(&self) -> &StreetMap {
        &self.map
    }

    /// Colour classifier, for calibration reads
    pub fn classifier(&self) -> &ColorClassifier {
        &self.classifier
    }

    /// Localizer and its current belief
    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    /// Check CLI-style signed coordinates against the map
    pub fn destination(&self, x: i64, y: i64) -> Result<Cell> {
        if self.map.contains(x, y) {
            Ok(Cell::new(x as usize, y as usize))
        } else {
            Err(Error::DestinationOutOfMap {
                x,
                y,
                width: self.map.width(),
                height: self.map.height(),
            })
        }
    }

    /// Localize from scratch
    pub fn localize(&mut self, robot: &mut dyn RobotIo) -> Result<Pose> {
        self.localizer.localize(robot, &mut self.tracker, &self.map)
    }

    /// Localize, then drive to `goal`, relocalizing whenever the route is
    /// abandoned. Gives up after the configured number of attempts.
    pub fn run(&mut self, robot: &mut dyn RobotIo, goal: Cell) -> Result<MissionReport> {
        for attempt in 1..=self.max_attempts {
            let pose = self.localize(robot)?;
            match self.navigator.go_to(robot, &mut self.tracker, &self.map, pose, goal)? {
                NavigationOutcome::Arrived(pose) => {
                    log::info!("Reached {} on attempt {}", goal, attempt);
                    return Ok(MissionReport {
                        reached: true,
                        final_pose: Some(pose),
                        attempts: attempt,
                    });
                }
                NavigationOutcome::Deviated(deviation) => {
                    log::warn!("Attempt {} abandoned ({:?}), relocalizing", attempt, deviation);
                }
            }
        }

        robot.stop()?;
        log::error!("Giving up on {} after {} attempts", goal, self.max_attempts);
        Ok(MissionReport {
            reached: false,
            final_pose: None,
            attempts: self.max_attempts,
        })
    }
}

/// Open the robot backend named in the configuration
pub fn open_robot(config: &CoreConfig, map: &StreetMap) -> Result<Box<dyn RobotIo>> {
    match config.robot.backend.as_str() {
        "sim" => Ok(Box::new(SimRobot::new(
            map.clone(),
            config.simulation.clone(),
            Port(config.robot.color_port),
            Port(config.robot.gyro_port),
        ))),
        other => Err(Error::ChannelUnavailable(format!("unsupported robot backend '{}'", other))),
    }
}
