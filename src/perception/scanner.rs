//! Intersection scanning
//!
//! With the robot centred on an intersection, the forward-mounted sensor is
//! swung over each of the four surrounding buildings: 45 degrees left onto
//! the front-left building, then three clockwise quarter turns for the
//! front-right, back-right and back-left ones. The last turn unwinds the
//! whole sweep so the robot ends with the heading it started with.

use super::sensors::ColorClassifier;
use crate::common::types::Observation;
use crate::control::controllers::TurnController;
use crate::error::Result;
use crate::hardware::RobotIo;

/// Offset of the first corner from the robot's heading
const FIRST_CORNER_DEG: f64 = -45.0;
/// Rotation between consecutive corners
const CORNER_STEP_DEG: f64 = 90.0;

#[derive(Debug, Clone)]
pub struct IntersectionScanner {
    classifier: ColorClassifier,
    turner: TurnController,
}

impl IntersectionScanner {
    /// Create a new intersection scanner
    pub fn new(classifier: ColorClassifier, turner: TurnController) -> Self {
        IntersectionScanner { classifier, turner }
    }

    /// Read the four building colours clockwise from the robot's front-left
    pub fn scan(&self, robot: &mut dyn RobotIo) -> Result<Observation> {
        let mut colors = [None; 4];
        let mut rotated = self.turner.turn(robot, FIRST_CORNER_DEG)?;
        for (corner, color) in colors.iter_mut().enumerate() {
            if corner > 0 {
                rotated += self.turner.turn(robot, CORNER_STEP_DEG)?;
            }
            *color = self.classifier.building(robot)?;
        }
        self.turner.turn(robot, -rotated)?;

        let observation = Observation(colors);
        log::debug!("Scanned {}", observation);
        Ok(observation)
    }
}
