//! Controllers for the robot

use crate::config::TurnConfig;
use crate::error::{Error, Result};
use crate::hardware::{Port, RobotIo};
use std::time::Duration;

/// Outcome of a gyro-controlled rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// Angle the gyro measured when the wheels stopped, clockwise positive
    pub angle: f64,
    /// Whether the rotation was cut short by its stop condition
    pub interrupted: bool,
}

/// Rotates a differential-drive robot in place using gyro feedback
#[derive(Debug, Clone)]
pub struct TurnController {
    gyro_port: Port,
    power: i32,
    tolerance_deg: f64,
    max_polls: usize,
    poll_interval: Duration,
}

impl TurnController {
    /// Create a new turn controller
    pub fn new(gyro_port: Port, config: &TurnConfig, poll_interval: Duration) -> Self {
        TurnController {
            gyro_port,
            power: config.power,
            tolerance_deg: config.tolerance_deg,
            max_polls: config.max_polls,
            poll_interval,
        }
    }

    /// Rotate by `angle` degrees (positive is clockwise) and stop
    pub fn turn(&self, robot: &mut dyn RobotIo, angle: f64) -> Result<f64> {
        self.rotate_until(robot, angle, |_| Ok(false))
            .map(|rotation| rotation.angle)
    }

    /// Rotate by up to `angle` degrees, polling `stop_when` after every gyro
    /// read and stopping early as soon as it returns true
    pub fn rotate_until<F>(&self, robot: &mut dyn RobotIo, angle: f64, mut stop_when: F) -> Result<Rotation>
    where
        F: FnMut(&mut dyn RobotIo) -> Result<bool>,
    {
        if !angle.is_finite() || angle.abs() > 360.0 {
            log::error!("Rejecting turn of {} degrees", angle);
            return Err(Error::InvalidTurnAngle(angle));
        }
        if angle.abs() <= self.tolerance_deg {
            return Ok(Rotation {
                angle: 0.0,
                interrupted: false,
            });
        }

        robot.stop()?;
        robot.read_gyro(self.gyro_port, true)?;
        let (left, right) = if angle > 0.0 {
            (self.power, -self.power)
        } else {
            (-self.power, self.power)
        };
        robot.turn(left, right)?;

        let threshold = angle.abs() - self.tolerance_deg;
        let mut measured = 0.0;
        for _ in 0..self.max_polls {
            let polled = robot
                .read_gyro(self.gyro_port, false)
                .and_then(|(reading, _rate)| {
                    measured = reading;
                    if reading.abs() >= threshold {
                        Ok(Some(false))
                    } else if stop_when(&mut *robot)? {
                        Ok(Some(true))
                    } else {
                        Ok(None)
                    }
                });
            match polled {
                Ok(Some(interrupted)) => {
                    robot.stop()?;
                    log::debug!("Turned {:.1} of {:.1} degrees", measured, angle);
                    return Ok(Rotation {
                        angle: measured,
                        interrupted,
                    });
                }
                Ok(None) => robot.wait(self.poll_interval),
                Err(e) => {
                    robot.stop()?;
                    return Err(e);
                }
            }
        }

        robot.stop()?;
        Err(Error::TurnTimeout {
            target: angle,
            reached: measured,
        })
    }
}
