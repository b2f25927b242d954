//! Robot I/O abstraction
//!
//! Everything above this module talks to motors, gyro and colour sensor
//! through [`RobotIo`]. Only one command (drive, turn or stop) is ever
//! outstanding: a new command replaces the previous one, and callers issue
//! `stop()` before switching between driving and turning.

pub mod sim;

use crate::error::Result;
use std::fmt;
use std::time::Duration;

pub use sim::SimRobot;

/// Sensor port on the robot brick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Port(pub u8);

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port {}", self.0)
    }
}

/// Command currently applied to the wheels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Stopped,
    /// Both wheels at the same power, negative reverses
    Driving(i32),
    /// Independent left and right wheel powers
    Turning(i32, i32),
}

/// Motor, gyro and colour-sensor primitives of a differential-drive robot
pub trait RobotIo {
    /// Drive both wheels at `power`
    fn drive(&mut self, power: i32) -> Result<()>;

    /// Drive the wheels at different powers; `left > right` turns clockwise
    fn turn(&mut self, left_power: i32, right_power: i32) -> Result<()>;

    /// Stop both wheels
    fn stop(&mut self) -> Result<()>;

    /// One raw colour label from the sensor on `port`. Values outside 1..=6
    /// are possible and mean the reading is unusable.
    fn read_color(&mut self, port: Port) -> Result<i32>;

    /// Cumulative angle (degrees, clockwise positive) and rate (degrees/s)
    /// from the gyro on `port`, optionally zeroing the angle first
    fn read_gyro(&mut self, port: Port, reset: bool) -> Result<(f64, f64)>;

    /// Let physical time pass between polls
    fn wait(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
