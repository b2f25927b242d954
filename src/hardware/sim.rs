//! Simulated robot on a street map
//!
//! Renders the map as the colour sensor would see it: black streets through
//! every intersection, yellow intersection pads, one building per corner of
//! each intersection, a red border around the street grid and white paper
//! beyond it. Coordinates are in cell units with intersection `(i, j)` at
//! `(i, j)` and rows growing downwards. Headings are degrees clockwise from
//! Up.
//!
//! The simulation is sample-clocked: every colour or gyro read advances the
//! physics by one tick, and [`RobotIo::wait`] is free. This keeps test runs
//! deterministic and independent of wall-clock time.

use super::{Motion, Port, RobotIo};
use crate::common::types::{Cell, Color, Heading};
use crate::config::SimConfig;
use crate::error::{Error, Result};
use crate::map::StreetMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Simulated seconds per tick
const TICK_SECONDS: f64 = 0.01;

pub struct SimRobot {
    map: StreetMap,
    config: SimConfig,
    color_port: Port,
    gyro_port: Port,
    x: f64,
    y: f64,
    heading_deg: f64,
    motion: Motion,
    gyro_angle: f64,
    gyro_rate: f64,
    rng: StdRng,
}

impl SimRobot {
    /// Create a robot at the configured start pose, stopped
    pub fn new(map: StreetMap, config: SimConfig, color_port: Port, gyro_port: Port) -> Self {
        let rng = if config.seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(config.seed)
        };
        SimRobot {
            x: config.start_x,
            y: config.start_y,
            heading_deg: config.start_heading_deg,
            map,
            config,
            color_port,
            gyro_port,
            motion: Motion::Stopped,
            gyro_angle: 0.0,
            gyro_rate: 0.0,
            rng,
        }
    }

    /// Wheel-axis position in cell units
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// True heading, normalised to [0, 360)
    pub fn heading_deg(&self) -> f64 {
        self.heading_deg.rem_euclid(360.0)
    }

    /// Command currently applied to the wheels
    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Map the simulator renders
    pub fn map(&self) -> &StreetMap {
        &self.map
    }

    /// Intersection the robot is centred on, within `tolerance` cells
    pub fn cell_within(&self, tolerance: f64) -> Option<Cell> {
        let (ix, iy) = (self.x.round(), self.y.round());
        let near = (self.x - ix).abs() <= tolerance && (self.y - iy).abs() <= tolerance;
        if near && self.map.contains(ix as i64, iy as i64) {
            Some(Cell::new(ix as usize, iy as usize))
        } else {
            None
        }
    }

    /// Grid heading the robot faces, within `tolerance` degrees
    pub fn grid_heading(&self, tolerance: f64) -> Option<Heading> {
        let quarter = (self.heading_deg() / 90.0).round();
        if (self.heading_deg() - quarter * 90.0).abs() <= tolerance {
            Some(Heading::from_index(quarter as usize))
        } else {
            None
        }
    }

    /// Noise-free label under the colour sensor
    pub fn surface_under_sensor(&self) -> i32 {
        let (dx, dy) = direction(self.heading_deg);
        self.surface_at(
            self.x + dx * self.config.sensor_offset,
            self.y + dy * self.config.sensor_offset,
        )
    }

    /// Noise-free label at a point of the printed map
    pub fn surface_at(&self, px: f64, py: f64) -> i32 {
        let c = &self.config;
        let max_x = (self.map.width() - 1) as f64;
        let max_y = (self.map.height() - 1) as f64;
        let margin = c.boundary_margin;
        let outside = |v: f64, max: f64, pad: f64| v < -pad || v > max + pad;

        if outside(px, max_x, margin) || outside(py, max_y, margin) {
            let pad = margin + c.boundary_width;
            return if outside(px, max_x, pad) || outside(py, max_y, pad) {
                Color::White.label()
            } else {
                Color::Red.label()
            };
        }

        let ix = px.round().clamp(0.0, max_x);
        let iy = py.round().clamp(0.0, max_y);
        let dx = px - ix;
        let dy = py - iy;

        if dx.abs() <= c.intersection_half_size && dy.abs() <= c.intersection_half_size {
            return Color::Yellow.label();
        }
        if dx.abs() <= c.street_half_width || dy.abs() <= c.street_half_width {
            return Color::Black.label();
        }

        let corner = match (dx > 0.0, dy > 0.0) {
            (false, false) => 0,
            (true, false) => 1,
            (true, true) => 2,
            (false, true) => 3,
        };
        let cell = Cell::new(ix as usize, iy as usize);
        self.map.corners(cell).0[corner].label()
    }

    fn tick(&mut self) {
        let before = self.heading_deg;
        match self.motion {
            Motion::Stopped => {}
            Motion::Driving(power) => {
                if self.config.heading_noise_deg > 0.0 {
                    let noise = self.config.heading_noise_deg;
                    self.heading_deg += self.rng.gen_range(-noise..=noise);
                }
                self.advance(power as f64 * self.config.drive_step);
            }
            Motion::Turning(left, right) => {
                self.heading_deg += (left - right) as f64 / 2.0 * self.config.turn_step;
                self.advance((left + right) as f64 / 2.0 * self.config.drive_step);
            }
        }
        let delta = self.heading_deg - before;
        self.gyro_angle += delta;
        self.gyro_rate = delta / TICK_SECONDS;
    }

    fn advance(&mut self, distance: f64) {
        let (dx, dy) = direction(self.heading_deg);
        self.x += dx * distance;
        self.y += dy * distance;
    }

    fn check_port(&self, port: Port, expected: Port, what: &str) -> Result<()> {
        if port == expected {
            Ok(())
        } else {
            Err(Error::Hardware(format!("no {} on {}", what, port)))
        }
    }
}

/// Unit step for a heading in degrees clockwise from Up
fn direction(heading_deg: f64) -> (f64, f64) {
    let rad = heading_deg.to_radians();
    (rad.sin(), -rad.cos())
}

impl RobotIo for SimRobot {
    fn drive(&mut self, power: i32) -> Result<()> {
        self.motion = Motion::Driving(power);
        Ok(())
    }

    fn turn(&mut self, left_power: i32, right_power: i32) -> Result<()> {
        self.motion = Motion::Turning(left_power, right_power);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.motion = Motion::Stopped;
        Ok(())
    }

    fn read_color(&mut self, port: Port) -> Result<i32> {
        self.check_port(port, self.color_port, "colour sensor")?;
        self.tick();
        let rate = self.config.misread_rate;
        if rate > 0.0 && self.rng.gen_bool(rate.min(1.0)) {
            return Ok(self.rng.gen_range(-1..=7));
        }
        Ok(self.surface_under_sensor())
    }

    fn read_gyro(&mut self, port: Port, reset: bool) -> Result<(f64, f64)> {
        self.check_port(port, self.gyro_port, "gyro")?;
        if reset {
            self.gyro_angle = 0.0;
            self.gyro_rate = 0.0;
            return Ok((0.0, 0.0));
        }
        self.tick();
        Ok((self.gyro_angle, self.gyro_rate))
    }

    fn wait(&mut self, _duration: Duration) {}
}
