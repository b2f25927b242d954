//! Shared fixtures: a 3x3 map on which every (cell, heading) reads a
//! different set of corners, and helpers to wire components to a simulator
#![allow(dead_code)]

use citygrid_core::common::types::{Color, Corners};
use citygrid_core::config::{CoreConfig, SimConfig};
use citygrid_core::control::{StreetTracker, TurnController};
use citygrid_core::hardware::{Port, SimRobot};
use citygrid_core::map::StreetMap;
use citygrid_core::perception::{ColorClassifier, IntersectionScanner};
use std::time::Duration;

pub const COLOR_PORT: Port = Port(3);
pub const GYRO_PORT: Port = Port(2);

pub fn city_map() -> StreetMap {
    use Color::{Blue as B, Green as G, White as W};
    let cells = [
        [G, G, G, B],
        [G, G, G, W],
        [G, G, B, B],
        [G, G, W, B],
        [G, B, W, G],
        [G, G, W, W],
        [G, B, G, W],
        [G, B, B, B],
        [G, B, B, W],
    ];
    StreetMap::new(3, 3, cells.into_iter().map(Corners).collect()).unwrap()
}

pub fn test_config() -> CoreConfig {
    let mut config = CoreConfig::default();
    config.robot.poll_interval_ms = 0;
    config
}

pub fn sim_at(x: f64, y: f64, heading_deg: f64) -> SimRobot {
    noisy_sim_at(x, y, heading_deg, 0.0, 1)
}

pub fn noisy_sim_at(x: f64, y: f64, heading_deg: f64, misread_rate: f64, seed: u64) -> SimRobot {
    let config = SimConfig {
        start_x: x,
        start_y: y,
        start_heading_deg: heading_deg,
        misread_rate,
        seed,
        ..SimConfig::default()
    };
    SimRobot::new(city_map(), config, COLOR_PORT, GYRO_PORT)
}

pub fn components(config: &CoreConfig) -> (ColorClassifier, TurnController, IntersectionScanner, StreetTracker) {
    let classifier = ColorClassifier::new(COLOR_PORT, &config.classifier);
    let turner = TurnController::new(GYRO_PORT, &config.turn, Duration::ZERO);
    let scanner = IntersectionScanner::new(classifier.clone(), turner.clone());
    let tracker = StreetTracker::new(classifier.clone(), turner.clone(), config.tracker.clone());
    (classifier, turner, scanner, tracker)
}
