//! Control module: gyro turns and street following
pub mod controllers;
pub mod street_tracker;

pub use self::controllers::TurnController;
pub use self::street_tracker::{Arrival, BoundaryPolicy, StreetTracker};
