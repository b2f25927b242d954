mod common;

use approx::assert_relative_eq;
use citygrid_core::common::types::{Heading, Pose};
use citygrid_core::config::{CoreConfig, LocalizationConfig};
use citygrid_core::control::StreetTracker;
use citygrid_core::hardware::Motion;
use citygrid_core::perception::{HistogramFilter, Localizer};
use citygrid_core::Error;
use common::{city_map, components, noisy_sim_at, sim_at, test_config};

fn localizer(config: &CoreConfig) -> (Localizer, StreetTracker) {
    let map = city_map();
    let (_, turner, scanner, tracker) = components(config);
    let localizer = Localizer::new(
        HistogramFilter::for_map(&map, config.filter.clone()),
        scanner,
        turner,
        config.localization.clone(),
    );
    (localizer, tracker)
}

#[test]
fn converges_after_two_visits_from_mid_street() {
    let map = city_map();
    let config = test_config();
    let (mut localizer, mut tracker) = localizer(&config);
    let mut robot = sim_at(1.0, 1.5, 0.0);

    let pose = localizer.localize(&mut robot, &mut tracker, &map).unwrap();

    assert_eq!(pose, Pose::new(1, 0, Heading::Up));
    assert_eq!(robot.cell_within(0.05), Some(pose.cell));
    assert_eq!(robot.grid_heading(1.0), Some(Heading::Up));
    assert_eq!(robot.motion(), Motion::Stopped);

    let filter = localizer.filter();
    assert_relative_eq!(filter.total(), 1.0, epsilon = 1e-9);
    let (best, belief) = filter.best();
    assert_eq!(best, pose);
    assert!(belief > 0.9);
}

#[test]
fn recovers_street_when_starting_off_it() {
    let map = city_map();
    let config = test_config();
    let (mut localizer, mut tracker) = localizer(&config);
    // Tilted far enough that the sensor starts over a building
    let mut robot = sim_at(1.0, 1.5, 30.0);

    let pose = localizer.localize(&mut robot, &mut tracker, &map).unwrap();

    assert_eq!(robot.cell_within(0.05), Some(pose.cell));
    assert_eq!(robot.grid_heading(1.0), Some(pose.heading));
}

#[test]
fn converges_on_the_truth_under_sensor_noise() {
    let map = city_map();
    let config = test_config();
    let (mut localizer, mut tracker) = localizer(&config);
    let mut robot = noisy_sim_at(0.5, 2.0, 270.0, 0.02, 17);

    let pose = localizer.localize(&mut robot, &mut tracker, &map).unwrap();

    assert_eq!(robot.cell_within(0.05), Some(pose.cell));
    assert_eq!(robot.grid_heading(1.0), Some(pose.heading));
}

#[test]
fn gives_up_after_visit_cap() {
    let map = city_map();
    let mut config = test_config();
    config.localization = LocalizationConfig {
        max_visits: 1,
        ..LocalizationConfig::default()
    };
    let (mut localizer, mut tracker) = localizer(&config);
    let mut robot = sim_at(1.0, 1.5, 0.0);

    let err = localizer.localize(&mut robot, &mut tracker, &map).unwrap_err();

    assert!(matches!(err, Error::LocalizationFailed { visits: 1 }));
    assert_eq!(robot.motion(), Motion::Stopped);
    assert!(localizer.filter().converged().is_none());
}
