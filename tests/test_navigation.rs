mod common;

use citygrid_core::common::types::{Cell, Heading, Pose, Turn};
use citygrid_core::config::CoreConfig;
use citygrid_core::control::StreetTracker;
use citygrid_core::hardware::Motion;
use citygrid_core::navigation::planner::{ManhattanPlanner, PathPlanner, RouteAction};
use citygrid_core::navigation::{Deviation, NavigationOutcome, Navigator};
use citygrid_core::{Error, Result};
use common::{city_map, components, sim_at, test_config};

fn navigator(config: &CoreConfig) -> (Navigator, StreetTracker) {
    let (_, turner, scanner, tracker) = components(config);
    let navigator = Navigator::new(
        Box::new(ManhattanPlanner::new(3, 3)),
        scanner,
        turner,
        config.navigation.clone(),
    );
    (navigator, tracker)
}

/// Drives straight ahead regardless of the goal
struct StraightOn;

impl PathPlanner for StraightOn {
    fn plan_path(&self, _start: Pose, _goal: Cell) -> Result<Vec<RouteAction>> {
        Ok(vec![RouteAction::Advance])
    }
}

#[test]
fn straight_route_arrives_without_turning() {
    let map = city_map();
    let (navigator, mut tracker) = navigator(&test_config());
    let mut robot = sim_at(0.0, 0.0, 90.0);

    let outcome = navigator
        .go_to(&mut robot, &mut tracker, &map, Pose::new(0, 0, Heading::Right), Cell::new(2, 0))
        .unwrap();

    assert_eq!(outcome, NavigationOutcome::Arrived(Pose::new(2, 0, Heading::Right)));
    assert_eq!(robot.cell_within(0.05), Some(Cell::new(2, 0)));
    assert_eq!(robot.grid_heading(1.0), Some(Heading::Right));
    assert_eq!(robot.motion(), Motion::Stopped);
}

#[test]
fn turning_route_reaches_far_corner() {
    let map = city_map();
    let (navigator, mut tracker) = navigator(&test_config());
    let mut robot = sim_at(1.0, 0.0, 0.0);

    let outcome = navigator
        .go_to(&mut robot, &mut tracker, &map, Pose::new(1, 0, Heading::Up), Cell::new(2, 2))
        .unwrap();

    assert_eq!(outcome, NavigationOutcome::Arrived(Pose::new(2, 2, Heading::Down)));
    assert_eq!(robot.cell_within(0.05), Some(Cell::new(2, 2)));
    assert_eq!(robot.grid_heading(1.0), Some(Heading::Down));
}

#[test]
fn planned_route_matches_manhattan_order() {
    let planner = ManhattanPlanner::new(3, 3);
    let route = planner.plan_path(Pose::new(1, 0, Heading::Up), Cell::new(2, 2)).unwrap();
    assert_eq!(
        route,
        vec![
            RouteAction::Turn(Turn::Right),
            RouteAction::Advance,
            RouteAction::Turn(Turn::Right),
            RouteAction::Advance,
            RouteAction::Advance,
        ]
    );
}

#[test]
fn street_is_reacquired_mid_leg() {
    let map = city_map();
    let (navigator, mut tracker) = navigator(&test_config());
    // Skewed 8 degrees towards the buildings, so the sensor slides off the
    // street shortly after leaving the intersection
    let mut robot = sim_at(0.0, 0.0, 98.0);

    let outcome = navigator
        .go_to(&mut robot, &mut tracker, &map, Pose::new(0, 0, Heading::Right), Cell::new(1, 0))
        .unwrap();

    assert_eq!(outcome, NavigationOutcome::Arrived(Pose::new(1, 0, Heading::Right)));
    assert_eq!(robot.cell_within(0.05), Some(Cell::new(1, 0)));
    // The search swung the robot back towards the street
    assert!(robot.heading_deg() < 95.0);
    assert_eq!(robot.motion(), Motion::Stopped);
}

#[test]
fn boundary_aborts_the_route() {
    let map = city_map();
    let (navigator, mut tracker) = navigator(&test_config());
    // Really at (2, 0) but believes it is one intersection further left
    let mut robot = sim_at(2.0, 0.0, 90.0);

    let outcome = navigator
        .go_to(&mut robot, &mut tracker, &map, Pose::new(1, 0, Heading::Right), Cell::new(2, 0))
        .unwrap();

    assert_eq!(outcome, NavigationOutcome::Deviated(Deviation::Boundary));
    assert_eq!(robot.motion(), Motion::Stopped);
    let (x, _) = robot.position();
    assert!(x > 2.0 && x < 2.6);
}

#[test]
fn wrong_corners_abort_the_route() {
    let map = city_map();
    let (navigator, mut tracker) = navigator(&test_config());
    // Really on the middle row, believes it is on the top one
    let mut robot = sim_at(0.0, 1.0, 90.0);

    let outcome = navigator
        .go_to(&mut robot, &mut tracker, &map, Pose::new(0, 0, Heading::Right), Cell::new(1, 0))
        .unwrap();

    let NavigationOutcome::Deviated(Deviation::CornerMismatch { expected, observed }) = outcome else {
        panic!("expected a corner mismatch, got {:?}", outcome);
    };
    assert_eq!(expected, Pose::new(1, 0, Heading::Right));
    assert!(observed.matches(&map.expected_observation(Pose::new(1, 1, Heading::Right))));
    assert_eq!(robot.motion(), Motion::Stopped);
}

#[test]
fn skipping_verification_trusts_the_route() {
    let map = city_map();
    let mut config = test_config();
    config.navigation.verify_stops = false;
    let (navigator, mut tracker) = navigator(&config);
    let mut robot = sim_at(0.0, 1.0, 90.0);

    let outcome = navigator
        .go_to(&mut robot, &mut tracker, &map, Pose::new(0, 0, Heading::Right), Cell::new(1, 0))
        .unwrap();

    // Nothing checks the corners, so the wrong belief goes unnoticed
    assert_eq!(outcome, NavigationOutcome::Arrived(Pose::new(1, 0, Heading::Right)));
    assert_eq!(robot.cell_within(0.05), Some(Cell::new(1, 1)));
}

#[test]
fn no_street_ahead_is_off_map() {
    let map = city_map();
    let (mut navigator, mut tracker) = navigator(&test_config());
    navigator.set_planner(StraightOn);
    let mut robot = sim_at(2.0, 0.0, 90.0);

    let outcome = navigator
        .go_to(&mut robot, &mut tracker, &map, Pose::new(2, 0, Heading::Right), Cell::new(0, 0))
        .unwrap();

    assert_eq!(outcome, NavigationOutcome::Deviated(Deviation::OffMap));
    assert_eq!(robot.position(), (2.0, 0.0));
}

#[test]
fn destination_outside_map_is_rejected() {
    let map = city_map();
    let (navigator, mut tracker) = navigator(&test_config());
    let mut robot = sim_at(0.0, 0.0, 90.0);

    let err = navigator
        .go_to(&mut robot, &mut tracker, &map, Pose::new(0, 0, Heading::Right), Cell::new(5, 1))
        .unwrap_err();

    assert!(matches!(err, Error::DestinationOutOfMap { x: 5, y: 1, width: 3, height: 3 }));
}
