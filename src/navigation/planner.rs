//! Route planning on the intersection grid

use crate::common::types::{Cell, Heading, Pose, Turn};
use crate::error::{Error, Result};
use std::fmt;

/// One step of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    /// Turn in place at the current intersection
    Turn(Turn),
    /// Follow the street ahead to the next intersection
    Advance,
}

impl fmt::Display for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteAction::Turn(turn) => write!(f, "turn {:?}", turn),
            RouteAction::Advance => write!(f, "advance"),
        }
    }
}

/// Trait for route planning algorithms
pub trait PathPlanner: Send + Sync {
    /// Plan a route from `start` to the intersection `goal`
    fn plan_path(&self, start: Pose, goal: Cell) -> Result<Vec<RouteAction>>;
}

/// Axis-aligned planner: covers the x distance first, then y, turning only
/// when the next leg needs a different heading. Every street exists on a
/// full grid, so this is always a shortest route.
#[derive(Debug, Clone, Copy)]
pub struct ManhattanPlanner {
    width: usize,
    height: usize,
}

impl ManhattanPlanner {
    /// Create a planner for a `width x height` grid
    pub fn new(width: usize, height: usize) -> Self {
        ManhattanPlanner { width, height }
    }

    fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    fn leg(route: &mut Vec<RouteAction>, heading: &mut Heading, towards: Heading, steps: usize) {
        if steps == 0 {
            return;
        }
        if let Some(turn) = heading.turn_to(towards) {
            route.push(RouteAction::Turn(turn));
            *heading = towards;
        }
        route.extend(std::iter::repeat(RouteAction::Advance).take(steps));
    }
}

impl PathPlanner for ManhattanPlanner {
    fn plan_path(&self, start: Pose, goal: Cell) -> Result<Vec<RouteAction>> {
        if !self.contains(goal) {
            return Err(Error::DestinationOutOfMap {
                x: goal.x as i64,
                y: goal.y as i64,
                width: self.width,
                height: self.height,
            });
        }
        if !self.contains(start.cell) {
            return Err(Error::InvalidMap(format!("start {} lies outside the map", start)));
        }

        let mut route = Vec::new();
        let mut heading = start.heading;
        let x_heading = if goal.x > start.cell.x { Heading::Right } else { Heading::Left };
        Self::leg(&mut route, &mut heading, x_heading, start.cell.x.abs_diff(goal.x));
        let y_heading = if goal.y > start.cell.y { Heading::Down } else { Heading::Up };
        Self::leg(&mut route, &mut heading, y_heading, start.cell.y.abs_diff(goal.y));
        Ok(route)
    }
}
