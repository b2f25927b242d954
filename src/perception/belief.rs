//! Histogram filter over (intersection, heading)
//!
//! The belief is kept as four `height x width` matrices, one per heading,
//! indexed `(row = y, column = x)`. It sums to one after every update.
//!
//! Motion model: after a straight advance of one cell, mass for heading `h`
//! at cell `c` comes from the cell behind `c` with respect to `h`. Cells with
//! nothing behind them get a small floor instead of zero so a wrong early
//! guess can still be recovered from.
//!
//! Measurement model: a scan is compared with each cell's stored corners
//! rotated into the hypothesised heading, and the hypothesis is scaled by the
//! match or mismatch likelihood. Both factors are strictly positive, so
//! normalisation never divides by zero.

use crate::common::types::{Corners, Heading, Observation, Pose, Turn};
use crate::config::{FilterConfig, LikelihoodModel};
use crate::map::StreetMap;
use nalgebra::DMatrix;

#[derive(Debug, Clone)]
pub struct HistogramFilter {
    width: usize,
    height: usize,
    layers: [DMatrix<f64>; 4],
    config: FilterConfig,
}

impl HistogramFilter {
    /// Uniform belief over a `width x height` grid
    pub fn new(width: usize, height: usize, config: FilterConfig) -> Self {
        let uniform = 1.0 / (4 * width * height) as f64;
        HistogramFilter {
            width,
            height,
            layers: std::array::from_fn(|_| DMatrix::from_element(height, width, uniform)),
            config,
        }
    }

    /// Create a uniform filter sized to `map`
    pub fn for_map(map: &StreetMap, config: FilterConfig) -> Self {
        Self::new(map.width(), map.height(), config)
    }

    /// Back to the uniform prior
    pub fn reset(&mut self) {
        let uniform = 1.0 / self.hypotheses() as f64;
        for layer in self.layers.iter_mut() {
            layer.fill(uniform);
        }
    }

    /// Size of the hypothesis space, `4 * width * height`
    pub fn hypotheses(&self) -> usize {
        4 * self.width * self.height
    }

    /// Belief held by one hypothesis
    pub fn belief(&self, pose: Pose) -> f64 {
        self.layers[pose.heading.index()][(pose.cell.y, pose.cell.x)]
    }

    /// Sum over every hypothesis
    pub fn total(&self) -> f64 {
        self.layers.iter().map(|layer| layer.sum()).sum()
    }

    /// All hypotheses with their belief
    pub fn iter(&self) -> impl Iterator<Item = (Pose, f64)> + '_ {
        Heading::ALL.into_iter().flat_map(move |heading| {
            let layer = &self.layers[heading.index()];
            (0..self.height).flat_map(move |y| {
                (0..self.width).map(move |x| (Pose::new(x, y, heading), layer[(y, x)]))
            })
        })
    }

    /// Shift belief one cell along each heading after a straight advance
    pub fn predict_advance(&mut self) {
        let floor = self.config.edge_floor / self.hypotheses() as f64;
        for heading in Heading::ALL {
            let (dx, dy) = heading.offset();
            let previous = &self.layers[heading.index()];
            let shifted = DMatrix::from_fn(self.height, self.width, |y, x| {
                let from_x = x as i64 - dx;
                let from_y = y as i64 - dy;
                if self.in_bounds(from_x, from_y) {
                    previous[(from_y as usize, from_x as usize)]
                } else {
                    floor
                }
            });
            self.layers[heading.index()] = shifted;
        }
        self.normalize();
    }

    /// Re-label headings after the robot turned in place
    pub fn rotate(&mut self, turn: Turn) {
        self.layers.rotate_right(turn.quarter_turns());
    }

    /// Bayesian correction with one intersection scan
    pub fn observe(&mut self, map: &StreetMap, observation: &Observation) {
        debug_assert_eq!((map.width(), map.height()), (self.width, self.height));
        for cell in map.cells() {
            let corners = map.corners(cell);
            for heading in Heading::ALL {
                let likelihood = self.likelihood(observation, &corners.rotated(heading));
                self.layers[heading.index()][(cell.y, cell.x)] *= likelihood;
            }
        }
        self.normalize();
    }

    /// Evidence from turning around at the map border: the heading held
    /// before the reversal faced off the map. Call before rotating the
    /// belief for the reversal itself.
    pub fn observe_boundary(&mut self, map: &StreetMap) {
        for cell in map.cells() {
            for heading in Heading::ALL {
                let likelihood = if map.neighbor(cell, heading).is_none() {
                    self.config.match_likelihood
                } else {
                    self.config.mismatch_likelihood
                };
                self.layers[heading.index()][(cell.y, cell.x)] *= likelihood;
            }
        }
        self.normalize();
    }

    /// Most likely hypothesis and its belief
    pub fn best(&self) -> (Pose, f64) {
        let mut best = (Pose::new(0, 0, Heading::Up), f64::NEG_INFINITY);
        for (pose, belief) in self.iter() {
            if belief > best.1 {
                best = (pose, belief);
            }
        }
        best
    }

    /// The committed pose once one hypothesis reaches the convergence threshold
    pub fn converged(&self) -> Option<Pose> {
        let (pose, belief) = self.best();
        (belief >= self.config.convergence_threshold).then_some(pose)
    }

    fn likelihood(&self, observation: &Observation, expected: &Corners) -> f64 {
        let hit = self.config.match_likelihood;
        let miss = self.config.mismatch_likelihood;
        match self.config.likelihood_model {
            LikelihoodModel::Exact => {
                if observation.matches(expected) {
                    hit
                } else {
                    miss
                }
            }
            LikelihoodModel::PerCorner => {
                let matching = observation.matching_corners(expected) as i32;
                hit.powi(matching) * miss.powi(4 - matching)
            }
        }
    }

    fn normalize(&mut self) {
        let total = self.total();
        if total > 0.0 && total.is_finite() {
            for layer in self.layers.iter_mut() {
                *layer /= total;
            }
        } else {
            log::warn!("Belief collapsed (total {}), resetting to uniform", total);
            self.reset();
        }
    }

    fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
}
