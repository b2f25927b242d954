//! Filtering algorithms for sensor data

use crate::config::ClassifierConfig;
use std::collections::BTreeMap;

/// A generic filter interface
pub trait Filter<I> {
    type Output;

    /// Filter the input data
    fn filter(&self, input: I) -> Self::Output;
}

/// Majority vote over a burst of raw labels
///
/// Labels outside `min_label..=max_label` are dropped before voting. Ties go
/// to the lowest label. A winner holding less than `min_agreement` of the
/// accepted samples is rejected.
#[derive(Debug, Clone)]
pub struct ModeFilter {
    min_label: i32,
    max_label: i32,
    min_agreement: f64,
}

impl ModeFilter {
    /// Create a new mode filter
    pub fn new(min_label: i32, max_label: i32, min_agreement: f64) -> Self {
        ModeFilter {
            min_label,
            max_label,
            min_agreement,
        }
    }

    /// Mode filter with the classifier's label range and agreement
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.min_label, config.max_label, config.min_agreement)
    }

    /// Whether a raw label takes part in the vote
    pub fn accepts(&self, label: i32) -> bool {
        (self.min_label..=self.max_label).contains(&label)
    }
}

impl Filter<&[i32]> for ModeFilter {
    type Output = Option<i32>;

    fn filter(&self, samples: &[i32]) -> Option<i32> {
        let mut votes: BTreeMap<i32, usize> = BTreeMap::new();
        let mut accepted = 0usize;
        for &label in samples.iter().filter(|l| self.accepts(**l)) {
            *votes.entry(label).or_insert(0) += 1;
            accepted += 1;
        }

        // Labels iterate in ascending order; strictly greater keeps the lowest on ties
        let mut best: Option<(i32, usize)> = None;
        for (&label, &count) in &votes {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((label, count));
            }
        }

        let (label, count) = best?;
        if (count as f64) < self.min_agreement * accepted as f64 {
            return None;
        }
        Some(label)
    }
}
