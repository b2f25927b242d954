//! Colour sensor classification

use super::filters::{Filter, ModeFilter};
use crate::common::types::Color;
use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::hardware::{Port, RobotIo};
use std::collections::BTreeMap;

/// Turns bursts of noisy colour readings into one label
#[derive(Debug, Clone)]
pub struct ColorClassifier {
    port: Port,
    filter: ModeFilter,
    street_samples: usize,
    building_samples: usize,
}

impl ColorClassifier {
    /// Create a classifier reading from `port`
    pub fn new(port: Port, config: &ClassifierConfig) -> Self {
        ColorClassifier {
            port,
            filter: ModeFilter::from_config(config),
            street_samples: config.street_samples,
            building_samples: config.building_samples,
        }
    }

    /// Read `samples` raw labels. Failed reads are dropped; if every read
    /// fails the last error is returned.
    pub fn sample(&self, robot: &mut dyn RobotIo, samples: usize) -> Result<Vec<i32>> {
        let mut labels = Vec::with_capacity(samples);
        let mut last_error = None;
        for _ in 0..samples {
            match robot.read_color(self.port) {
                Ok(label) => labels.push(label),
                Err(e) => {
                    log::debug!("Dropping colour read on {}: {}", self.port, e);
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if labels.is_empty() => Err(e),
            _ => Ok(labels),
        }
    }

    /// Most frequent valid colour over a burst of `samples` reads
    pub fn classify(&self, robot: &mut dyn RobotIo, samples: usize) -> Result<Option<Color>> {
        let labels = self.sample(robot, samples)?;
        Ok(self.filter.filter(&labels[..]).and_then(Color::from_label))
    }

    /// Short burst used while driving
    pub fn street(&self, robot: &mut dyn RobotIo) -> Result<Option<Color>> {
        self.classify(robot, self.street_samples)
    }

    /// Long burst used for building colours
    pub fn building(&self, robot: &mut dyn RobotIo) -> Result<Option<Color>> {
        self.classify(robot, self.building_samples)
    }

    /// Raw label counts at the current spot, for tuning the label range
    /// and agreement threshold
    pub fn survey(&self, robot: &mut dyn RobotIo, samples: usize) -> Result<SurfaceSurvey> {
        let labels = self.sample(robot, samples)?;
        let mut counts = BTreeMap::new();
        for &label in &labels {
            *counts.entry(label).or_insert(0) += 1;
        }
        Ok(SurfaceSurvey {
            samples: labels.len(),
            counts,
            dominant: self.filter.filter(&labels[..]).and_then(Color::from_label),
        })
    }
}

/// Result of [`ColorClassifier::survey`]
#[derive(Debug, Clone)]
pub struct SurfaceSurvey {
    pub samples: usize,
    pub counts: BTreeMap<i32, usize>,
    pub dominant: Option<Color>,
}

impl SurfaceSurvey {
    /// Share of the samples that agreed with the dominant colour
    pub fn agreement(&self) -> f64 {
        match self.dominant {
            Some(color) if self.samples > 0 => {
                *self.counts.get(&color.label()).unwrap_or(&0) as f64 / self.samples as f64
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::VecDeque;

    /// Replays a fixed sequence of colour reads
    struct Replay {
        reads: VecDeque<Result<i32>>,
    }

    impl RobotIo for Replay {
        fn drive(&mut self, _power: i32) -> Result<()> {
            Ok(())
        }
        fn turn(&mut self, _left: i32, _right: i32) -> Result<()> {
            Ok(())
        }
        fn stop(&mut self) -> Result<()> {
            Ok(())
        }
        fn read_color(&mut self, _port: Port) -> Result<i32> {
            self.reads.pop_front().unwrap_or(Ok(0))
        }
        fn read_gyro(&mut self, _port: Port, _reset: bool) -> Result<(f64, f64)> {
            Ok((0.0, 0.0))
        }
    }

    fn replay(reads: Vec<Result<i32>>) -> Replay {
        Replay {
            reads: reads.into(),
        }
    }

    #[test]
    fn test_classify_survives_noise() {
        let classifier = ColorClassifier::new(Port(3), &ClassifierConfig::default());
        let mut robot = replay(vec![Ok(3), Ok(0), Ok(3), Ok(7), Ok(2), Ok(3), Ok(6), Ok(3), Ok(-1)]);
        assert_eq!(classifier.street(&mut robot).unwrap(), Some(Color::Green));
    }

    #[test]
    fn test_failed_reads_are_dropped() {
        let classifier = ColorClassifier::new(Port(3), &ClassifierConfig::default());
        let mut robot = replay(vec![
            Err(Error::Hardware("glitch".into())),
            Ok(1),
            Ok(1),
            Err(Error::Hardware("glitch".into())),
        ]);
        assert_eq!(classifier.classify(&mut robot, 4).unwrap(), Some(Color::Black));
    }

    #[test]
    fn test_dead_sensor_is_an_error() {
        let classifier = ColorClassifier::new(Port(3), &ClassifierConfig::default());
        let mut robot = replay((0..3).map(|_| Err(Error::Hardware("dead".into()))).collect());
        assert!(classifier.classify(&mut robot, 3).is_err());
    }

    #[test]
    fn test_survey_counts_raw_labels() {
        let classifier = ColorClassifier::new(Port(3), &ClassifierConfig::default());
        let mut robot = replay(vec![Ok(2), Ok(2), Ok(2), Ok(0)]);
        let survey = classifier.survey(&mut robot, 4).unwrap();
        assert_eq!(survey.dominant, Some(Color::Blue));
        assert_eq!(survey.counts[&2], 3);
        assert_eq!(survey.counts[&0], 1);
        assert!((survey.agreement() - 0.75).abs() < 1e-12);
    }
}
