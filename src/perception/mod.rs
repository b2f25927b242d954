//! Perception module: colour classification, intersection scans and
//! histogram localization
pub mod belief;
pub mod filters;
pub mod localization;
pub mod scanner;
pub mod sensors;

pub use self::belief::HistogramFilter;
pub use self::localization::Localizer;
pub use self::scanner::IntersectionScanner;
pub use self::sensors::ColorClassifier;
