//! Error types for the street-grid robot

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the localization and navigation stack
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML in a configuration or map file
    #[error("Parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Map description violates the loader contract
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    /// Requested destination lies outside the map
    #[error("Destination ({x}, {y}) is outside the {width}x{height} map")]
    DestinationOutOfMap {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },

    /// Robot communication channel could not be opened
    #[error("Robot channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// Motor or sensor command failed
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// Turn command outside +-360 degrees
    #[error("Turn angle {0} degrees is outside +-360")]
    InvalidTurnAngle(f64),

    /// Gyro never reported the commanded angle
    #[error("Turn of {target} degrees stalled at {reached} degrees")]
    TurnTimeout { target: f64, reached: f64 },

    /// Street search exhausted its attempts
    #[error("Street not found after {attempts} search attempts")]
    StreetLost { attempts: usize },

    /// No intersection or boundary seen within the drive poll cap
    #[error("No intersection reached within {polls} polls")]
    DriveTimeout { polls: usize },

    /// Belief never converged within the visit cap
    #[error("Localization did not converge after {visits} intersection visits")]
    LocalizationFailed { visits: usize },
}
