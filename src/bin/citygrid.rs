use anyhow::{Context, Result};
use citygrid_core::common::types::Cell;
use citygrid_core::config::CoreConfig;
use citygrid_core::hardware::RobotIo;
use citygrid_core::map::StreetMap;
use citygrid_core::{open_robot, CityGridCore, Error};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Samples taken under the sensor in calibration mode
const CALIBRATION_SAMPLES: usize = 200;
/// Destination that selects calibration mode
const CALIBRATION_DESTINATION: (i64, i64) = (-1, -1);

/// Localize on a street map and drive to an intersection.
///
/// Passing -1 -1 as the destination samples the surface under the colour
/// sensor instead, to help tune the classifier thresholds.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Map description (TOML)
    map: PathBuf,

    /// Destination column
    #[arg(allow_negative_numbers = true)]
    dest_x: i64,

    /// Destination row
    #[arg(allow_negative_numbers = true)]
    dest_y: i64,

    /// Configuration file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Everything a run needs, checked before the robot moves
struct Startup {
    core: CityGridCore,
    robot: Box<dyn RobotIo>,
    /// `None` in calibration mode
    goal: Option<Cell>,
}

/// Load the map and check the destination before the robot channel is opened
fn startup(args: &Args, config: &CoreConfig) -> Result<Startup> {
    let map = StreetMap::from_file(&args.map)
        .with_context(|| format!("Failed to load map from {}", args.map.display()))?;
    let core = CityGridCore::new(map, config);

    let goal = if (args.dest_x, args.dest_y) == CALIBRATION_DESTINATION {
        None
    } else {
        let goal = core
            .destination(args.dest_x, args.dest_y)
            .context("Invalid destination")?;
        Some(goal)
    };

    let robot = open_robot(config, core.map()).context("Failed to open robot")?;
    Ok(Startup { core, robot, goal })
}

/// Startup failures come back as `Err` (exit 1); a run that fails to reach
/// the destination returns exit 2.
fn run(args: &Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => CoreConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => CoreConfig::default(),
    };
    let Startup {
        mut core,
        mut robot,
        goal,
    } = startup(args, &config)?;

    let Some(goal) = goal else {
        let survey = core
            .classifier()
            .survey(robot.as_mut(), CALIBRATION_SAMPLES)
            .context("Calibration read failed")?;
        log::info!("Calibration: {} samples", survey.samples);
        for (label, count) in &survey.counts {
            log::info!("  label {:>2}: {}", label, count);
        }
        match survey.dominant {
            Some(color) => log::info!("Dominant colour {} ({:.0}% agreement)", color, 100.0 * survey.agreement()),
            None => log::warn!("No dominant colour within the valid label range"),
        }
        return Ok(ExitCode::SUCCESS);
    };

    match core.run(robot.as_mut(), goal) {
        Ok(report) if report.reached => {
            log::info!("Destination {} reached after {} attempts", goal, report.attempts);
            Ok(ExitCode::SUCCESS)
        }
        Ok(report) => {
            log::error!("Destination {} not reached after {} attempts", goal, report.attempts);
            Ok(ExitCode::from(2))
        }
        Err(e @ Error::LocalizationFailed { .. }) => {
            log::error!("{}", e);
            Ok(ExitCode::from(2))
        }
        Err(e) => {
            log::error!("Run aborted: {}", e);
            if let Err(stop_error) = robot.stop() {
                log::error!("Failed to stop the motors: {}", stop_error);
            }
            Ok(ExitCode::from(2))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const MAP: &str = r#"
width = 2
height = 1
cells = [
    ["green", "blue", "white", "green"],
    ["green", "green", "white", "blue"],
]
"#;

    fn args(name: &str, dest_x: i64, dest_y: i64) -> Args {
        let map = std::env::temp_dir().join(format!("citygrid_{}_{}.toml", name, std::process::id()));
        fs::write(&map, MAP).unwrap();
        Args {
            map,
            dest_x,
            dest_y,
            config: None,
        }
    }

    fn unsupported_backend() -> CoreConfig {
        let mut config = CoreConfig::default();
        config.robot.backend = "serial".to_string();
        config
    }

    #[test]
    fn test_destination_checked_before_robot_opens() {
        let args = args("bad_destination", 2, 0);
        let err = startup(&args, &unsupported_backend()).err().unwrap();
        let message = format!("{:#}", err);
        assert!(message.contains("Invalid destination"), "{}", message);
        assert!(!message.contains("Failed to open robot"), "{}", message);
    }

    #[test]
    fn test_valid_destination_reaches_robot_channel() {
        let args = args("good_destination", 1, 0);
        let err = startup(&args, &unsupported_backend()).err().unwrap();
        assert!(format!("{:#}", err).contains("Failed to open robot"));

        let ready = startup(&args, &CoreConfig::default()).unwrap();
        assert_eq!(ready.goal, Some(Cell::new(1, 0)));
    }

    #[test]
    fn test_calibration_has_no_goal() {
        let args = args("calibration", -1, -1);
        let ready = startup(&args, &CoreConfig::default()).unwrap();
        assert!(ready.goal.is_none());
    }
}
