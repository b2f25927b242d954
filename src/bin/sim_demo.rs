use anyhow::{Context, Result};
use citygrid_core::config::CoreConfig;
use citygrid_core::map::StreetMap;
use citygrid_core::{open_robot, CityGridCore};

const DEMO_MAP: &str = r#"
width = 3
height = 3
cells = [
    ["green", "green", "green", "blue"],
    ["green", "green", "green", "white"],
    ["green", "green", "blue", "blue"],
    ["green", "green", "white", "blue"],
    ["green", "blue", "white", "green"],
    ["green", "green", "white", "white"],
    ["green", "blue", "green", "white"],
    ["green", "blue", "blue", "blue"],
    ["green", "blue", "blue", "white"],
]
"#;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Initializing CityGrid simulation...");
    let map = StreetMap::from_toml_str(DEMO_MAP).context("Built-in map is invalid")?;

    let mut config = CoreConfig::default();
    config.robot.poll_interval_ms = 0;
    config.simulation.start_x = 1.0;
    config.simulation.start_y = 1.5;
    config.simulation.start_heading_deg = 0.0;
    config.simulation.misread_rate = 0.05;
    config.simulation.seed = 42;

    let mut robot = open_robot(&config, &map)?;
    let mut core = CityGridCore::new(map, &config);

    let goal = core.destination(2, 2)?;
    println!("Driving to {}", goal);
    let report = core.run(robot.as_mut(), goal)?;

    if report.reached {
        println!("Arrived after {} attempts", report.attempts);
    } else {
        println!("Gave up after {} attempts", report.attempts);
    }
    Ok(())
}
