mod calibration;
mod config;
mod gps;
mod hardware;
#[cfg(test)]
mod mocks;
mod solar;
mod station;
mod tracker;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::gps::NmeaIngest;
use crate::hardware::{FixedWeather, WeatherStation};
use crate::solar::SolarError;
use crate::station::StationError;
use crate::tracker::{CycleReport, PanelPosition, TrackerError};

#[derive(Parser)]
#[command(name = "sun-o-mat")]
#[command(about = "Two-axis solar panel tracker")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file
    Validate { config: PathBuf },
    /// Run one GPS ingestion pass and print the fix
    Fix { config: PathBuf },
    /// Print the current solar target
    Target { config: PathBuf },
    /// Load the calibration table, or regenerate it with --force
    Calibrate {
        config: PathBuf,
        #[arg(long)]
        force: bool,
    },
    /// Run a single tracking cycle
    Cycle { config: PathBuf },
    /// Track continuously, one cycle per configured interval
    Run {
        config: PathBuf,
        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Drive the panel to a fixed azimuth and elevation
    Position {
        config: PathBuf,
        azimuth: f64,
        elevation: f64,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Station(#[from] StationError),
    #[error("{0}")]
    Tracker(#[from] TrackerError),
    #[error("{0}")]
    Solar(#[from] SolarError),
    #[error("hardware error: {0}")]
    Hardware(#[from] hardware::HardwareError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let json = cli.json;

    let result = match cli.command {
        Commands::Validate { config } => validate(&config, json),
        Commands::Fix { config } => fix(&config, json),
        Commands::Target { config } => target(&config, json),
        Commands::Calibrate { config, force } => calibrate(&config, force, json),
        Commands::Cycle { config } => cycle(&config, json),
        Commands::Run { config, cycles } => run(&config, cycles, json),
        Commands::Position {
            config,
            azimuth,
            elevation,
        } => position(&config, PanelPosition::new(azimuth, elevation), json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn validate(path: &Path, json: bool) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    let solar = config.site.solar_settings()?;
    if json {
        return print_json(&serde_json::json!({ "valid": true, "default_site": solar.default_site }));
    }
    println!("Config is valid");
    println!(
        "  site: {:.5}, {:.5} ({} m)",
        solar.default_site.latitude_deg,
        solar.default_site.longitude_deg,
        solar.default_site.altitude_m
    );
    println!(
        "  feedback: {} iterations, deadband {}",
        config.tracker.feedback_iterations, config.tracker.deadband
    );
    println!(
        "  calibration: {} ({:?})",
        config.calibration.path.display(),
        config.calibration.format
    );
    Ok(())
}

fn fix(path: &Path, json: bool) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    let mut source = station::fix_source(&config.gps)?;
    let fix = NmeaIngest::new(config.gps.strict_checksum).read_fix(source.as_mut());
    if json {
        return print_json(&fix);
    }
    if fix.is_usable() {
        println!(
            "Fix: {:.6}, {:.6} alt {:.1} m, {} satellites",
            fix.latitude_deg, fix.longitude_deg, fix.altitude_m, fix.satellites
        );
    } else {
        println!("No usable fix");
    }
    Ok(())
}

fn target(path: &Path, json: bool) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    let mut source = station::fix_source(&config.gps)?;
    let fix = NmeaIngest::new(config.gps.strict_checksum).read_fix(source.as_mut());
    let weather = FixedWeather(config.sensors.weather).readings()?;
    let target = station::solar_calculator(&config)?.target(Utc::now(), &fix, &weather)?;
    if json {
        return print_json(&target);
    }
    println!(
        "Target az {:.2} el {:.2} at {}{}",
        target.azimuth_deg,
        target.elevation_deg,
        target.computed_at,
        if target.from_fix { "" } else { " (default site)" }
    );
    Ok(())
}

fn calibrate(path: &Path, force: bool, json: bool) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    let table = station::calibration_table(&config.calibration, force)?;
    if json {
        return print_json(&table.entries());
    }
    println!(
        "Calibration table at {} ({} entries)",
        config.calibration.path.display(),
        table.entries().len()
    );
    for degrees in [0.0, 45.0, 90.0, 180.0, 270.0, 315.0, 360.0] {
        let azimuth = table.lookup_azimuth(table.clamp_azimuth(degrees));
        let elevation = table.lookup_elevation(table.clamp_elevation(degrees));
        println!(
            "  {:3}°: azimuth {:3} units {:4} steps, elevation {:3} units {:3} duty",
            degrees,
            azimuth.azimuth_units,
            azimuth.azimuth_steps,
            elevation.elevation_units,
            elevation.elevation_duty
        );
    }
    Ok(())
}

fn print_report(report: &CycleReport, json: bool) -> Result<(), CliError> {
    if json {
        return print_json(report);
    }
    println!(
        "{}: az {:.1} el {:.1}, {} feedback iterations",
        report.mode,
        report.commanded.azimuth_deg,
        report.commanded.elevation_deg,
        report.feedback_iterations
    );
    if let Some(err) = &report.telemetry_error {
        println!("  telemetry not written: {}", err);
    }
    Ok(())
}

fn cycle(path: &Path, json: bool) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    let mut controller = station::build_controller(&config)?;
    let report = controller.cycle(Utc::now())?;
    print_report(&report, json)
}

fn run(path: &Path, cycles: Option<u64>, json: bool) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    let mut controller = station::build_controller(&config)?;
    log::info!(
        "Tracking every {}",
        humantime::format_duration(config.tracker.interval)
    );

    let mut completed = 0;
    loop {
        match controller.cycle(Utc::now()) {
            Ok(report) => print_report(&report, json)?,
            Err(e) => log::error!("Cycle {} failed: {}", completed + 1, e),
        }
        completed += 1;
        if cycles.is_some_and(|limit| completed >= limit) {
            return Ok(());
        }
        thread::sleep(config.tracker.interval);
    }
}

fn position(path: &Path, requested: PanelPosition, json: bool) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    let mut controller = station::build_controller(&config)?;
    let report = controller.set_position(requested, Utc::now())?;
    print_report(&report, json)
}
