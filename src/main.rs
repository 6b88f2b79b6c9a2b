// src/main.rs

// Declare modules
pub mod animation;
pub mod automaton;
pub mod backends;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod layout;
pub mod signals;

use crate::{
    animation::AnimationLoop,
    automaton::LifeEngine,
    backends::{BackendKind, ConsoleDriver, Driver, HardwareDriver, SpiStrip},
    cli::CliArgs,
    config::Config,
    error::MatrixError,
    frame::FrameBuffer,
    layout::{CoordinateMapper, GridDimensions},
    signals::StopSignal,
};

// Logging
use anyhow::Context;
use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

/// Exit code for bad dimensions, rules and seeds. Matches clap's own code
/// for malformed flags.
const EXIT_CONFIG: u8 = 2;
/// Exit code when the output surface cannot be used.
const EXIT_BACKEND: u8 = 3;

/// Main entry point for the `ledmatrix` application.
fn main() -> ExitCode {
    // Logs go to stderr so they never land inside the terminal frame.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    // Exits with usage (2) on malformed flags, prints help/version on request.
    let cli = CliArgs::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("ledmatrix: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn run(cli: &CliArgs) -> anyhow::Result<()> {
    // --- Configuration ---
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    cli.apply(&mut config);
    info!("Configuration: {:?}", config);

    // --- Core Components ---
    // Everything that can reject the configuration runs before the
    // backend claims the terminal or the strip.
    let dims = config.dimensions()?;
    let mut engine = LifeEngine::new(dims, config.rule()?, config.animation.edges);
    engine.seed(&config.seed()?)?;
    let frame = FrameBuffer::new(CoordinateMapper::new(dims, config.display.wiring));
    let stop = StopSignal::from_process_signals()?;

    // --- Backend ---
    let mut driver = open_backend(&config, dims)?;

    // --- Main Loop ---
    let reason = AnimationLoop::new(
        engine,
        frame,
        driver.as_mut(),
        config.animation_settings(),
        stop,
    )
    .run()
    .context("Animation stopped")?;
    info!("ledmatrix exited: {:?}.", reason);
    Ok(())
}

/// Builds the configured driver. The animation loop only starts once this
/// has succeeded.
fn open_backend(config: &Config, dims: GridDimensions) -> Result<Box<dyn Driver>, MatrixError> {
    let driver: Box<dyn Driver> = match config.display.backend {
        BackendKind::Terminal => Box::new(ConsoleDriver::new(dims)?),
        BackendKind::Hardware => {
            let channels = config.hardware.color_order.channel_count();
            let strip = SpiStrip::open(&config.hardware.device, dims.len(), channels)?;
            Box::new(HardwareDriver::new(strip, dims, &config.hardware)?)
        }
    };
    info!("Using {} backend.", config.display.backend);
    Ok(driver)
}

fn exit_code_for(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<MatrixError>() {
        Some(MatrixError::OutOfRange { .. }) | Some(MatrixError::InvalidSeed(_)) => EXIT_CONFIG,
        Some(MatrixError::BackendUnavailable(_)) => EXIT_BACKEND,
        None => 1,
    }
}
