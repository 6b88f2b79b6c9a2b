// src/backends/mod.rs
// Declares backend modules and defines the common trait.

pub mod console;
pub mod hardware;
#[cfg(test)]
pub mod mock;
pub mod spi;

pub use console::ConsoleDriver;
pub use hardware::{HardwareDriver, PixelStrip};
pub use spi::SpiStrip;

use crate::error::MatrixError;
use crate::frame::FrameSnapshot;
use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output surface a frame snapshot is painted onto.
///
/// A driver is chosen once at startup and kept for the whole run. The
/// animation loop only ever calls `draw` per frame and `cleanup` once when it
/// stops; implementations also clean up on `Drop` if `cleanup` never ran.
pub trait Driver {
    /// Paints `snapshot`. Any failure is reported as
    /// `MatrixError::BackendUnavailable` and ends the run.
    fn draw(&mut self, snapshot: &FrameSnapshot) -> Result<(), MatrixError>;

    /// Releases the output surface (terminal modes, device handles).
    fn cleanup(&mut self) -> Result<()>;
}

/// Which driver the process entry point builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Simulate the matrix with colored blocks on the terminal.
    #[default]
    Terminal,
    /// Drive a WS2812 strip through spidev.
    Hardware,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Terminal => write!(f, "terminal"),
            BackendKind::Hardware => write!(f, "hardware"),
        }
    }
}
