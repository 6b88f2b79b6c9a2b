// src/config.rs

//! Defines the configuration structures for `ledmatrix`.
//!
//! A configuration file is optional JSON; every field has a default so a file
//! only needs the settings it changes. Command-line flags are applied on top
//! of whatever the file produced.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use crate::animation::AnimationSettings;
use crate::automaton::{EdgePolicy, Palette, Rule, Seed};
use crate::backends::BackendKind;
use crate::color::{Color, ColorOrder};
use crate::error::MatrixError;
use crate::layout::{GridDimensions, Wiring};

/// Root of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub animation: AnimationConfig,
    pub hardware: HardwareConfig,
}

/// Size of the matrix and how it is driven.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub rows: usize,
    pub cols: usize,
    /// Physical layout of the strip.
    pub wiring: Wiring,
    pub backend: BackendKind,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            rows: 7,
            cols: 42,
            wiring: Wiring::default(),
            backend: BackendKind::Terminal,
        }
    }
}

/// What runs on the matrix and how fast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Target duration of one tick in milliseconds.
    pub tick_ms: u64,
    /// Pattern name, `random`, `random:<p>` or a bare probability.
    pub seed: String,
    /// Makes random seeds reproducible.
    pub rng_seed: Option<u64>,
    /// Birth/survival rule in `B3/S23` notation.
    pub rule: String,
    pub edges: EdgePolicy,
    /// Stop after this many generations.
    pub max_generations: Option<u64>,
    /// Stop once a generation leaves the frame unchanged.
    pub stop_when_stable: bool,
    pub alive_color: Color,
    pub dead_color: Color,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            tick_ms: 200,
            seed: "random".to_string(),
            rng_seed: None,
            rule: Rule::conway().to_string(),
            edges: EdgePolicy::Bounded,
            max_generations: None,
            stop_when_stable: false,
            alive_color: Color::RED,
            dead_color: Color::BLACK,
        }
    }
}

/// Settings for the physical strip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HardwareConfig {
    /// spidev node the strip's data line hangs off.
    pub device: PathBuf,
    pub color_order: ColorOrder,
    /// Global brightness, 0.0 to 1.0.
    pub brightness: f32,
    /// Highest frame rate the strip is driven at; 0 disables the limit.
    pub max_refresh_hz: f32,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        HardwareConfig {
            device: PathBuf::from("/dev/spidev0.0"),
            color_order: ColorOrder::Grb,
            brightness: 1.0,
            max_refresh_hz: 60.0,
        }
    }
}

impl Config {
    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Configuration loaded from {}.", path.display());
        Ok(config)
    }

    pub fn dimensions(&self) -> Result<GridDimensions, MatrixError> {
        GridDimensions::new(self.display.rows, self.display.cols)
    }

    pub fn seed(&self) -> Result<Seed, MatrixError> {
        let seed = self.animation.seed.parse::<Seed>()?;
        Ok(match seed {
            Seed::Random { probability, .. } => Seed::Random {
                probability,
                rng_seed: self.animation.rng_seed,
            },
            pattern => pattern,
        })
    }

    pub fn rule(&self) -> Result<Rule, MatrixError> {
        self.animation.rule.parse()
    }

    pub fn palette(&self) -> Palette {
        Palette {
            alive: self.animation.alive_color,
            dead: self.animation.dead_color,
        }
    }

    pub fn animation_settings(&self) -> AnimationSettings {
        AnimationSettings {
            tick: Duration::from_millis(self.animation.tick_ms),
            max_generations: self.animation.max_generations,
            stop_when_stable: self.animation.stop_when_stable,
            palette: self.palette(),
        }
    }
}
