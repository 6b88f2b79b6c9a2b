// src/cli.rs

//! Command-line flags. Every flag overrides the matching configuration field.

use crate::automaton::EdgePolicy;
use crate::backends::BackendKind;
use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Runs a Game of Life on an LED matrix or its terminal simulation.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(author, version, about)]
pub struct CliArgs {
    /// Read settings from a JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Grid height
    #[arg(long)]
    pub rows: Option<usize>,

    /// Grid width
    #[arg(long)]
    pub cols: Option<usize>,

    /// Output surface
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Target tick duration in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// blinker, block, glider, beacon, toad, r-pentomino, random, random:<p> or <p>
    #[arg(long)]
    pub seed: Option<String>,

    /// Birth/survival rule, e.g. B3/S23
    #[arg(long)]
    pub rule: Option<String>,

    /// Neighbors wrap around the edges
    #[arg(long)]
    pub wrap: bool,

    /// Stop after this many generations
    #[arg(long)]
    pub generations: Option<u64>,

    /// spidev node for the hardware backend
    #[arg(long)]
    pub device: Option<PathBuf>,
}

impl CliArgs {
    /// Writes every flag that was given into `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(rows) = self.rows {
            config.display.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.display.cols = cols;
        }
        if let Some(backend) = self.backend {
            config.display.backend = backend;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.animation.tick_ms = tick_ms;
        }
        if let Some(seed) = &self.seed {
            config.animation.seed = seed.clone();
        }
        if let Some(rule) = &self.rule {
            config.animation.rule = rule.clone();
        }
        if self.wrap {
            config.animation.edges = EdgePolicy::Toroidal;
        }
        if let Some(generations) = self.generations {
            config.animation.max_generations = Some(generations);
        }
        if let Some(device) = &self.device {
            config.hardware.device = device.clone();
        }
    }
}
