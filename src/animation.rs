// src/animation.rs
//! Drives the automaton, frame buffer and render driver at a fixed tick.
//!
//! Each tick runs strictly in sequence: check for a stop request, step the
//! automaton, paint the new generation into the frame buffer, draw it, then
//! sleep for whatever is left of the tick. When compute and render overrun the
//! tick the next one starts immediately; frames are never skipped or caught
//! up. However the loop ends, the driver's `cleanup` runs exactly once.

use crate::automaton::{LifeEngine, Palette};
use crate::backends::Driver;
use crate::error::MatrixError;
use crate::frame::FrameBuffer;
use crate::signals::StopSignal;

use anyhow::{anyhow, Result};
use log::{debug, error, info, trace};
use std::thread;
use std::time::{Duration, Instant};

/// Lifecycle of an `AnimationLoop`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AnimationState {
    /// Seeded generation not yet shown.
    Initializing,
    Running,
    /// Driver released; the loop cannot be restarted.
    Stopped,
}

/// Why a run ended without an error.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StopReason {
    /// A stop signal was observed at the top of a tick.
    Interrupted,
    /// `max_generations` steps have been taken.
    GenerationLimit,
    /// A step left the frame unchanged.
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSettings {
    pub tick: Duration,
    pub max_generations: Option<u64>,
    pub stop_when_stable: bool,
    pub palette: Palette,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        AnimationSettings {
            tick: Duration::from_millis(200),
            max_generations: None,
            stop_when_stable: false,
            palette: Palette::default(),
        }
    }
}

/// Owns the automaton and frame buffer for the duration of a run and borrows
/// the driver, so the caller keeps it after the loop has stopped.
pub struct AnimationLoop<'a> {
    engine: LifeEngine,
    frame: FrameBuffer,
    driver: &'a mut dyn Driver,
    settings: AnimationSettings,
    stop: StopSignal,
    state: AnimationState,
}

impl<'a> AnimationLoop<'a> {
    /// `engine` must already be seeded; the frame must match its dimensions.
    pub fn new(
        engine: LifeEngine,
        frame: FrameBuffer,
        driver: &'a mut dyn Driver,
        settings: AnimationSettings,
        stop: StopSignal,
    ) -> Self {
        AnimationLoop {
            engine,
            frame,
            driver,
            settings,
            stop,
            state: AnimationState::Initializing,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn engine(&self) -> &LifeEngine {
        &self.engine
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Runs until a stop condition or a failure, then releases the driver.
    ///
    /// A failure while running takes precedence over a failure to clean up;
    /// the latter is only logged in that case.
    pub fn run(&mut self) -> Result<StopReason> {
        if self.state != AnimationState::Initializing {
            return Err(anyhow!("AnimationLoop: run() called in state {:?}", self.state));
        }
        info!(
            "AnimationLoop: Starting {}x{} grid, rule {}, tick {:?}.",
            self.engine.dimensions().rows(),
            self.engine.dimensions().cols(),
            self.engine.rule(),
            self.settings.tick
        );

        let outcome = self.initialize().and_then(|()| {
            self.state = AnimationState::Running;
            self.run_ticks()
        });

        self.state = AnimationState::Stopped;
        let cleanup = self.driver.cleanup();

        match (outcome, cleanup) {
            (Ok(reason), Ok(())) => {
                info!(
                    "AnimationLoop: Stopped after generation {} ({:?}).",
                    self.engine.generation(),
                    reason
                );
                Ok(reason)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), cleanup) => {
                if let Err(cleanup_error) = cleanup {
                    error!("AnimationLoop: Cleanup also failed: {:#}", cleanup_error);
                }
                error!(
                    "AnimationLoop: Stopped at generation {}: {}",
                    self.engine.generation(),
                    e
                );
                Err(e.into())
            }
        }
    }

    fn initialize(&mut self) -> Result<(), MatrixError> {
        debug!(
            "AnimationLoop: Showing seed generation with {} live cells.",
            self.engine.live_count()
        );
        self.engine.paint(&mut self.frame, &self.settings.palette)?;
        self.present()
    }

    fn run_ticks(&mut self) -> Result<StopReason, MatrixError> {
        loop {
            if self.stop.is_raised() {
                info!("AnimationLoop: Stop requested.");
                return Ok(StopReason::Interrupted);
            }
            if let Some(limit) = self.settings.max_generations {
                if self.engine.generation() >= limit {
                    return Ok(StopReason::GenerationLimit);
                }
            }

            let started = Instant::now();
            self.engine.step();
            self.engine.paint(&mut self.frame, &self.settings.palette)?;
            if self.settings.stop_when_stable && !self.frame.is_dirty() {
                info!(
                    "AnimationLoop: Generation {} is unchanged.",
                    self.engine.generation()
                );
                return Ok(StopReason::Stable);
            }
            self.present()?;

            let elapsed = started.elapsed();
            match self.settings.tick.checked_sub(elapsed) {
                Some(remaining) if !remaining.is_zero() => thread::sleep(remaining),
                _ => trace!(
                    "AnimationLoop: Tick overran budget ({:?} > {:?}).",
                    elapsed,
                    self.settings.tick
                ),
            }
        }
    }

    fn present(&mut self) -> Result<(), MatrixError> {
        let snapshot = self.frame.snapshot()?;
        self.driver.draw(&snapshot)?;
        self.frame.mark_clean();
        trace!("AnimationLoop: Presented generation {}.", self.engine.generation());
        Ok(())
    }
}
