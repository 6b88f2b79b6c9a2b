// src/backends/mock.rs

//! Test doubles for the render path: a `Driver` that records what it was
//! asked to do, and a `PixelStrip` with inspectable staging buffers.

use crate::backends::{Driver, PixelStrip};
use crate::error::MatrixError;
use crate::frame::FrameSnapshot;
use crate::signals::StopSignal;
use anyhow::Result;

#[derive(Default)]
pub struct MockDriver {
    frames: Vec<FrameSnapshot>,
    cleanup_calls: usize,
    fail_on_draw: Option<usize>,
    interrupt_on_draw: Option<(usize, StopSignal)>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `n`th draw (1-based) fails with `BackendUnavailable`.
    pub fn fail_on_draw(mut self, n: usize) -> Self {
        self.fail_on_draw = Some(n);
        self
    }

    /// The `n`th draw (1-based) raises `stop`, as a signal arriving mid-run would.
    pub fn interrupt_on_draw(mut self, n: usize, stop: StopSignal) -> Self {
        self.interrupt_on_draw = Some((n, stop));
        self
    }

    pub fn frames(&self) -> &[FrameSnapshot] {
        &self.frames
    }

    pub fn cleanup_calls(&self) -> usize {
        self.cleanup_calls
    }
}

impl Driver for MockDriver {
    fn draw(&mut self, snapshot: &FrameSnapshot) -> Result<(), MatrixError> {
        let n = self.frames.len() + 1;
        if self.fail_on_draw == Some(n) {
            return Err(MatrixError::backend("mock bus error"));
        }
        self.frames.push(snapshot.clone());
        if let Some((at, stop)) = &self.interrupt_on_draw {
            if *at == n {
                stop.raise();
            }
        }
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        self.cleanup_calls += 1;
        Ok(())
    }
}

pub struct MockStrip {
    channels: usize,
    staged: Vec<u8>,
    shows: usize,
    releases: usize,
    fail_next_show: bool,
}

impl MockStrip {
    pub fn new(len: usize, channels: usize) -> Self {
        MockStrip {
            channels,
            staged: vec![0; len * channels],
            shows: 0,
            releases: 0,
            fail_next_show: false,
        }
    }

    pub fn fail_next_show(&mut self) {
        self.fail_next_show = true;
    }

    pub fn pixel(&self, index: usize) -> &[u8] {
        &self.staged[index * self.channels..(index + 1) * self.channels]
    }

    pub fn shows(&self) -> usize {
        self.shows
    }

    pub fn releases(&self) -> usize {
        self.releases
    }
}

impl PixelStrip for MockStrip {
    fn len(&self) -> usize {
        self.staged.len() / self.channels
    }

    fn set_pixel(&mut self, index: usize, channels: &[u8]) -> Result<(), MatrixError> {
        if index >= self.len() {
            return Err(MatrixError::out_of_range("strip index", index, self.len()));
        }
        let start = index * self.channels;
        self.staged[start..start + self.channels].copy_from_slice(channels);
        Ok(())
    }

    fn show(&mut self) -> Result<(), MatrixError> {
        if std::mem::take(&mut self.fail_next_show) {
            return Err(MatrixError::backend("mock bus error"));
        }
        self.shows += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<(), MatrixError> {
        self.releases += 1;
        Ok(())
    }
}
