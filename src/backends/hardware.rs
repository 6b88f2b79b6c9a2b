// src/backends/hardware.rs

//! `Driver` for a physical addressable LED strip.
//!
//! The strip itself sits behind the `PixelStrip` trait; the process entry
//! point opens the device and hands it in, so the driver can be exercised
//! without hardware attached.

use crate::backends::Driver;
use crate::color::ColorOrder;
use crate::config::HardwareConfig;
use crate::error::MatrixError;
use crate::frame::FrameSnapshot;
use crate::layout::GridDimensions;

use anyhow::{Context, Result};
use log::{debug, error, info, trace, warn};
use std::thread;
use std::time::{Duration, Instant};

/// A chain of addressable pixels with a staging buffer.
///
/// `set_pixel` only stages channel bytes; nothing reaches the LEDs until
/// `show` latches the whole buffer onto the wire.
pub trait PixelStrip {
    /// Number of LEDs on the strip.
    fn len(&self) -> usize;

    /// Stages `channels` (already in the strip's channel order) for `index`.
    fn set_pixel(&mut self, index: usize, channels: &[u8]) -> Result<(), MatrixError>;

    /// Transmits the staged buffer.
    fn show(&mut self) -> Result<(), MatrixError>;

    /// Gives the device back. The strip is unusable afterwards.
    fn release(&mut self) -> Result<(), MatrixError>;
}

pub struct HardwareDriver<S: PixelStrip> {
    strip: S,
    color_order: ColorOrder,
    brightness: f32,
    /// Shortest gap between two `show` calls; zero disables throttling.
    min_frame_interval: Duration,
    last_show: Option<Instant>,
    released: bool,
}

impl<S: PixelStrip> HardwareDriver<S> {
    pub fn new(strip: S, dims: GridDimensions, config: &HardwareConfig) -> Result<Self, MatrixError> {
        if strip.len() < dims.len() {
            return Err(MatrixError::backend(format!(
                "strip has {} LEDs but a {}x{} grid needs {}",
                strip.len(),
                dims.rows(),
                dims.cols(),
                dims.len()
            )));
        }
        let min_frame_interval = if config.max_refresh_hz > 0.0 {
            Duration::try_from_secs_f32(1.0 / config.max_refresh_hz).map_err(|e| {
                MatrixError::backend(format!(
                    "max_refresh_hz {} gives no usable frame interval: {}",
                    config.max_refresh_hz, e
                ))
            })?
        } else {
            Duration::ZERO
        };
        info!(
            "HardwareDriver: {} LEDs, order {:?}, brightness {}, min frame interval {:?}.",
            strip.len(),
            config.color_order,
            config.brightness,
            min_frame_interval
        );
        Ok(HardwareDriver {
            strip,
            color_order: config.color_order,
            brightness: config.brightness,
            min_frame_interval,
            last_show: None,
            released: false,
        })
    }

    pub fn strip(&self) -> &S {
        &self.strip
    }

    fn throttle(&self) {
        if let Some(last) = self.last_show {
            let elapsed = last.elapsed();
            if elapsed < self.min_frame_interval {
                let wait = self.min_frame_interval - elapsed;
                trace!("HardwareDriver: Throttling for {:?}.", wait);
                thread::sleep(wait);
            }
        }
    }

    fn show(&mut self) -> Result<(), MatrixError> {
        self.throttle();
        self.strip.show()?;
        self.last_show = Some(Instant::now());
        Ok(())
    }
}

impl<S: PixelStrip> Driver for HardwareDriver<S> {
    fn draw(&mut self, snapshot: &FrameSnapshot) -> Result<(), MatrixError> {
        if self.released {
            return Err(MatrixError::backend("strip already released"));
        }
        let width = self.color_order.channel_count();
        for &(index, color) in snapshot.pixels() {
            let channels = self.color_order.channels(color.scaled(self.brightness));
            self.strip.set_pixel(index, &channels[..width])?;
        }
        self.show()?;
        trace!("HardwareDriver: Showed {} pixels.", snapshot.pixels().len());
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        info!("HardwareDriver: Blanking strip and releasing device.");
        let dark = vec![0u8; self.color_order.channel_count()];
        let blanked = (0..self.strip.len())
            .try_for_each(|index| self.strip.set_pixel(index, &dark))
            .and_then(|()| self.strip.show());
        if let Err(e) = blanked {
            // still release the device below
            warn!("HardwareDriver: Could not blank strip: {}", e);
        }
        self.strip
            .release()
            .context("HardwareDriver: Failed to release strip")?;
        debug!("HardwareDriver: Cleanup complete.");
        Ok(())
    }
}

impl<S: PixelStrip> Drop for HardwareDriver<S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.cleanup() {
            error!("HardwareDriver: Error during cleanup in drop: {:#}", e);
        }
    }
}
