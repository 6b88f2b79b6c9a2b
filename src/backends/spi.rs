// src/backends/spi.rs

//! WS2812-class strips driven through a Linux spidev node.
//!
//! The data line of the strip is wired to SPI MOSI. Clocking the bus at
//! 2.4 MHz makes three SPI bits last one WS2812 bit period, so every data bit
//! is sent as `110` (one) or `100` (zero). A long run of zero bytes after the
//! frame latches it.

use crate::backends::PixelStrip;
use crate::error::MatrixError;

use log::{debug, info};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::io::AsRawFd;
use std::path::Path;

const SPI_SPEED_HZ: u32 = 2_400_000;
const SPI_BITS_PER_WORD: u8 = 8;
const SPI_MODE_0: u8 = 0;
/// Bus bytes per data byte.
const ENCODED_BYTES_PER_BYTE: usize = 3;
/// 280 us of low line at 2.4 MHz.
const RESET_BYTES: usize = 84;

nix::ioctl_write_ptr!(spi_write_mode, b'k', 1, u8);
nix::ioctl_write_ptr!(spi_write_bits_per_word, b'k', 3, u8);
nix::ioctl_write_ptr!(spi_write_max_speed_hz, b'k', 4, u32);

/// A `PixelStrip` whose frames are written to `W` in WS2812 SPI encoding.
pub struct SpiStrip<W: Write = File> {
    out: Option<W>,
    channels: usize,
    staged: Vec<u8>,
    encoded: Vec<u8>,
}

impl SpiStrip<File> {
    /// Opens and configures the spidev node at `path` for `len` pixels of
    /// `channels` bytes each.
    pub fn open(path: &Path, len: usize, channels: usize) -> Result<Self, MatrixError> {
        let unavailable =
            |what: &str, e: &dyn std::fmt::Display| MatrixError::backend(format!("{} {}: {}", what, path.display(), e));
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| unavailable("cannot open", &e))?;
        let fd = file.as_raw_fd();
        // SAFETY: each call passes a pointer to a live local of the size the
        // request number encodes, on a descriptor we own.
        unsafe {
            spi_write_mode(fd, &SPI_MODE_0).map_err(|e| unavailable("cannot set SPI mode on", &e))?;
            spi_write_bits_per_word(fd, &SPI_BITS_PER_WORD)
                .map_err(|e| unavailable("cannot set word size on", &e))?;
            spi_write_max_speed_hz(fd, &SPI_SPEED_HZ)
                .map_err(|e| unavailable("cannot set clock on", &e))?;
        }
        info!(
            "SpiStrip: Opened {} at {} Hz for {} pixels.",
            path.display(),
            SPI_SPEED_HZ,
            len
        );
        Ok(Self::new(file, len, channels))
    }
}

impl<W: Write> SpiStrip<W> {
    pub fn new(out: W, len: usize, channels: usize) -> Self {
        let staged = vec![0; len * channels];
        let encoded = Vec::with_capacity(staged.len() * ENCODED_BYTES_PER_BYTE + RESET_BYTES);
        SpiStrip {
            out: Some(out),
            channels,
            staged,
            encoded,
        }
    }

    pub fn output(&self) -> Option<&W> {
        self.out.as_ref()
    }
}

impl<W: Write> PixelStrip for SpiStrip<W> {
    fn len(&self) -> usize {
        self.staged.len() / self.channels
    }

    fn set_pixel(&mut self, index: usize, channels: &[u8]) -> Result<(), MatrixError> {
        if index >= self.len() {
            return Err(MatrixError::out_of_range("strip index", index, self.len()));
        }
        if channels.len() != self.channels {
            return Err(MatrixError::out_of_range(
                "channel count",
                channels.len(),
                self.channels,
            ));
        }
        let start = index * self.channels;
        self.staged[start..start + self.channels].copy_from_slice(channels);
        Ok(())
    }

    fn show(&mut self) -> Result<(), MatrixError> {
        let out = self
            .out
            .as_mut()
            .ok_or_else(|| MatrixError::backend("SPI device already released"))?;
        self.encoded.clear();
        for byte in &self.staged {
            self.encoded.extend_from_slice(&encode_byte(*byte));
        }
        self.encoded.resize(self.encoded.len() + RESET_BYTES, 0);
        out.write_all(&self.encoded)
            .and_then(|()| out.flush())
            .map_err(|e| MatrixError::backend(format!("SPI write failed: {}", e)))
    }

    fn release(&mut self) -> Result<(), MatrixError> {
        if self.out.take().is_some() {
            debug!("SpiStrip: Device released.");
        }
        Ok(())
    }
}

/// Expands one data byte into three bus bytes, MSB first.
fn encode_byte(byte: u8) -> [u8; ENCODED_BYTES_PER_BYTE] {
    let mut bits: u32 = 0;
    for i in (0..8).rev() {
        let pattern = if byte & (1 << i) != 0 { 0b110 } else { 0b100 };
        bits = (bits << 3) | pattern;
    }
    [(bits >> 16) as u8, (bits >> 8) as u8, bits as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_expand_each_bit_into_three() {
        assert_eq!(encode_byte(0x00), [0b1001_0010, 0b0100_1001, 0b0010_0100]);
        assert_eq!(encode_byte(0xff), [0b1101_1011, 0b0110_1101, 0b1011_0110]);
        assert_eq!(encode_byte(0x80), [0b1101_0010, 0b0100_1001, 0b0010_0100]);
    }

    #[test]
    fn it_should_write_one_encoded_frame_per_show() {
        let mut strip = SpiStrip::new(Vec::new(), 2, 3);
        strip.set_pixel(1, &[0xff, 0x00, 0x80]).unwrap();
        strip.show().unwrap();

        let written = strip.output().unwrap();
        assert_eq!(written.len(), 2 * 3 * ENCODED_BYTES_PER_BYTE + RESET_BYTES);
        assert_eq!(&written[9..12], &encode_byte(0xff));
        assert_eq!(&written[15..18], &encode_byte(0x80));
        assert!(written[18..].iter().all(|b| *b == 0));
    }

    #[test]
    fn it_should_reject_bad_indices_and_widths() {
        let mut strip = SpiStrip::new(Vec::new(), 2, 3);
        assert!(strip.set_pixel(2, &[0, 0, 0]).is_err());
        assert!(strip.set_pixel(0, &[0, 0, 0, 0]).is_err());
    }

    #[test]
    fn it_should_refuse_to_show_after_release() {
        let mut strip = SpiStrip::new(Vec::new(), 1, 3);
        strip.release().unwrap();
        assert!(matches!(strip.show(), Err(MatrixError::BackendUnavailable(_))));
    }

    #[test]
    fn it_should_report_a_missing_device() {
        let result = SpiStrip::open(Path::new("/nonexistent/spidev9.9"), 4, 3);
        assert!(matches!(result, Err(MatrixError::BackendUnavailable(_))));
    }
}
