// src/backends/console.rs

//! Provides a `Driver` implementation that simulates the LED matrix on a
//! standard Unix console using ANSI escape codes. Every pixel is drawn as a
//! two-column block in 24-bit color, and every frame is positioned absolutely
//! so redraws overwrite the previous frame instead of scrolling.

use crate::backends::Driver;
use crate::color::Color;
use crate::error::MatrixError;
use crate::frame::FrameSnapshot;
use crate::layout::GridDimensions;

use anyhow::{Context, Result};
use libc::{winsize, STDIN_FILENO, STDOUT_FILENO, TIOCGWINSZ};
use std::io::{self, stdout, Stdout, Write};
use std::mem;
use std::os::unix::io::RawFd;
use termios::{tcsetattr, Termios, ECHO, ICANON, TCSANOW};

use log::{debug, error, info, trace, warn};

// --- ANSI Escape Code Constants ---
const CURSOR_HIDE: &str = "\x1b[?25l";
const CURSOR_SHOW: &str = "\x1b[?25h";
const SGR_RESET: &str = "\x1b[0m";
const CLEAR_SCREEN_AND_HOME: &str = "\x1b[2J\x1b[H";

/// Glyph drawn for one LED.
const PIXEL_GLYPH: &str = "\u{2588}\u{2588}";
/// Terminal columns taken by `PIXEL_GLYPH`.
const PIXEL_GLYPH_WIDTH: usize = 2;

/// A `Driver` that paints frames onto a terminal.
///
/// `new` takes over the process's stdout; `with_output` draws into any writer
/// and is what tests use.
pub struct ConsoleDriver<W: Write = Stdout> {
    out: W,
    dims: GridDimensions,
    /// Input descriptor and its attributes before `claim`, restored on cleanup.
    original_termios: Option<(RawFd, Termios)>,
    released: bool,
}

impl ConsoleDriver<Stdout> {
    /// Claims the controlling terminal.
    ///
    /// Fails with `BackendUnavailable` if stdout is not a terminal or the grid
    /// does not fit its current viewport.
    pub fn new(dims: GridDimensions) -> Result<Self, MatrixError> {
        info!("Creating new ConsoleDriver.");
        let viewport = get_terminal_size_cells(STDOUT_FILENO).map_err(|e| {
            MatrixError::backend(format!("cannot query terminal size: {}", e))
        })?;
        Self::claim(stdout(), dims, viewport, STDIN_FILENO)
    }
}

impl<W: Write> ConsoleDriver<W> {
    /// Draws into `out` and quiets the terminal on `input`.
    ///
    /// Echo and line buffering are switched off only after the driver exists.
    /// Signal keys keep working so Ctrl-C still interrupts the animation.
    pub fn claim(out: W, dims: GridDimensions, viewport: (u16, u16), input: RawFd) -> Result<Self, MatrixError> {
        let mut driver = Self::with_output(out, dims, viewport)?;
        driver.quiet_input(input);
        Ok(driver)
    }

    /// Draws into `out`, assuming a viewport of `(cols, rows)` cells.
    pub fn with_output(mut out: W, dims: GridDimensions, viewport: (u16, u16)) -> Result<Self, MatrixError> {
        check_viewport(dims, viewport)?;
        write!(out, "{}{}", CURSOR_HIDE, CLEAR_SCREEN_AND_HOME)
            .and_then(|()| out.flush())
            .map_err(|e| MatrixError::backend(format!("cannot write to terminal: {}", e)))?;
        info!(
            "ConsoleDriver: Drawing {}x{} grid in a {}x{} viewport.",
            dims.rows(),
            dims.cols(),
            viewport.1,
            viewport.0
        );
        Ok(ConsoleDriver {
            out,
            dims,
            original_termios: None,
            released: false,
        })
    }

    fn quiet_input(&mut self, input: RawFd) {
        let original = match Termios::from_fd(input) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(
                    "ConsoleDriver: Failed to get initial termios: {}. Keystrokes will echo.",
                    e
                );
                return;
            }
        };
        let mut quiet_termios = original;
        quiet_termios.c_lflag &= !(ECHO | ICANON);
        if let Err(e) = tcsetattr(input, TCSANOW, &quiet_termios) {
            warn!("ConsoleDriver: Failed to disable echo: {}.", e);
            return;
        }
        debug!("ConsoleDriver: Echo and canonical mode disabled.");
        self.original_termios = Some((input, original));
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    fn render(&self, snapshot: &FrameSnapshot) -> Result<String, MatrixError> {
        let dims = snapshot.dimensions();
        let mut cmd = String::with_capacity(dims.len() * 24);
        for row in 0..dims.rows() {
            cmd.push_str(&format_cursor_position(row + 1, 1));
            let mut current: Option<Color> = None;
            for color in snapshot.logical_row(row)? {
                if current != Some(color) {
                    cmd.push_str(&format_fg_color(color));
                    current = Some(color);
                }
                cmd.push_str(PIXEL_GLYPH);
            }
            cmd.push_str(SGR_RESET);
        }
        Ok(cmd)
    }
}

impl<W: Write> Driver for ConsoleDriver<W> {
    fn draw(&mut self, snapshot: &FrameSnapshot) -> Result<(), MatrixError> {
        if snapshot.dimensions() != self.dims {
            return Err(MatrixError::out_of_range(
                "snapshot pixel count",
                snapshot.dimensions().len(),
                self.dims.len(),
            ));
        }
        let cmd = self.render(snapshot)?;
        self.out
            .write_all(cmd.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| MatrixError::backend(format!("terminal write failed: {}", e)))?;
        trace!("ConsoleDriver: Drew frame ({} bytes).", cmd.len());
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        info!("ConsoleDriver: Cleaning up...");
        let cursor = write!(
            self.out,
            "{}{}{}",
            format_cursor_position(self.dims.rows() + 1, 1),
            SGR_RESET,
            CURSOR_SHOW
        )
        .and_then(|()| self.out.flush());
        // terminal modes are restored even when the output is gone
        if let Some((input, original_termios)) = self.original_termios.take() {
            debug!("ConsoleDriver: Restoring original terminal attributes.");
            tcsetattr(input, TCSANOW, &original_termios)
                .context("ConsoleDriver: Failed to restore original terminal attributes")?;
        }
        cursor.context("ConsoleDriver: Failed to restore cursor")?;
        info!("ConsoleDriver: Cleanup complete.");
        Ok(())
    }
}

impl<W: Write> Drop for ConsoleDriver<W> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        warn!("ConsoleDriver: Dropped without cleanup, restoring terminal.");
        if let Err(e) = self.cleanup() {
            error!("ConsoleDriver: Error during cleanup in drop: {:#}", e);
        }
    }
}

/// Fails unless `dims` fits a viewport of `(cols, rows)` terminal cells.
pub fn check_viewport(dims: GridDimensions, viewport: (u16, u16)) -> Result<(), MatrixError> {
    let (cols, rows) = (viewport.0 as usize, viewport.1 as usize);
    let needed_cols = dims.cols() * PIXEL_GLYPH_WIDTH;
    if dims.rows() > rows || needed_cols > cols {
        return Err(MatrixError::backend(format!(
            "terminal is {}x{} cells but a {}x{} grid needs {}x{}",
            cols,
            rows,
            dims.rows(),
            dims.cols(),
            needed_cols,
            dims.rows()
        )));
    }
    Ok(())
}

fn format_cursor_position(row_1_based: usize, col_1_based: usize) -> String {
    format!("\x1b[{};{}H", row_1_based, col_1_based)
}

fn format_fg_color(color: Color) -> String {
    format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}

/// `(cols, rows)` of the terminal attached to `fd`.
fn get_terminal_size_cells(fd: RawFd) -> io::Result<(u16, u16)> {
    // SAFETY: TIOCGWINSZ only writes into the zeroed winsize we pass.
    unsafe {
        let mut winsz: winsize = mem::zeroed();
        if libc::ioctl(fd, TIOCGWINSZ, &mut winsz) == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok((winsz.ws_col, winsz.ws_row))
    }
}
