// src/error.rs

//! Error taxonomy shared by the display core.
//!
//! Every failure stops the animation loop; nothing in the core retries. The
//! process entry point decides how each kind is reported.

use thiserror::Error;

/// Errors raised by the mapper, frame buffer, automaton and backends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// A coordinate, physical index or grid dimension outside its valid range.
    /// Always a programming or configuration error.
    #[error("{what} {value} is out of range (limit {limit})")]
    OutOfRange {
        what: &'static str,
        value: usize,
        limit: usize,
    },
    /// The selected output surface cannot be used (no device, terminal too
    /// small, bus write failed).
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// The initial pattern configuration is unusable.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
}

impl MatrixError {
    pub(crate) fn out_of_range(what: &'static str, value: usize, limit: usize) -> Self {
        MatrixError::OutOfRange { what, value, limit }
    }

    pub(crate) fn backend(msg: impl Into<String>) -> Self {
        MatrixError::BackendUnavailable(msg.into())
    }
}
