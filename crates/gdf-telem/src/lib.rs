/// GPS collar telemetry (GDF) decoding library.
///
/// A GDF log is decoded by [`document::GdfDocument`] into an ordered list of
/// [`protocol::fix::Fix`] records. *Coordinates* ([`coord`], [`utm`]) turn the raw ECEF positions
/// into latitude, longitude, altitude and UTM grid values, and [`format::RowFormatter`] renders
/// each fix as one delimited table row. [`batch`] ties it together for a list of input files.
use std::path::PathBuf;
use std::sync::Once;

use thiserror::Error;

pub mod batch;
pub mod coord;
pub mod cursor;
pub mod document;
pub mod format;
pub mod protocol;
pub mod tables;
pub mod utm;

pub use document::GdfDocument;
pub use format::{FormatOptions, RowFormatter};

/// Result type for this library
pub type GdfResult<T> = std::result::Result<T, Error>;

/// Error type for this library
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unexpected end of input at byte {offset}: {needed} more byte(s) needed")]
    UnexpectedEndOfInput { offset: usize, needed: usize },
    #[error("Invalid header postfix {postfix:02x?}")]
    InvalidHeader { postfix: [u8; 3] },
    #[error("Truncated fix record at byte {offset}: only {remaining} byte(s) left")]
    TruncatedRecord { offset: usize, remaining: usize },
    #[error("Geodetic result is undefined for this position")]
    UndefinedGeodeticResult,
    #[error("UTM projection unavailable: {0}")]
    ProjectionUnavailable(String),
    #[error("Unknown label: {0}")]
    UnknownLabel(String),
    #[error("Value out of range: {0}")]
    OutOfRange(String),
    #[error("Invalid coordinate: {0}")]
    InvalidCoord(String),
    #[error("Unsupported file: {}", .0.display())]
    UnsupportedFile(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Test binary helper to init tracing. This is usually the responsibility of the consumer of the
/// library crate.
pub fn lazy_init_tracing() {
    {
        static INIT: Once = Once::new();
        &INIT
    }
    .call_once(|| {
        tracing_subscriber::fmt::init();
    });
}
