//! Log-file lifecycle: sequence discovery, CSV rows, storage volumes.

pub mod row;
pub mod sd;
pub mod sequencer;
pub mod session;
pub mod volume;

pub use row::CsvRow;
pub use sequencer::LogFileId;
pub use session::LogSession;
pub use volume::Volume;

use core::str::FromStr;

use thiserror_no_std::Error;

/// Everything that can go wrong between the foreground loop and the card.
///
/// Spurious edges and "no data yet" are deliberately not part of this
/// taxonomy: the former is a silently discarded event, the latter is an
/// `Option::None` from the estimator rather than a magic numeric value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The volume cannot be mounted or read. Fatal to the logging
    /// session; the top-level loop decides whether to retry setup.
    #[error("storage unavailable: {0}")]
    Unavailable(heapless::String<64>),
    /// The 4-digit sequence field is used up. Never wrapped silently.
    #[error("log file sequence exhausted (9999)")]
    SequenceExhausted,
    /// A write to the active log failed. The row is not dropped silently;
    /// the caller decides whether to retry or end the session.
    #[error("log write failed: {0}")]
    WriteFailure(heapless::String<64>),
    /// A row outgrew its fixed buffer before reaching the card.
    #[error("row exceeds the row buffer capacity")]
    RowTooLarge,
    /// The configured naming parameters cannot form a valid file name.
    #[error("invalid log file configuration: {0}")]
    InvalidConfig(&'static str),
}

impl StorageError {
    /// Build a [`StorageError::Unavailable`] from any debug-printable
    /// driver error, truncating the detail to the bounded payload.
    pub fn unavailable<E: core::fmt::Debug>(err: E) -> Self {
        Self::Unavailable(detail(&err))
    }

    /// Build a [`StorageError::WriteFailure`] the same way.
    pub fn write_failure<E: core::fmt::Debug>(err: E) -> Self {
        Self::WriteFailure(detail(&err))
    }
}

fn detail<E: core::fmt::Debug>(err: &E) -> heapless::String<64> {
    use core::fmt::Write;

    let mut out = heapless::String::new();
    // Truncation on overflow is fine for a diagnostic payload.
    let _ = write!(out, "{err:?}");
    out
}

pub trait FromUnchecked<T> {
    fn from_unchecked(value: T) -> Self;
}

impl<const N: usize> FromUnchecked<&str> for heapless::String<N> {
    fn from_unchecked(value: &str) -> Self {
        heapless::String::<N>::from_str(value).unwrap()
    }
}
