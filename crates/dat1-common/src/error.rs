//! Error types for dat1-common.

use thiserror::Error;

/// Common error type for low-level DAT1 reads.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// A requested range does not fit inside the buffer.
    #[error("range {start}..{end} out of bounds (buffer length: {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
