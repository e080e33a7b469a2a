//! Error types for DAT1 container and section decoding.

use thiserror::Error;

/// Errors that can occur when decoding or encoding DAT1 data.
#[derive(Debug, Error)]
pub enum Error {
    /// Low-level read error.
    #[error("{0}")]
    Common(#[from] dat1_common::Error),

    /// Section bytes are shorter than the declared header, or a declared
    /// count/offset would read past the end of the buffer.
    #[error("malformed section {tag:#010X}: {reason}")]
    MalformedSection { tag: u32, reason: String },

    /// The container does not start with the DAT1 magic.
    #[error("invalid DAT1 magic: expected {expected:#010X}, got {actual:#010X}")]
    InvalidMagic { expected: u32, actual: u32 },

    /// A section table entry points outside the container.
    #[error("section {tag:#010X} at {offset}+{size} exceeds container length {len}")]
    SectionOutOfBounds {
        tag: u32,
        offset: u32,
        size: u32,
        len: usize,
    },
}

impl Error {
    /// Create a malformed-section error.
    pub fn malformed(tag: u32, reason: impl Into<String>) -> Self {
        Self::MalformedSection {
            tag,
            reason: reason.into(),
        }
    }

    /// Attribute any decode failure to the section that was being decoded.
    pub fn into_malformed(self, tag: u32) -> Self {
        match self {
            Self::MalformedSection { .. } => self,
            other => Self::MalformedSection {
                tag,
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for DAT1 operations.
pub type Result<T> = std::result::Result<T, Error>;
