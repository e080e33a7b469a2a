//! Error types for geometry assembly.

use thiserror::Error;

/// Errors that abort a whole export.
///
/// Problems confined to one mesh are reported as
/// [`MeshWarning`](crate::MeshWarning)s instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A section the export needs is absent, or did not decode.
    #[error("required section {name} ({tag:#010X}) is missing")]
    MissingSection { tag: u32, name: &'static str },

    /// A requested look does not exist.
    #[error("look {look} out of range (model has {count})")]
    LookOutOfRange { look: usize, count: usize },

    /// A requested LOD does not exist.
    #[error("LOD {lod} out of range (looks have {count})")]
    LodOutOfRange { lod: usize, count: usize },

    /// I/O error while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, Error>;
