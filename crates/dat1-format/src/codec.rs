//! The per-tag codec contract.

use std::fmt;

use zerocopy::{Immutable, IntoBytes};

use crate::Result;

/// Coarse grouping of section tags, used for listing and filtering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Model geometry, skeleton and model metadata.
    Model,
    /// Material assets.
    Material,
    /// Table-of-contents and archive metadata.
    Toc,
    /// Tags without a registered codec.
    Unknown,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Model => "model",
            Family::Material => "material",
            Family::Toc => "toc",
            Family::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Historical format revision of the asset being decoded.
///
/// Only record layouts that actually changed between games consult this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Revision {
    /// Marvel's Spider-Man Remastered / Miles Morales.
    #[default]
    Msmr,
    /// Ratchet & Clank: Rift Apart.
    Rcra,
}

impl Revision {
    /// Asset type magic of MSMR model files.
    pub const MSMR_MODEL_TYPE: u32 = 0x9890_6B9F;

    /// Pick the revision implied by a container's asset type magic.
    ///
    /// Unrecognized types fall back to MSMR; callers that know better pass a
    /// revision explicitly.
    pub fn from_asset_type(asset_type: u32) -> Self {
        match asset_type {
            Self::MSMR_MODEL_TYPE => Revision::Msmr,
            _ => Revision::default(),
        }
    }
}

/// Per-container information a codec may need while decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeContext {
    pub revision: Revision,
}

impl DecodeContext {
    /// Create a context for the given revision.
    pub const fn new(revision: Revision) -> Self {
        Self { revision }
    }
}

/// A decoder/encoder pair for one section tag.
///
/// `decode` must reject buffers shorter than the fixed header and any declared
/// count or offset that would read past the end. `encode` never fails and
/// recomputes derived length fields from the data it is about to write.
pub trait SectionCodec: Sized {
    /// The 32-bit tag this codec is registered under.
    const TAG: u32;
    /// Human-readable section name.
    const NAME: &'static str;
    /// Coarse family label.
    const FAMILY: Family;

    /// Decode the section from its payload bytes.
    fn decode(data: &[u8], ctx: &DecodeContext) -> Result<Self>;

    /// Encode the section back into payload bytes.
    fn encode(&self) -> Vec<u8>;
}

/// Append a run of fixed-size records to an output buffer.
#[inline]
pub(crate) fn put_records<T: IntoBytes + Immutable>(out: &mut Vec<u8>, records: &[T]) {
    out.extend_from_slice(records.as_bytes());
}
