//! DAT1 - game asset container library.
//!
//! This crate provides a unified interface to the DAT1 crates.
//!
//! # Crates
//!
//! - [`dat1_common`] - Common utilities (binary reading, name checksums)
//! - [`dat1_format`] - Container, section codecs, registry and name audit
//! - [`dat1_model`] - Geometry assembly and OBJ export
//!
//! # Example
//!
//! ```no_run
//! use dat1::prelude::*;
//!
//! let data = std::fs::read("hero.model")?;
//! let dat1 = Dat1::parse(&data)?;
//!
//! if let Some(joints) = dat1.get::<JointsSection>() {
//!     println!("Joints: {}", joints.joints.len());
//! }
//!
//! let geometry = assemble(&dat1, &ExportOptions::default())?;
//! std::fs::write("hero.obj", to_obj(&geometry))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use dat1_common as common;
pub use dat1_format as format;
pub use dat1_model as model;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use dat1_common::{crc, BinaryReader};
    pub use dat1_format::sections::{
        ArchivesSection, IndexSection, JointLookupSection, JointsSection, LocatorLookupSection,
        LocatorsSection, LookSection, MaterialNamesSection, MeshSection, Mod0Section,
        ModelMaterialSection, VertexSection,
    };
    pub use dat1_format::{
        Dat1, DecodeContext, Family, HashMismatch, RawSection, Revision, Section, SectionCodec,
        StringTable, TypedSection,
    };
    pub use dat1_model::{assemble, to_mtl, to_obj, ExportOptions, ModelGeometry, ObjWriter};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
