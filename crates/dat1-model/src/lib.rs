//! Geometry export for DAT1 models.
//!
//! [`assemble`] gathers the meshes that a set of looks shows at one level of
//! detail into a [`ModelGeometry`]; [`ObjWriter`] renders it as Wavefront OBJ.
//!
//! # Example
//!
//! ```no_run
//! use dat1_format::Dat1;
//! use dat1_model::{assemble, to_obj, ExportOptions};
//!
//! let dat1 = Dat1::parse(&std::fs::read("hero.model")?)?;
//! let geometry = assemble(&dat1, &ExportOptions::new([0], 0))?;
//!
//! for warning in &geometry.warnings {
//!     eprintln!("{}", warning);
//! }
//! std::fs::write("hero.obj", to_obj(&geometry))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod assembler;
mod error;
mod obj;

pub use assembler::{assemble, ExportOptions, MeshGroup, MeshWarning, ModelGeometry, OutputVertex};
pub use error::{Error, Result};
pub use obj::{to_mtl, to_obj, ObjWriter};
