//! DAT1 asset container codec.
//!
//! A DAT1 file is a small header, a table of `(tag, offset, size)` entries,
//! a blob of NUL-terminated strings shared by every section, and the section
//! payloads themselves. Each known tag has a codec that turns its payload into
//! a typed value and back; unknown tags are kept as raw bytes.
//!
//! Decoding then encoding an unedited container reproduces it byte for byte.
//!
//! # Example
//!
//! ```no_run
//! use dat1_format::{Dat1, sections::LocatorsSection};
//!
//! let data = std::fs::read("hero.model")?;
//! let dat1 = Dat1::parse(&data)?;
//!
//! for section in dat1.sections() {
//!     println!("{:08X} {}", section.tag(), section.name());
//! }
//!
//! if let Some(locators) = dat1.get::<LocatorsSection>() {
//!     println!("{} locators", locators.locators.len());
//! }
//!
//! for mismatch in dat1.audit() {
//!     eprintln!("{}", mismatch);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod codec;
mod container;
mod error;
mod strings;

pub mod audit;
pub mod registry;
pub mod sections;

pub use audit::{HashMismatch, NameField};
pub use codec::{DecodeContext, Family, Revision, SectionCodec};
pub use container::Dat1;
pub use error::{Error, Result};
pub use sections::{RawSection, Section, TypedSection};
pub use strings::StringTable;
