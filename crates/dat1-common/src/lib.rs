//! Common utilities for DAT1 tooling.
//!
//! This crate provides the foundations shared by the DAT1 crates:
//!
//! - [`BinaryReader`] - Bounds-checked, zero-copy reading from byte slices
//! - [`crc`] - The CRC-32 and CRC-64 name checksums recorded in section data
//! - [`Error`] - Low-level read errors

mod error;
mod reader;

pub mod crc;

pub use error::{Error, Result};
pub use reader::BinaryReader;
