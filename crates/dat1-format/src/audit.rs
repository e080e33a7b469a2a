//! Stated-versus-computed name hash auditing.
//!
//! Records that carry both a string offset and a checksum of that string are
//! rechecked after decoding. A mismatch is reported as a [`HashMismatch`];
//! decoded data is never touched. Records whose string cannot be resolved are
//! skipped. These functions do not log: [`Dat1::parse`](crate::Dat1::parse)
//! warns once per mismatch when a container is loaded.

use std::fmt;

use dat1_common::crc::{self, NameCase};

use crate::sections::{
    JointsSection, LocatorsSection, MaterialNamesSection, ModelMaterialSection, Section,
};
use crate::strings::StringTable;
use crate::SectionCodec;

/// Which hashed name a mismatch concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameField {
    Joint,
    Locator,
    MaterialPath,
    MaterialName,
    MaterialTableEntry,
}

impl fmt::Display for NameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NameField::Joint => "joint name",
            NameField::Locator => "locator name",
            NameField::MaterialPath => "material path",
            NameField::MaterialName => "material name",
            NameField::MaterialTableEntry => "material table entry",
        };
        f.write_str(name)
    }
}

/// A record whose stored hash disagrees with the hash of its resolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashMismatch {
    pub tag: u32,
    /// Record index within the section.
    pub index: usize,
    pub field: NameField,
    pub name: String,
    pub stored: u64,
    pub computed: u64,
}

impl fmt::Display for HashMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08X}[{}] {} {:?}: stored hash {:X}, computed {:X}",
            self.tag, self.index, self.field, self.name, self.stored, self.computed
        )
    }
}

struct Auditor {
    tag: u32,
    found: Vec<HashMismatch>,
}

impl Auditor {
    fn new(tag: u32) -> Self {
        Self {
            tag,
            found: Vec::new(),
        }
    }

    fn check(&mut self, index: usize, field: NameField, name: &[u8], stored: u64, computed: u64) {
        if stored == computed {
            return;
        }
        let mismatch = HashMismatch {
            tag: self.tag,
            index,
            field,
            name: String::from_utf8_lossy(name).into_owned(),
            stored,
            computed,
        };
        self.found.push(mismatch);
    }
}

/// Check joint names (case-preserving CRC-32).
pub fn audit_joints(section: &JointsSection, strings: &StringTable) -> Vec<HashMismatch> {
    let mut auditor = Auditor::new(JointsSection::TAG);
    for (i, joint) in section.joints.iter().enumerate() {
        if let Some(name) = strings.get_bytes(joint.string_offset as u64) {
            let computed = crc::hash32(name, NameCase::Raw);
            auditor.check(i, NameField::Joint, name, joint.hash as u64, computed as u64);
        }
    }
    auditor.found
}

/// Check locator names (case-preserving CRC-32).
pub fn audit_locators(section: &LocatorsSection, strings: &StringTable) -> Vec<HashMismatch> {
    let mut auditor = Auditor::new(LocatorsSection::TAG);
    for (i, locator) in section.locators.iter().enumerate() {
        if let Some(name) = strings.get_bytes(locator.string_offset as u64) {
            let computed = crc::hash32(name, NameCase::Raw);
            auditor.check(i, NameField::Locator, name, locator.hash as u64, computed as u64);
        }
    }
    auditor.found
}

/// Check material paths (CRC-64 asset hash) and names (case-normalized CRC-32).
pub fn audit_model_materials(
    section: &ModelMaterialSection,
    strings: &StringTable,
) -> Vec<HashMismatch> {
    let mut auditor = Auditor::new(ModelMaterialSection::TAG);
    for (i, material) in section.materials.iter().enumerate() {
        if let Some(path) = strings.get_bytes(material.file_offset) {
            let computed = crc::asset_hash(path);
            auditor.check(i, NameField::MaterialPath, path, material.path_hash, computed);
        }
        if let Some(name) = strings.get_bytes(material.name_offset) {
            let computed = crc::hash32(name, NameCase::Normalized);
            auditor.check(
                i,
                NameField::MaterialName,
                name,
                material.name_hash as u64,
                computed as u64,
            );
        }
    }
    auditor.found
}

/// Check a material name table against its own local strings.
pub fn audit_material_names(section: &MaterialNamesSection) -> Vec<HashMismatch> {
    let mut auditor = Auditor::new(MaterialNamesSection::TAG);
    for (i, entry) in section.entries.iter().enumerate() {
        if let Some(name) = section.strings.get_bytes(entry.string_offset as u64) {
            let computed = crc::hash32(name, NameCase::Raw);
            auditor.check(
                i,
                NameField::MaterialTableEntry,
                name,
                entry.hash as u64,
                computed as u64,
            );
        }
    }
    auditor.found
}

/// Audit any section; sections without hashed names yield nothing.
pub fn audit_section(section: &Section, strings: &StringTable) -> Vec<HashMismatch> {
    match section {
        Section::Joints(s) => audit_joints(s, strings),
        Section::Locators(s) => audit_locators(s, strings),
        Section::ModelMaterial(s) => audit_model_materials(s, strings),
        Section::MaterialNames(s) => audit_material_names(s),
        _ => Vec::new(),
    }
}
