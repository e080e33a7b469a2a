//! Material references: the model material table and material name tables.

use dat1_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::codec::{put_records, DecodeContext, Family, SectionCodec};
use crate::strings::StringTable;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct MaterialOffsets {
    file_offset: u64,
    name_offset: u64,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct MaterialHashes {
    path_hash: u64,
    name_hash: u32,
    extra: u32,
}

/// One material used by a model.
///
/// Paths and names are stored both as string-table offsets and as hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterialRef {
    /// Offset of the material file path.
    pub file_offset: u64,
    /// Offset of the material name.
    pub name_offset: u64,
    /// Asset hash (CRC-64) of the material file path.
    pub path_hash: u64,
    /// Case-normalized CRC-32 of the material name.
    pub name_hash: u32,
    /// Unclassified.
    pub extra: u32,
}

/// The model material table.
///
/// Laid out as all offset pairs followed by all hash triples, 32 bytes per
/// material in total.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelMaterialSection {
    pub materials: Vec<MaterialRef>,
    pub tail: Vec<u8>,
}

impl SectionCodec for ModelMaterialSection {
    const TAG: u32 = 0x3250_BB80;
    const NAME: &'static str = "Model Material";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        let count = data.len() / 32;
        let mut reader = BinaryReader::new(data);
        let offsets = reader.read_array::<MaterialOffsets>(count)?;
        let hashes = reader.read_array::<MaterialHashes>(count)?;

        let materials = offsets
            .iter()
            .zip(&hashes)
            .map(|(o, h)| MaterialRef {
                file_offset: o.file_offset,
                name_offset: o.name_offset,
                path_hash: h.path_hash,
                name_hash: h.name_hash,
                extra: h.extra,
            })
            .collect();

        Ok(Self {
            materials,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let offsets: Vec<MaterialOffsets> = self
            .materials
            .iter()
            .map(|m| MaterialOffsets {
                file_offset: m.file_offset,
                name_offset: m.name_offset,
            })
            .collect();
        let hashes: Vec<MaterialHashes> = self
            .materials
            .iter()
            .map(|m| MaterialHashes {
                path_hash: m.path_hash,
                name_hash: m.name_hash,
                extra: m.extra,
            })
            .collect();

        let mut out = Vec::with_capacity(self.materials.len() * 32 + self.tail.len());
        put_records(&mut out, &offsets);
        put_records(&mut out, &hashes);
        out.extend_from_slice(&self.tail);
        out
    }
}

/// Fixed 40-byte header of a material name table.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct MaterialNamesHeader {
    data_size: u32,
    a: u32,
    b: u32,
    c: u32,
    data_offset: u32,
    count: u32,
    d: u32,
    e: u32,
    f: u32,
    g: u32,
}

/// One entry of a material name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct MaterialName {
    /// Offset into the section-local string blob.
    pub string_offset: u32,
    /// Case-preserving CRC-32 of the string.
    pub hash: u32,
}

/// Material name table found in material assets.
///
/// The header's `data_offset` marks where the entries begin; the bytes between
/// the header and that offset are kept opaque. Strings live in a blob local to
/// the section, after the entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaterialNamesSection {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
    pub e: u32,
    pub f: u32,
    pub g: u32,
    /// Bytes between the header and the entries.
    pub preamble: Vec<u8>,
    pub entries: Vec<MaterialName>,
    pub strings: StringTable,
}

impl MaterialNamesSection {
    const HEADER_SIZE: usize = 40;

    /// Offset of the first entry, as encoded.
    pub fn data_offset(&self) -> u32 {
        (Self::HEADER_SIZE + self.preamble.len()) as u32
    }

    /// Total size field, as encoded.
    pub fn data_size(&self) -> u32 {
        self.data_offset() + (self.entries.len() * 8 + self.strings.len()) as u32
    }

    /// Resolve an entry's name from the local blob.
    pub fn name(&self, index: usize) -> Option<&str> {
        let entry = self.entries.get(index)?;
        self.strings.get(entry.string_offset as u64)
    }
}

impl SectionCodec for MaterialNamesSection {
    const TAG: u32 = 0xF526_0180;
    const NAME: &'static str = "Material Names";
    const FAMILY: Family = Family::Material;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        if data.len() < Self::HEADER_SIZE {
            return Err(Error::malformed(
                Self::TAG,
                format!("{} bytes is shorter than the 40-byte header", data.len()),
            ));
        }

        let mut reader = BinaryReader::new(data);
        let header: MaterialNamesHeader = reader.read_struct()?;

        let data_offset = header.data_offset as usize;
        if data_offset < Self::HEADER_SIZE || data_offset > data.len() {
            return Err(Error::malformed(
                Self::TAG,
                format!(
                    "data offset {} outside {}..={}",
                    data_offset,
                    Self::HEADER_SIZE,
                    data.len()
                ),
            ));
        }

        let preamble = reader.slice(Self::HEADER_SIZE, data_offset)?.to_vec();
        reader.seek(data_offset);
        let entries = reader.read_array::<MaterialName>(header.count as usize)?;
        let strings = StringTable::new(reader.remaining_bytes().to_vec());

        Ok(Self {
            a: header.a,
            b: header.b,
            c: header.c,
            d: header.d,
            e: header.e,
            f: header.f,
            g: header.g,
            preamble,
            entries,
            strings,
        })
    }

    fn encode(&self) -> Vec<u8> {
        let header = MaterialNamesHeader {
            data_size: self.data_size(),
            a: self.a,
            b: self.b,
            c: self.c,
            data_offset: self.data_offset(),
            count: self.entries.len() as u32,
            d: self.d,
            e: self.e,
            f: self.f,
            g: self.g,
        };

        let mut out = Vec::with_capacity(self.data_size() as usize);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&self.preamble);
        put_records(&mut out, &self.entries);
        out.extend_from_slice(self.strings.as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_material_layout() {
        let section = ModelMaterialSection {
            materials: vec![
                MaterialRef {
                    file_offset: 0,
                    name_offset: 20,
                    path_hash: 0x8000_0000_0000_0001,
                    name_hash: 0xAABB_CCDD,
                    extra: 7,
                },
                MaterialRef {
                    file_offset: 30,
                    name_offset: 50,
                    path_hash: 2,
                    name_hash: 3,
                    extra: 0,
                },
            ],
            tail: Vec::new(),
        };
        let bytes = section.encode();
        assert_eq!(bytes.len(), 64);
        // Offset pairs come first, then the hash triples.
        assert_eq!(&bytes[16..24], &30u64.to_le_bytes());
        assert_eq!(&bytes[32..40], &0x8000_0000_0000_0001u64.to_le_bytes());
        assert_eq!(&bytes[40..44], &0xAABB_CCDDu32.to_le_bytes());

        let decoded = ModelMaterialSection::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(decoded, section);
    }

    #[test]
    fn test_model_material_odd_length_keeps_tail() {
        let mut bytes = vec![0u8; 32];
        bytes.extend_from_slice(&[9, 9, 9]);

        let decoded = ModelMaterialSection::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(decoded.materials.len(), 1);
        assert_eq!(decoded.tail, vec![9, 9, 9]);
        assert_eq!(decoded.encode(), bytes);
    }

    fn names_section() -> MaterialNamesSection {
        let mut strings = StringTable::default();
        let diffuse = strings.push("diffuse");
        let normal = strings.push("normal");
        MaterialNamesSection {
            a: 1,
            b: 2,
            c: 3,
            d: 4,
            e: 5,
            f: 6,
            g: 7,
            preamble: vec![0xEE; 8],
            entries: vec![
                MaterialName {
                    string_offset: diffuse,
                    hash: dat1_common::crc::hash32_raw(b"diffuse"),
                },
                MaterialName {
                    string_offset: normal,
                    hash: 0,
                },
            ],
            strings,
        }
    }

    #[test]
    fn test_material_names_round_trip() {
        let section = names_section();
        let bytes = section.encode();

        assert_eq!(section.data_offset(), 48);
        assert_eq!(bytes.len() as u32, section.data_size());
        assert_eq!(&bytes[..4], &section.data_size().to_le_bytes());
        assert_eq!(&bytes[16..20], &48u32.to_le_bytes());

        let decoded = MaterialNamesSection::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(decoded, section);
        assert_eq!(decoded.name(0), Some("diffuse"));
        assert_eq!(decoded.name(1), Some("normal"));
        assert_eq!(decoded.name(2), None);
        assert_eq!(decoded.encode(), bytes);
    }

    #[test]
    fn test_material_names_bad_offsets() {
        let mut bytes = names_section().encode();

        // Data offset inside the header.
        bytes[16..20].copy_from_slice(&8u32.to_le_bytes());
        assert!(MaterialNamesSection::decode(&bytes, &DecodeContext::default()).is_err());

        // Count runs past the end.
        let mut bytes = names_section().encode();
        bytes[20..24].copy_from_slice(&1000u32.to_le_bytes());
        let err = MaterialNamesSection::decode(&bytes, &DecodeContext::default()).unwrap_err();
        assert!(matches!(err, Error::Common(_)));
    }
}
