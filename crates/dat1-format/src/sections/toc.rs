//! Table-of-contents sections: archive entries and MOD0 metadata.

use dat1_common::BinaryReader;
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

use crate::codec::{put_records, DecodeContext, Family, SectionCodec};
use crate::{Error, Result};

/// Width of the archive filename field.
pub const ARCHIVE_NAME_LEN: usize = 64;

/// A 72-byte archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ArchiveEntry {
    pub install_bucket: u32,
    pub chunk_map: u32,
    /// Zero-padded filename.
    pub filename: [u8; ARCHIVE_NAME_LEN],
}

impl ArchiveEntry {
    /// Build an entry, or `None` if the name does not fit the field.
    pub fn new(install_bucket: u32, chunk_map: u32, filename: &str) -> Option<Self> {
        let bytes = filename.as_bytes();
        if bytes.len() > ARCHIVE_NAME_LEN {
            return None;
        }
        let mut entry = Self::new_zeroed();
        entry.install_bucket = install_bucket;
        entry.chunk_map = chunk_map;
        entry.filename[..bytes.len()].copy_from_slice(bytes);
        Some(entry)
    }

    /// The filename up to the first zero byte.
    pub fn name(&self) -> Option<&str> {
        let end = memchr::memchr(0, &self.filename).unwrap_or(ARCHIVE_NAME_LEN);
        std::str::from_utf8(&self.filename[..end]).ok()
    }
}

/// Archive file table of a TOC.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArchivesSection {
    pub archives: Vec<ArchiveEntry>,
    pub tail: Vec<u8>,
}

impl SectionCodec for ArchivesSection {
    const TAG: u32 = 0x398A_BFF0;
    const NAME: &'static str = "Archives";
    const FAMILY: Family = Family::Toc;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let archives = reader.read_remaining_array::<ArchiveEntry>()?;
        Ok(Self {
            archives,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.archives.len() * 72 + self.tail.len());
        put_records(&mut out, &self.archives);
        out.extend_from_slice(&self.tail);
        out
    }
}

/// MOD0 metadata: a UTF-8 JSON document stored verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Mod0Section {
    raw: Vec<u8>,
    value: serde_json::Value,
}

impl Mod0Section {
    /// Build a section from a JSON value.
    pub fn new(value: serde_json::Value) -> Self {
        let raw = value.to_string().into_bytes();
        Self { raw, value }
    }

    /// The parsed document.
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    /// The stored bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Replace the document; the stored bytes are re-serialized.
    pub fn set_value(&mut self, value: serde_json::Value) {
        *self = Self::new(value);
    }
}

impl SectionCodec for Mod0Section {
    const TAG: u32 = 0x3044_4F4D;
    const NAME: &'static str = "MOD0";
    const FAMILY: Family = Family::Toc;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::malformed(Self::TAG, format!("payload is not UTF-8: {}", e)))?;
        let value = serde_json::from_str(text)
            .map_err(|e| Error::malformed(Self::TAG, format!("payload is not JSON: {}", e)))?;
        Ok(Self {
            raw: data.to_vec(),
            value,
        })
    }

    fn encode(&self) -> Vec<u8> {
        self.raw.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_entry() {
        let entry = ArchiveEntry::new(2, 0b101, "d/archive_01.tar").unwrap();
        assert_eq!(entry.name(), Some("d/archive_01.tar"));
        assert_eq!(entry.as_bytes().len(), 72);
        assert!(ArchiveEntry::new(0, 0, &"x".repeat(65)).is_none());
        assert!(ArchiveEntry::new(0, 0, &"x".repeat(64)).is_some());
    }

    #[test]
    fn test_archives_round_trip() {
        let section = ArchivesSection {
            archives: vec![
                ArchiveEntry::new(0, 1, "g/toc_a").unwrap(),
                ArchiveEntry::new(1, 3, "g/toc_b").unwrap(),
            ],
            tail: Vec::new(),
        };
        let bytes = section.encode();
        assert_eq!(bytes.len(), 144);
        assert_eq!(&bytes[72..76], &1u32.to_le_bytes());

        let decoded = ArchivesSection::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(decoded, section);
        assert_eq!(decoded.archives[1].name(), Some("g/toc_b"));
    }

    #[test]
    fn test_mod0_is_verbatim() {
        // Unusual whitespace must survive the round trip.
        let data = b"{ \"version\" :  3,\n  \"name\": \"mod\" }";
        let section = Mod0Section::decode(data, &DecodeContext::default()).unwrap();
        assert_eq!(section.value()["version"], 3);
        assert_eq!(section.encode(), data.to_vec());
    }

    #[test]
    fn test_mod0_rejects_garbage() {
        let err = Mod0Section::decode(b"{not json", &DecodeContext::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedSection { tag: 0x3044_4F4D, .. }));
    }

    #[test]
    fn test_mod0_set_value() {
        let mut section = Mod0Section::new(serde_json::json!({ "a": 1 }));
        section.set_value(serde_json::json!({ "b": [1, 2] }));
        assert_eq!(section.raw(), br#"{"b":[1,2]}"#);
    }
}
