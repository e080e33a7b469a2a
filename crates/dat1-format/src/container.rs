//! The DAT1 container: header, section table, shared string blob, sections.

use std::ops::Range;

use dat1_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::audit::{self, HashMismatch};
use crate::codec::{DecodeContext, Revision};
use crate::registry;
use crate::sections::{Section, TypedSection};
use crate::strings::StringTable;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct Dat1Header {
    magic: u32,
    asset_type: u32,
    total_size: u32,
    section_count: u16,
    unknown: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct SectionHeader {
    tag: u32,
    offset: u32,
    size: u32,
}

impl SectionHeader {
    fn span(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.size as usize
    }
}

/// Byte placement of a parsed container.
///
/// Encoding reuses it while the section tags, payload sizes and blob length
/// still match what was read, so payload order, padding and bytes outside
/// any section survive a round trip.
#[derive(Debug, Clone, PartialEq)]
struct SourceLayout {
    len: usize,
    total_size: u32,
    blob_len: usize,
    table: Vec<SectionHeader>,
    /// Bytes not covered by the header, table, blob or any payload.
    gaps: Vec<(usize, Vec<u8>)>,
}

impl SourceLayout {
    fn capture(data: &[u8], total_size: u32, table: Vec<SectionHeader>, blob: Range<usize>) -> Self {
        let mut spans: Vec<(usize, usize)> = table
            .iter()
            .map(|entry| (entry.span().start, entry.span().end))
            .collect();
        spans.push((0, blob.end));
        spans.sort_unstable();

        let mut gaps = Vec::new();
        let mut covered = 0;
        for (start, end) in spans {
            if start > covered {
                gaps.push((covered, data[covered..start].to_vec()));
            }
            covered = covered.max(end);
        }
        if covered < data.len() {
            gaps.push((covered, data[covered..].to_vec()));
        }

        Self {
            len: data.len(),
            total_size,
            blob_len: blob.len(),
            table,
            gaps,
        }
    }

    fn fits(&self, sections: &[Section], payloads: &[Vec<u8>], strings: &StringTable) -> bool {
        strings.len() == self.blob_len
            && sections.len() == self.table.len()
            && self
                .table
                .iter()
                .zip(sections.iter().zip(payloads))
                .all(|(entry, (section, payload))| {
                    entry.tag == section.tag() && entry.size as usize == payload.len()
                })
    }
}

/// A decoded DAT1 container.
///
/// Owns its sections (in table order) and the string blob they address.
/// Sections are looked up by tag; the first section with a tag wins. A parsed
/// container also remembers where its bytes were placed, see
/// [`to_bytes`](Self::to_bytes).
///
/// # Example
///
/// ```no_run
/// use dat1_format::{Dat1, sections::JointsSection};
///
/// let data = std::fs::read("model.bin")?;
/// let dat1 = Dat1::parse(&data)?;
///
/// if let Some(joints) = dat1.get::<JointsSection>() {
///     for joint in &joints.joints {
///         println!("{:?}", dat1.get_string(joint.string_offset as u64));
///     }
/// }
///
/// assert_eq!(dat1.to_bytes(), data);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dat1 {
    asset_type: u32,
    unknown: u16,
    revision: Revision,
    strings: StringTable,
    sections: Vec<Section>,
    layout: Option<SourceLayout>,
}

impl Dat1 {
    /// `"1TAD"` read as a little-endian u32.
    pub const MAGIC: u32 = 0x4441_5431;

    /// Section payloads start on this boundary.
    pub const ALIGNMENT: usize = 16;

    const HEADER_SIZE: usize = 16;
    const TABLE_ENTRY_SIZE: usize = 12;

    /// Create an empty container.
    pub fn new(asset_type: u32, strings: StringTable) -> Self {
        Self {
            asset_type,
            unknown: 0,
            revision: Revision::from_asset_type(asset_type),
            strings,
            sections: Vec::new(),
            layout: None,
        }
    }

    /// Use a specific format revision for sections added later.
    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    /// Check whether data starts with the DAT1 magic.
    pub fn is_dat1(data: &[u8]) -> bool {
        data.len() >= 4 && data[..4] == Self::MAGIC.to_le_bytes()
    }

    /// Parse a container, picking the revision from its asset type.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_inner(data, None)
    }

    /// Parse a container with an explicit format revision.
    pub fn parse_with(data: &[u8], revision: Revision) -> Result<Self> {
        Self::parse_inner(data, Some(revision))
    }

    fn parse_inner(data: &[u8], revision: Option<Revision>) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let header: Dat1Header = reader.read_struct()?;
        if header.magic != Self::MAGIC {
            return Err(Error::InvalidMagic {
                expected: Self::MAGIC,
                actual: header.magic,
            });
        }

        let table = reader.read_array::<SectionHeader>(header.section_count as usize)?;
        let table_end = reader.position();

        for entry in &table {
            let span = entry.span();
            if span.start < table_end || span.end > data.len() {
                return Err(Error::SectionOutOfBounds {
                    tag: entry.tag,
                    offset: entry.offset,
                    size: entry.size,
                    len: data.len(),
                });
            }
        }

        if header.total_size as usize != data.len() {
            tracing::debug!(
                "DAT1 size field {} differs from buffer length {}",
                header.total_size,
                data.len()
            );
        }

        let blob_end = table
            .iter()
            .map(|entry| entry.offset as usize)
            .min()
            .unwrap_or(data.len());
        let strings = StringTable::new(reader.slice(table_end, blob_end)?.to_vec());

        let revision = revision.unwrap_or_else(|| Revision::from_asset_type(header.asset_type));
        let ctx = DecodeContext::new(revision);

        let sections = table
            .iter()
            .map(|entry| registry::decode_section(entry.tag, &data[entry.span()], &ctx))
            .collect();

        let dat1 = Self {
            asset_type: header.asset_type,
            unknown: header.unknown,
            revision,
            strings,
            sections,
            layout: Some(SourceLayout::capture(
                data,
                header.total_size,
                table,
                table_end..blob_end,
            )),
        };

        for mismatch in dat1.audit() {
            tracing::warn!("{}", mismatch);
        }

        Ok(dat1)
    }

    /// Encode the container.
    ///
    /// A parsed container whose section tags, payload sizes and string blob
    /// length are unchanged is written back into its original layout, so the
    /// result matches the input byte for byte. Anything else, including a
    /// container built with [`new`](Self::new), gets the canonical layout:
    /// the blob directly after the table, then each section in table order
    /// on a 16-byte boundary, with offsets, sizes, the section count and the
    /// total size recomputed.
    pub fn to_bytes(&self) -> Vec<u8> {
        let payloads: Vec<Vec<u8>> = self.sections.iter().map(Section::encode).collect();
        match &self.layout {
            Some(layout) if layout.fits(&self.sections, &payloads, &self.strings) => {
                self.encode_in_place(layout, &payloads)
            }
            _ => self.encode_canonical(&payloads),
        }
    }

    fn header(&self, total_size: u32) -> Dat1Header {
        Dat1Header {
            magic: Self::MAGIC,
            asset_type: self.asset_type,
            total_size,
            section_count: self.sections.len() as u16,
            unknown: self.unknown,
        }
    }

    fn encode_in_place(&self, layout: &SourceLayout, payloads: &[Vec<u8>]) -> Vec<u8> {
        let table_end = Self::HEADER_SIZE + layout.table.len() * Self::TABLE_ENTRY_SIZE;

        let mut out = vec![0u8; layout.len];
        out[..Self::HEADER_SIZE].copy_from_slice(self.header(layout.total_size).as_bytes());
        out[Self::HEADER_SIZE..table_end].copy_from_slice(layout.table.as_slice().as_bytes());
        out[table_end..table_end + layout.blob_len].copy_from_slice(self.strings.as_bytes());
        for (entry, payload) in layout.table.iter().zip(payloads) {
            out[entry.span()].copy_from_slice(payload);
        }
        for (offset, bytes) in &layout.gaps {
            out[*offset..offset + bytes.len()].copy_from_slice(bytes);
        }
        out
    }

    fn encode_canonical(&self, payloads: &[Vec<u8>]) -> Vec<u8> {
        let table_end = Self::HEADER_SIZE + self.sections.len() * Self::TABLE_ENTRY_SIZE;
        let mut cursor = table_end + self.strings.len();
        let mut table = Vec::with_capacity(self.sections.len());
        for (section, payload) in self.sections.iter().zip(payloads) {
            cursor = align(cursor, Self::ALIGNMENT);
            table.push(SectionHeader {
                tag: section.tag(),
                offset: cursor as u32,
                size: payload.len() as u32,
            });
            cursor += payload.len();
        }

        let mut out = Vec::with_capacity(cursor);
        out.extend_from_slice(self.header(cursor as u32).as_bytes());
        out.extend_from_slice(table.as_slice().as_bytes());
        out.extend_from_slice(self.strings.as_bytes());
        for (entry, payload) in table.iter().zip(payloads) {
            out.resize(entry.offset as usize, 0);
            out.extend_from_slice(payload);
        }
        out
    }

    /// Asset type magic from the header.
    pub fn asset_type(&self) -> u32 {
        self.asset_type
    }

    /// Revision the sections were decoded with.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// The shared string blob.
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Mutable access to the string blob, for explicit edits before encoding.
    pub fn strings_mut(&mut self) -> &mut StringTable {
        &mut self.strings
    }

    /// Resolve a string offset; absent when out of range.
    pub fn get_string(&self, offset: u64) -> Option<&str> {
        self.strings.get(offset)
    }

    /// All sections in table order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Append a section.
    pub fn push(&mut self, section: impl Into<Section>) {
        self.sections.push(section.into());
    }

    /// Whether a section with the tag exists.
    pub fn contains(&self, tag: u32) -> bool {
        self.section(tag).is_some()
    }

    /// The first section with a tag.
    pub fn section(&self, tag: u32) -> Option<&Section> {
        self.sections.iter().find(|s| s.tag() == tag)
    }

    /// Mutable access to the first section with a tag.
    pub fn section_mut(&mut self, tag: u32) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.tag() == tag)
    }

    /// The first section of a codec type.
    ///
    /// Returns `None` when the tag is absent or its data fell back to raw.
    pub fn get<T: TypedSection>(&self) -> Option<&T> {
        self.section(T::TAG).and_then(T::from_section)
    }

    /// Mutable access to the first section of a codec type.
    pub fn get_mut<T: TypedSection>(&mut self) -> Option<&mut T> {
        self.section_mut(T::TAG).and_then(T::from_section_mut)
    }

    /// Recheck every stored name hash.
    pub fn audit(&self) -> Vec<HashMismatch> {
        self.sections
            .iter()
            .flat_map(|section| audit::audit_section(section, &self.strings))
            .collect()
    }
}

fn align(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}
