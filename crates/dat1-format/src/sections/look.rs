//! Looks: per-appearance tables of visible mesh ranges by level of detail.

use std::ops::Range;

use dat1_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::codec::{put_records, DecodeContext, Family, SectionCodec};
use crate::Result;

/// Number of LOD slots in every look.
pub const LODS_PER_LOOK: usize = 8;

/// A contiguous range of mesh indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct LookLod {
    pub start: u16,
    pub count: u16,
}

impl LookLod {
    /// The mesh indices this LOD shows.
    pub fn meshes(&self) -> Range<usize> {
        let start = self.start as usize;
        start..start + self.count as usize
    }
}

/// One look (skin or appearance variant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Look {
    pub lods: [LookLod; LODS_PER_LOOK],
}

/// The model look table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LookSection {
    pub looks: Vec<Look>,
    pub tail: Vec<u8>,
}

impl LookSection {
    /// The LOD entry of a look, if both indices exist.
    pub fn lod(&self, look: usize, lod: usize) -> Option<LookLod> {
        self.looks.get(look)?.lods.get(lod).copied()
    }
}

impl SectionCodec for LookSection {
    const TAG: u32 = 0x06EB_7EFC;
    const NAME: &'static str = "Model Look";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let looks = reader.read_remaining_array::<Look>()?;
        Ok(Self {
            looks,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.looks.len() * 32 + self.tail.len());
        put_records(&mut out, &self.looks);
        out.extend_from_slice(&self.tail);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_layout() {
        let mut look = Look::default();
        look.lods[0] = LookLod { start: 0, count: 3 };
        look.lods[1] = LookLod { start: 3, count: 1 };
        let section = LookSection {
            looks: vec![look],
            tail: Vec::new(),
        };

        let bytes = section.encode();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[4..8], &[3, 0, 1, 0]);

        let decoded = LookSection::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(decoded.lod(0, 0).unwrap().meshes(), 0..3);
        assert_eq!(decoded.lod(0, 1).unwrap().meshes(), 3..4);
        assert_eq!(decoded.lod(0, LODS_PER_LOOK), None);
        assert_eq!(decoded.lod(1, 0), None);
    }
}
