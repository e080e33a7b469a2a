//! Skeleton joints.

use dat1_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::codec::{put_records, DecodeContext, Family, SectionCodec};
use crate::Result;

/// A 16-byte joint record.
///
/// `hash` is the case-preserving CRC-32 of the joint name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Joint {
    /// Parent joint index, -1 for a root.
    pub parent: i16,
    pub index: u16,
    /// Looks like the number of descendants (direct and indirect).
    pub children_hint: u16,
    /// Unclassified bits, possibly a joint type.
    pub flags: u16,
    pub hash: u32,
    pub string_offset: u32,
}

impl Joint {
    /// The parent index, or `None` for a root joint.
    pub fn parent_index(&self) -> Option<usize> {
        usize::try_from(self.parent).ok()
    }
}

/// Joint definitions forming a tree through `parent` indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JointsSection {
    pub joints: Vec<Joint>,
    pub tail: Vec<u8>,
}

impl JointsSection {
    /// Indices of all root joints.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.joints
            .iter()
            .enumerate()
            .filter(|(_, j)| j.parent < 0)
            .map(|(i, _)| i)
    }

    /// Indices of the direct children of a joint.
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.joints
            .iter()
            .enumerate()
            .filter(move |(_, j)| j.parent_index() == Some(index))
            .map(|(i, _)| i)
    }

    /// Distance from a joint to its root, or `None` if the parent chain
    /// leaves the table or loops.
    pub fn depth(&self, index: usize) -> Option<usize> {
        let mut depth = 0;
        let mut current = self.joints.get(index)?;
        while let Some(parent) = current.parent_index() {
            depth += 1;
            if depth > self.joints.len() {
                return None;
            }
            current = self.joints.get(parent)?;
        }
        Some(depth)
    }
}

impl SectionCodec for JointsSection {
    const TAG: u32 = 0x15DF_9D3B;
    const NAME: &'static str = "Model Joint";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let joints = reader.read_remaining_array::<Joint>()?;
        Ok(Self {
            joints,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.joints.len() * 16 + self.tail.len());
        put_records(&mut out, &self.joints);
        out.extend_from_slice(&self.tail);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joint(parent: i16, index: u16) -> Joint {
        Joint {
            parent,
            index,
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_record_layout() {
        let mut data = Vec::new();
        data.extend_from_slice(&(-1i16).to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&5u16.to_le_bytes());
        data.extend_from_slice(&0x20u16.to_le_bytes());
        data.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        data.extend_from_slice(&12u32.to_le_bytes());

        let section = JointsSection::decode(&data, &DecodeContext::default()).unwrap();
        let root = section.joints[0];
        assert_eq!(root.parent, -1);
        assert_eq!(root.parent_index(), None);
        assert_eq!(root.children_hint, 5);
        assert_eq!(root.flags, 0x20);
        assert_eq!(root.hash, 0xDEADBEEF);
        assert_eq!(root.string_offset, 12);
        assert_eq!(section.encode(), data);
    }

    #[test]
    fn test_round_trip_with_partial_record() {
        let section = JointsSection {
            joints: vec![joint(-1, 0), joint(0, 1)],
            tail: vec![1, 2, 3, 4, 5],
        };
        let bytes = section.encode();
        assert_eq!(bytes.len(), 37);

        let decoded = JointsSection::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(decoded, section);
        assert_eq!(decoded.encode(), bytes);
    }

    #[test]
    fn test_hierarchy() {
        let section = JointsSection {
            joints: vec![joint(-1, 0), joint(0, 1), joint(1, 2), joint(0, 3)],
            tail: Vec::new(),
        };
        assert_eq!(section.roots().collect::<Vec<_>>(), vec![0]);
        assert_eq!(section.children(0).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(section.depth(2), Some(2));
        assert_eq!(section.depth(9), None);
    }

    #[test]
    fn test_depth_detects_cycles() {
        let section = JointsSection {
            joints: vec![joint(1, 0), joint(0, 1)],
            tail: Vec::new(),
        };
        assert_eq!(section.depth(0), None);
    }
}
