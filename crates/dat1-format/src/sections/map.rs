//! Name-hash lookup maps (`u32 -> u32` pairs).

use std::ops::{Deref, DerefMut};

use dat1_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::codec::{put_records, DecodeContext, Family, SectionCodec};
use crate::Result;

/// One key/value pair of a lookup map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct MapEntry {
    pub key: u32,
    pub value: u32,
}

/// Sequential `u32 -> u32` pairs in original order.
///
/// Duplicate keys are kept as stored; lookups return the last match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UintMap {
    pub entries: Vec<MapEntry>,
    /// Bytes after the last whole pair.
    pub tail: Vec<u8>,
}

impl UintMap {
    /// Decode pairs until fewer than eight bytes remain.
    pub fn read(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let entries = reader.read_remaining_array::<MapEntry>()?;
        Ok(Self {
            entries,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    /// Encode the pairs followed by the preserved tail.
    pub fn write(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.entries.len() * 8 + self.tail.len());
        put_records(&mut out, &self.entries);
        out.extend_from_slice(&self.tail);
        out
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no pairs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the value stored for a key.
    pub fn get(&self, key: u32) -> Option<u32> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.key == key)
            .map(|e| e.value)
    }
}

macro_rules! map_section {
    ($(#[$meta:meta])* $name:ident, $tag:expr, $label:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Default)]
        pub struct $name(pub UintMap);

        impl SectionCodec for $name {
            const TAG: u32 = $tag;
            const NAME: &'static str = $label;
            const FAMILY: Family = Family::Model;

            fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
                UintMap::read(data).map(Self)
            }

            fn encode(&self) -> Vec<u8> {
                self.0.write()
            }
        }

        impl Deref for $name {
            type Target = UintMap;

            fn deref(&self) -> &UintMap {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut UintMap {
                &mut self.0
            }
        }
    };
}

map_section!(
    /// Joint name hash to joint index.
    JointLookupSection,
    0xEE31_971C,
    "Model Joint Lookup"
);

map_section!(
    /// Locator name hash to locator index.
    LocatorLookupSection,
    0x731C_BC2E,
    "Model Locator Lookup"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_and_tail_preserved() {
        let mut data = Vec::new();
        for (k, v) in [(7u32, 1u32), (9, 2), (7, 3)] {
            data.extend_from_slice(&k.to_le_bytes());
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&[0xAA, 0xBB, 0xCC]);

        let section = JointLookupSection::decode(&data, &DecodeContext::default()).unwrap();
        assert_eq!(section.len(), 3);
        assert_eq!(section.entries[2], MapEntry { key: 7, value: 3 });
        assert_eq!(section.get(7), Some(3));
        assert_eq!(section.get(8), None);
        assert_eq!(section.tail, vec![0xAA, 0xBB, 0xCC]);
        assert_eq!(section.encode(), data);
    }

    #[test]
    fn test_empty() {
        let section = LocatorLookupSection::decode(&[], &DecodeContext::default()).unwrap();
        assert!(section.is_empty());
        assert!(section.encode().is_empty());
    }
}
