//! Locators: named attachment points with an optional joint binding.

use dat1_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::codec::{put_records, DecodeContext, Family, SectionCodec};
use crate::{Error, Result};

/// A 64-byte locator record.
#[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Locator {
    /// Case-preserving CRC-32 of the locator name.
    pub hash: u32,
    pub string_offset: u32,
    /// Joint index, -1 when unattached.
    pub joint: i32,
    /// Always zero in observed data.
    pub reserved: u32,
    /// 4x3 row-major affine transform: three basis rows, then translation.
    pub transform: [[f32; 3]; 4],
}

impl Locator {
    /// The joint this locator is attached to, if any.
    pub fn joint_index(&self) -> Option<usize> {
        usize::try_from(self.joint).ok()
    }

    /// Rotation/scale rows of the transform.
    pub fn basis(&self) -> [[f32; 3]; 3] {
        [self.transform[0], self.transform[1], self.transform[2]]
    }

    /// Translation row of the transform.
    pub fn translation(&self) -> [f32; 3] {
        self.transform[3]
    }

    /// Apply the transform to a point (row vector convention).
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let m = &self.transform;
        let mut out = m[3];
        for (axis, row) in m.iter().take(3).enumerate() {
            for (o, r) in out.iter_mut().zip(row) {
                *o += p[axis] * r;
            }
        }
        out
    }
}

/// Locator definitions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocatorsSection {
    pub locators: Vec<Locator>,
    pub tail: Vec<u8>,
}

impl SectionCodec for LocatorsSection {
    const TAG: u32 = 0x9F61_4FAB;
    const NAME: &'static str = "Model Locator";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let locators = reader.read_remaining_array::<Locator>()?;
        Ok(Self {
            locators,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.locators.len() * 64 + self.tail.len());
        put_records(&mut out, &self.locators);
        out.extend_from_slice(&self.tail);
        out
    }
}

/// Header of the locator info section. The first field is the total section
/// size and is recomputed on encode.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct LocatorInfoHeader {
    size: u32,
    a: u32,
    b: u32,
    c: u32,
}

/// Pairs accompanying the locator table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocatorInfoSection {
    /// Always 32 in observed data.
    pub a: u32,
    /// Small value.
    pub b: u32,
    /// Small value, roughly twice `b`.
    pub c: u32,
    pub pairs: Vec<[u32; 2]>,
    pub tail: Vec<u8>,
}

impl LocatorInfoSection {
    const HEADER_SIZE: usize = 16;

    /// The size field this section encodes with.
    pub fn size(&self) -> u32 {
        (Self::HEADER_SIZE + self.pairs.len() * 8 + self.tail.len()) as u32
    }
}

impl SectionCodec for LocatorInfoSection {
    const TAG: u32 = 0x9A43_4B29;
    const NAME: &'static str = "Model Locator Info";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        if data.len() < Self::HEADER_SIZE {
            return Err(Error::malformed(
                Self::TAG,
                format!("{} bytes is shorter than the 16-byte header", data.len()),
            ));
        }

        let mut reader = BinaryReader::new(data);
        let header: LocatorInfoHeader = reader.read_struct()?;
        let pairs = reader.read_remaining_array::<[u32; 2]>()?;

        Ok(Self {
            a: header.a,
            b: header.b,
            c: header.c,
            pairs,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let header = LocatorInfoHeader {
            size: self.size(),
            a: self.a,
            b: self.b,
            c: self.c,
        };
        let mut out = Vec::with_capacity(self.size() as usize);
        out.extend_from_slice(header.as_bytes());
        put_records(&mut out, &self.pairs);
        out.extend_from_slice(&self.tail);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_at(t: [f32; 3]) -> [[f32; 3]; 4] {
        [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], t]
    }

    #[test]
    fn test_locator_round_trip() {
        let section = LocatorsSection {
            locators: vec![
                Locator {
                    hash: 0x1234_5678,
                    string_offset: 4,
                    joint: -1,
                    reserved: 0,
                    transform: identity_at([1.0, 2.0, 3.0]),
                },
                Locator {
                    hash: 0x8765_4321,
                    string_offset: 9,
                    joint: 3,
                    reserved: 0,
                    transform: identity_at([0.0, 0.0, 0.0]),
                },
            ],
            tail: Vec::new(),
        };
        let bytes = section.encode();
        assert_eq!(bytes.len(), 128);

        let decoded = LocatorsSection::decode(&bytes, &DecodeContext::default()).unwrap();
        assert_eq!(decoded, section);
        assert_eq!(decoded.locators[0].joint_index(), None);
        assert_eq!(decoded.locators[1].joint_index(), Some(3));
        assert_eq!(decoded.locators[0].translation(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_transform_point() {
        let mut locator = Locator {
            transform: identity_at([10.0, 0.0, -1.0]),
            ..Default::default()
        };
        assert_eq!(locator.transform_point([1.0, 2.0, 3.0]), [11.0, 2.0, 2.0]);

        locator.transform[0] = [2.0, 0.0, 0.0];
        assert_eq!(locator.transform_point([1.0, 0.0, 0.0]), [12.0, 0.0, -1.0]);
        assert_eq!(locator.basis()[0], [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_info_recomputes_size() {
        let mut data = Vec::new();
        for v in [999u32, 32, 3, 6, 1, 2, 3, 4] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        let section = LocatorInfoSection::decode(&data, &DecodeContext::default()).unwrap();
        assert_eq!(section.pairs, vec![[1, 2], [3, 4]]);
        assert_eq!(section.size(), 32);

        let encoded = section.encode();
        assert_eq!(&encoded[..4], &32u32.to_le_bytes());
        assert_eq!(&encoded[4..], &data[4..]);

        // A consistent size field round-trips byte for byte.
        assert_eq!(
            LocatorInfoSection::decode(&encoded, &DecodeContext::default())
                .unwrap()
                .encode(),
            encoded
        );
    }

    #[test]
    fn test_info_too_short() {
        let err = LocatorInfoSection::decode(&[0u8; 12], &DecodeContext::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedSection { tag: 0x9A43_4B29, .. }));
    }
}
