//! Model sections whose meaning is only partially understood.
//!
//! Field names here are hypotheses. Every byte is preserved so a later
//! reinterpretation does not change the encoded output.

use dat1_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::codec::{put_records, DecodeContext, Family, SectionCodec};
use crate::{Error, Result};

/// Ambient shadow primitives: 48-byte records of twelve words.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShadowPrimsSection {
    pub prims: Vec<[u32; 12]>,
    pub tail: Vec<u8>,
}

impl SectionCodec for ShadowPrimsSection {
    const TAG: u32 = 0x7CA3_7DA0;
    const NAME: &'static str = "Ambient Shadow Prims";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let prims = reader.read_remaining_array::<[u32; 12]>()?;
        Ok(Self {
            prims,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.prims.len() * 48 + self.tail.len());
        put_records(&mut out, &self.prims);
        out.extend_from_slice(&self.tail);
        out
    }
}

/// Four-word header shared by the counted record sections.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct QuadHeader {
    w0: u32,
    w1: u32,
    w2: u32,
    w3: u32,
}

/// A record of [`QuintuplesSection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Quintuple {
    pub values: [u32; 4],
    /// Offset-like: small, grows in power-of-two steps (64, 128, 512 seen).
    pub offset: u32,
}

/// Counted 20-byte records after a four-word header whose first word is the
/// record count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuintuplesSection {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub records: Vec<Quintuple>,
    pub tail: Vec<u8>,
}

impl SectionCodec for QuintuplesSection {
    const TAG: u32 = 0x0AD3_A708;
    const NAME: &'static str = "Model Quintuples";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        if data.len() < 16 {
            return Err(Error::malformed(
                Self::TAG,
                format!("{} bytes is shorter than the 16-byte header", data.len()),
            ));
        }

        let mut reader = BinaryReader::new(data);
        let header: QuadHeader = reader.read_struct()?;
        let records = reader
            .read_array::<Quintuple>(header.w0 as usize)
            .map_err(|e| {
                Error::malformed(Self::TAG, format!("count {} overruns section: {}", header.w0, e))
            })?;

        Ok(Self {
            a: header.w1,
            b: header.w2,
            c: header.w3,
            records,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let header = QuadHeader {
            w0: self.records.len() as u32,
            w1: self.a,
            w2: self.b,
            w3: self.c,
        };
        let mut out = Vec::with_capacity(16 + self.records.len() * 20 + self.tail.len());
        out.extend_from_slice(header.as_bytes());
        put_records(&mut out, &self.records);
        out.extend_from_slice(&self.tail);
        out
    }
}

/// A record of [`SkinBatchSection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct SkinBatch {
    /// Offset or hash.
    pub offset: u32,
    pub unknown: u32,
    pub unknown2: u16,
    pub uncompressed_size: u16,
    pub compressed_size: u16,
    pub compressed_offset: u16,
}

/// Skin batches: a four-word header followed by 16-byte records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkinBatchSection {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    /// Length-like; kept as stored since what it measures is unknown.
    pub data_len: u32,
    pub batches: Vec<SkinBatch>,
    pub tail: Vec<u8>,
}

impl SectionCodec for SkinBatchSection {
    const TAG: u32 = 0xC61B_1FF5;
    const NAME: &'static str = "Model Skin Batch";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        if data.len() < 16 {
            return Err(Error::malformed(
                Self::TAG,
                format!("{} bytes is shorter than the 16-byte header", data.len()),
            ));
        }

        let mut reader = BinaryReader::new(data);
        let header: QuadHeader = reader.read_struct()?;
        let batches = reader.read_remaining_array::<SkinBatch>()?;

        Ok(Self {
            a: header.w0,
            b: header.w1,
            c: header.w2,
            data_len: header.w3,
            batches,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let header = QuadHeader {
            w0: self.a,
            w1: self.b,
            w2: self.c,
            w3: self.data_len,
        };
        let mut out = Vec::with_capacity(16 + self.batches.len() * 16 + self.tail.len());
        out.extend_from_slice(header.as_bytes());
        put_records(&mut out, &self.batches);
        out.extend_from_slice(&self.tail);
        out
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct FloatBlockHeader {
    unknown: u32,
    data_len: u32,
    count0: u16,
    count1: u16,
    count2: u32,
}

/// Offset-partitioned block: a float array and a `u16` array split at a byte
/// offset `D` stored in the header.
///
/// ```text
/// [0, 16)      header (D at byte 4)
/// [16, D-4)    f32 values
/// [D-4, D)     count3
/// [D, len)     u16 values (look like UTF-16 text ending in "\n\n")
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FloatBlockSection {
    pub unknown: u32,
    pub count0: u16,
    pub count1: u16,
    pub count2: u32,
    pub count3: u32,
    pub floats: Vec<f32>,
    pub shorts: Vec<u16>,
    /// A trailing odd byte after the `u16` run, if any.
    pub tail: Vec<u8>,
}

impl FloatBlockSection {
    const HEADER_SIZE: usize = 16;

    /// The partition offset `D` this section encodes with.
    pub fn data_len(&self) -> u32 {
        (Self::HEADER_SIZE + self.floats.len() * 4 + 4) as u32
    }
}

impl SectionCodec for FloatBlockSection {
    const TAG: u32 = 0x707F_1B58;
    const NAME: &'static str = "Model Float Block";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        if data.len() < Self::HEADER_SIZE {
            return Err(Error::malformed(
                Self::TAG,
                format!("{} bytes is shorter than the 16-byte header", data.len()),
            ));
        }

        let mut reader = BinaryReader::new(data);
        let header: FloatBlockHeader = reader.read_struct()?;

        let split = header.data_len as usize;
        if split < Self::HEADER_SIZE + 4 || split > data.len() || (split - Self::HEADER_SIZE) % 4 != 0 {
            return Err(Error::malformed(
                Self::TAG,
                format!("partition offset {} invalid for {} bytes", split, data.len()),
            ));
        }

        let float_count = (split - Self::HEADER_SIZE - 4) / 4;
        let floats = reader.read_array::<f32>(float_count)?;
        let count3 = reader.read_u32()?;
        let shorts = reader.read_remaining_array::<u16>()?;

        Ok(Self {
            unknown: header.unknown,
            count0: header.count0,
            count1: header.count1,
            count2: header.count2,
            count3,
            floats,
            shorts,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let header = FloatBlockHeader {
            unknown: self.unknown,
            data_len: self.data_len(),
            count0: self.count0,
            count1: self.count1,
            count2: self.count2,
        };
        let mut out = Vec::with_capacity(self.data_len() as usize + self.shorts.len() * 2);
        out.extend_from_slice(header.as_bytes());
        put_records(&mut out, &self.floats);
        out.extend_from_slice(&self.count3.to_le_bytes());
        put_records(&mut out, &self.shorts);
        out.extend_from_slice(&self.tail);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> DecodeContext {
        DecodeContext::default()
    }

    #[test]
    fn test_shadow_prims_round_trip() {
        let mut data: Vec<u8> = (0..96).collect();
        data.push(0xFF);
        let section = ShadowPrimsSection::decode(&data, &ctx()).unwrap();
        assert_eq!(section.prims.len(), 2);
        assert_eq!(section.tail, vec![0xFF]);
        assert_eq!(section.encode(), data);
    }

    #[test]
    fn test_quintuples_honor_count() {
        let section = QuintuplesSection {
            a: 1,
            b: 2,
            c: 3,
            records: vec![
                Quintuple {
                    values: [1, 2, 3, 4],
                    offset: 64,
                },
                Quintuple {
                    values: [5, 6, 7, 8],
                    offset: 128,
                },
            ],
            tail: vec![0; 8],
        };
        let bytes = section.encode();
        assert_eq!(&bytes[..4], &2u32.to_le_bytes());
        assert_eq!(bytes.len(), 16 + 40 + 8);

        let decoded = QuintuplesSection::decode(&bytes, &ctx()).unwrap();
        assert_eq!(decoded, section);
        assert_eq!(decoded.encode(), bytes);
    }

    #[test]
    fn test_quintuples_count_overrun() {
        let mut bytes = vec![0u8; 36];
        bytes[..4].copy_from_slice(&2u32.to_le_bytes());
        let err = QuintuplesSection::decode(&bytes, &ctx()).unwrap_err();
        assert!(matches!(err, Error::MalformedSection { tag: 0x0AD3_A708, .. }));
    }

    #[test]
    fn test_skin_batch_round_trip() {
        let mut data = Vec::new();
        for v in [1u32, 2, 3, 48] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        for v in [0u16, 512, 256, 32] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        let section = SkinBatchSection::decode(&data, &ctx()).unwrap();
        assert_eq!(section.data_len, 48);
        assert_eq!(section.batches[0].offset, 100);
        assert_eq!(section.batches[0].compressed_size, 256);
        assert_eq!(section.encode(), data);
    }

    fn float_block_bytes(floats: &[f32], count3: u32, shorts: &[u16]) -> Vec<u8> {
        let split = 16 + floats.len() * 4 + 4;
        let mut data = Vec::new();
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&(split as u32).to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&3u32.to_le_bytes());
        for f in floats {
            data.extend_from_slice(&f.to_le_bytes());
        }
        data.extend_from_slice(&count3.to_le_bytes());
        for s in shorts {
            data.extend_from_slice(&s.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_float_block_partition() {
        let data = float_block_bytes(&[1.0, 0.5, -2.0], 42, &[0x41, 0x0A, 0x0A]);
        let section = FloatBlockSection::decode(&data, &ctx()).unwrap();

        assert_eq!(section.floats, vec![1.0, 0.5, -2.0]);
        assert_eq!(section.count3, 42);
        assert_eq!(section.shorts, vec![0x41, 0x0A, 0x0A]);
        assert_eq!(section.data_len(), 32);
        assert_eq!(section.encode(), data);
    }

    #[test]
    fn test_float_block_recomputes_split() {
        let data = float_block_bytes(&[1.0], 0, &[]);
        let mut section = FloatBlockSection::decode(&data, &ctx()).unwrap();
        section.floats.push(2.0);

        let encoded = section.encode();
        assert_eq!(&encoded[4..8], &28u32.to_le_bytes());
        assert_eq!(FloatBlockSection::decode(&encoded, &ctx()).unwrap(), section);
    }

    #[test]
    fn test_float_block_bad_split() {
        let mut data = float_block_bytes(&[1.0], 0, &[]);
        data[4..8].copy_from_slice(&400u32.to_le_bytes());
        assert!(FloatBlockSection::decode(&data, &ctx()).is_err());

        data[4..8].copy_from_slice(&12u32.to_le_bytes());
        assert!(FloatBlockSection::decode(&data, &ctx()).is_err());
    }
}
