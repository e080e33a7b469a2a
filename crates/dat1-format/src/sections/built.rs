//! Small model metadata sections kept as plain scalar arrays.

use dat1_common::BinaryReader;

use crate::codec::{DecodeContext, Family, SectionCodec};
use crate::Result;

/// Model build metadata, present in every model (120 bytes).
///
/// Holds what appear to be the bounding box and the global position scale
/// (a value near 0.00024 that integer vertex positions are multiplied by).
/// Until the layout is pinned down it is exposed as `u16` words.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelBuiltSection {
    pub values: Vec<u16>,
    /// A trailing odd byte, if any.
    pub tail: Vec<u8>,
}

impl SectionCodec for ModelBuiltSection {
    const TAG: u32 = 0x283D_0383;
    const NAME: &'static str = "Model Built";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let values = reader.read_remaining_array::<u16>()?;
        Ok(Self {
            values,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.values.len() * 2 + self.tail.len());
        for value in &self.values {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out.extend_from_slice(&self.tail);
        out
    }
}

/// A short byte array present in every model, usually an odd number of
/// bytes long. Meaning unknown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByteValuesSection {
    pub values: Vec<u8>,
}

impl SectionCodec for ByteValuesSection {
    const TAG: u32 = 0x4CCE_A4AD;
    const NAME: &'static str = "Model Byte Values";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        Ok(Self {
            values: data.to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        self.values.clone()
    }
}
