//! Vertex, index and UV buffers.

use dat1_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::codec::{put_records, DecodeContext, Family, SectionCodec};
use crate::Result;

/// A 16-byte packed vertex.
///
/// Positions and texture coordinates are fixed point; exporters scale them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Vertex {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    /// Unused position lane.
    pub w: i16,
    /// Packed normal.
    pub normal: u32,
    pub u: i16,
    pub v: i16,
}

/// The model vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexSection {
    pub vertices: Vec<Vertex>,
    pub tail: Vec<u8>,
}

impl SectionCodec for VertexSection {
    const TAG: u32 = 0xA98B_E69B;
    const NAME: &'static str = "Model Vertex";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let vertices = reader.read_remaining_array::<Vertex>()?;
        Ok(Self {
            vertices,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.vertices.len() * 16 + self.tail.len());
        put_records(&mut out, &self.vertices);
        out.extend_from_slice(&self.tail);
        out
    }
}

/// The model index buffer: `u16` vertex indices, three per triangle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexSection {
    pub indices: Vec<u16>,
    pub tail: Vec<u8>,
}

impl SectionCodec for IndexSection {
    const TAG: u32 = 0x0859_863D;
    const NAME: &'static str = "Model Index";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let indices = reader.read_remaining_array::<u16>()?;
        Ok(Self {
            indices,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.indices.len() * 2 + self.tail.len());
        put_records(&mut out, &self.indices);
        out.extend_from_slice(&self.tail);
        out
    }
}

/// A fixed-point texture coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct UvPair {
    pub u: i16,
    pub v: i16,
}

/// Per-vertex texture coordinates that replace the ones in the vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UvOverrideSection {
    pub uvs: Vec<UvPair>,
    pub tail: Vec<u8>,
}

impl UvOverrideSection {
    /// The override for a vertex buffer index.
    pub fn get(&self, vertex: usize) -> Option<UvPair> {
        self.uvs.get(vertex).copied()
    }
}

impl SectionCodec for UvOverrideSection {
    const TAG: u32 = 0x16F3_BA18;
    const NAME: &'static str = "Model UV Override";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], _ctx: &DecodeContext) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let uvs = reader.read_remaining_array::<UvPair>()?;
        Ok(Self {
            uvs,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.uvs.len() * 4 + self.tail.len());
        put_records(&mut out, &self.uvs);
        out.extend_from_slice(&self.tail);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        let mut data = Vec::new();
        for v in [100i16, -200, 300, 0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&0x7F7F_7F7Fu32.to_le_bytes());
        data.extend_from_slice(&8192i16.to_le_bytes());
        data.extend_from_slice(&16384i16.to_le_bytes());

        let section = VertexSection::decode(&data, &DecodeContext::default()).unwrap();
        assert_eq!(
            section.vertices,
            vec![Vertex {
                x: 100,
                y: -200,
                z: 300,
                w: 0,
                normal: 0x7F7F_7F7F,
                u: 8192,
                v: 16384,
            }]
        );
        assert_eq!(section.encode(), data);
    }

    #[test]
    fn test_indices_with_odd_byte() {
        let data = [0, 0, 1, 0, 2, 0, 0xAB];
        let section = IndexSection::decode(&data, &DecodeContext::default()).unwrap();
        assert_eq!(section.indices, vec![0, 1, 2]);
        assert_eq!(section.tail, vec![0xAB]);
        assert_eq!(section.encode(), data);
    }

    #[test]
    fn test_uv_override_lookup() {
        let section = UvOverrideSection {
            uvs: vec![UvPair { u: 1, v: 2 }, UvPair { u: 3, v: 4 }],
            tail: Vec::new(),
        };
        let decoded = UvOverrideSection::decode(&section.encode(), &DecodeContext::default()).unwrap();
        assert_eq!(decoded.get(1), Some(UvPair { u: 3, v: 4 }));
        assert_eq!(decoded.get(2), None);
    }
}
