//! Mesh definitions in their per-revision record layouts.

use dat1_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::codec::{put_records, DecodeContext, Family, Revision, SectionCodec};
use crate::Result;

/// MSMR mesh record (64 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct MsmrMeshRecord {
    pub id: u32,
    pub group: u32,
    pub vertex_start: u32,
    pub index_start: u32,
    pub index_count: u32,
    pub vertex_count: u32,
    pub flags: u16,
    pub material_index: u16,
    pub lod: u16,
    pub reserved: u16,
    pub opaque: [u32; 8],
}

/// RCRA mesh record (48 bytes). Ranges moved to the front and the material
/// index now precedes the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct RcraMeshRecord {
    pub vertex_start: u32,
    pub vertex_count: u32,
    pub index_start: u32,
    pub index_count: u32,
    pub material_index: u16,
    pub flags: u16,
    pub id: u32,
    pub opaque: [u32; 6],
}

/// Revision-independent view of one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshDefinition {
    pub id: u32,
    pub vertex_start: u32,
    pub vertex_count: u32,
    pub index_start: u32,
    pub index_count: u32,
    pub material_index: u16,
    pub flags: u16,
}

impl MeshDefinition {
    /// Flag bit: stored indices are already relative to `vertex_start`.
    ///
    /// When clear, indices address the whole vertex buffer and exporters
    /// subtract `vertex_start`. Inferred from exported output, not documented.
    pub const FLAG_LOCAL_INDICES: u16 = 0x10;

    /// Whether indices are stored mesh-local.
    pub fn has_local_indices(&self) -> bool {
        self.flags & Self::FLAG_LOCAL_INDICES != 0
    }
}

impl From<&MsmrMeshRecord> for MeshDefinition {
    fn from(r: &MsmrMeshRecord) -> Self {
        Self {
            id: r.id,
            vertex_start: r.vertex_start,
            vertex_count: r.vertex_count,
            index_start: r.index_start,
            index_count: r.index_count,
            material_index: r.material_index,
            flags: r.flags,
        }
    }
}

impl From<&RcraMeshRecord> for MeshDefinition {
    fn from(r: &RcraMeshRecord) -> Self {
        Self {
            id: r.id,
            vertex_start: r.vertex_start,
            vertex_count: r.vertex_count,
            index_start: r.index_start,
            index_count: r.index_count,
            material_index: r.material_index,
            flags: r.flags,
        }
    }
}

/// Mesh records as stored, in the layout of the revision they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshRecords {
    Msmr(Vec<MsmrMeshRecord>),
    Rcra(Vec<RcraMeshRecord>),
}

impl Default for MeshRecords {
    fn default() -> Self {
        MeshRecords::Msmr(Vec::new())
    }
}

/// The model mesh table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeshSection {
    pub records: MeshRecords,
    pub tail: Vec<u8>,
}

impl MeshSection {
    /// The revision whose layout the records use.
    pub fn revision(&self) -> Revision {
        match self.records {
            MeshRecords::Msmr(_) => Revision::Msmr,
            MeshRecords::Rcra(_) => Revision::Rcra,
        }
    }

    /// Number of meshes.
    pub fn len(&self) -> usize {
        match &self.records {
            MeshRecords::Msmr(r) => r.len(),
            MeshRecords::Rcra(r) => r.len(),
        }
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The mesh at `index`.
    pub fn get(&self, index: usize) -> Option<MeshDefinition> {
        match &self.records {
            MeshRecords::Msmr(r) => r.get(index).map(MeshDefinition::from),
            MeshRecords::Rcra(r) => r.get(index).map(MeshDefinition::from),
        }
    }

    /// All meshes in table order.
    pub fn meshes(&self) -> Vec<MeshDefinition> {
        match &self.records {
            MeshRecords::Msmr(r) => r.iter().map(MeshDefinition::from).collect(),
            MeshRecords::Rcra(r) => r.iter().map(MeshDefinition::from).collect(),
        }
    }
}

impl SectionCodec for MeshSection {
    const TAG: u32 = 0x78D9_CBDE;
    const NAME: &'static str = "Model Mesh";
    const FAMILY: Family = Family::Model;

    fn decode(data: &[u8], ctx: &DecodeContext) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let records = match ctx.revision {
            Revision::Msmr => MeshRecords::Msmr(reader.read_remaining_array()?),
            Revision::Rcra => MeshRecords::Rcra(reader.read_remaining_array()?),
        };
        Ok(Self {
            records,
            tail: reader.remaining_bytes().to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(data_len(&self.records) + self.tail.len());
        match &self.records {
            MeshRecords::Msmr(r) => put_records(&mut out, r),
            MeshRecords::Rcra(r) => put_records(&mut out, r),
        }
        out.extend_from_slice(&self.tail);
        out
    }
}

fn data_len(records: &MeshRecords) -> usize {
    match records {
        MeshRecords::Msmr(r) => r.len() * std::mem::size_of::<MsmrMeshRecord>(),
        MeshRecords::Rcra(r) => r.len() * std::mem::size_of::<RcraMeshRecord>(),
    }
}
