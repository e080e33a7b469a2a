//! Builds exportable geometry from the model sections of one container.
//!
//! The meshes shown by the requested looks at one LOD are collected in mesh
//! index order. Each mesh contributes its vertex range and its triangles,
//! with face indices rebased onto the combined vertex list (1-based) and
//! triangle winding reversed.

use std::collections::BTreeSet;

use dat1_format::sections::{
    IndexSection, LookSection, MeshDefinition, MeshSection, ModelMaterialSection,
    UvOverrideSection, Vertex, VertexSection, LODS_PER_LOOK,
};
use dat1_format::{Dat1, TypedSection};
use thiserror::Error;

use crate::{Error, Result};

/// What to export and how to scale it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportOptions {
    /// Look indices whose meshes are included.
    pub looks: Vec<usize>,
    /// Level of detail, 0 being the most detailed.
    pub lod: usize,
    /// Multiplier for fixed-point texture coordinates.
    pub uv_scale: f32,
    /// Multiplier for fixed-point positions.
    pub position_scale: f32,
}

impl ExportOptions {
    pub const DEFAULT_UV_SCALE: f32 = 1.0 / 16384.0;
    pub const DEFAULT_POSITION_SCALE: f32 = 1.0 / 4096.0;

    /// Export the given looks at the given LOD with default scales.
    pub fn new(looks: impl Into<Vec<usize>>, lod: usize) -> Self {
        Self {
            looks: looks.into(),
            lod,
            ..Self::default()
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            looks: vec![0],
            lod: 0,
            uv_scale: Self::DEFAULT_UV_SCALE,
            position_scale: Self::DEFAULT_POSITION_SCALE,
        }
    }
}

/// One output vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OutputVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// The output of one mesh.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MeshGroup {
    /// Index of the mesh in the mesh section.
    pub mesh_index: usize,
    /// Object name, `meshNN_<material>`.
    pub name: String,
    /// Resolved material name.
    pub material: String,
    /// Set when this mesh switches to a material different from the
    /// previously emitted mesh.
    pub material_switch: Option<String>,
    pub vertices: Vec<OutputVertex>,
    /// Triangles as 1-based indices into the whole export's vertex list.
    pub faces: Vec<[u32; 3]>,
}

/// A mesh that was skipped because its ranges do not fit the buffers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MeshWarning {
    #[error("mesh {mesh} does not exist ({count} meshes)")]
    MissingMesh { mesh: usize, count: usize },

    #[error("mesh {mesh} vertices {start}+{count} exceed vertex buffer of {len}")]
    VertexRange {
        mesh: usize,
        start: usize,
        count: usize,
        len: usize,
    },

    #[error("mesh {mesh} indices {start}+{count} exceed index buffer of {len}")]
    IndexRange {
        mesh: usize,
        start: usize,
        count: usize,
        len: usize,
    },

    #[error("mesh {mesh} references vertex {index} outside its {count} vertices")]
    IndexOutsideMesh { mesh: usize, index: u32, count: u32 },
}

/// Assembled geometry, ready to be written out.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModelGeometry {
    pub meshes: Vec<MeshGroup>,
    pub warnings: Vec<MeshWarning>,
}

impl ModelGeometry {
    /// Total emitted vertices.
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    /// Total emitted triangles.
    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(|m| m.faces.len()).sum()
    }

    /// Distinct material names in first-use order.
    pub fn materials(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for mesh in &self.meshes {
            if !seen.contains(&mesh.material.as_str()) {
                seen.push(mesh.material.as_str());
            }
        }
        seen
    }
}

fn require<T: TypedSection>(dat1: &Dat1) -> Result<&T> {
    dat1.get::<T>().ok_or(Error::MissingSection {
        tag: T::TAG,
        name: T::NAME,
    })
}

/// Union of the mesh ranges the requested looks show at the requested LOD.
fn select_meshes(looks: &LookSection, options: &ExportOptions) -> Result<BTreeSet<usize>> {
    if options.lod >= LODS_PER_LOOK {
        return Err(Error::LodOutOfRange {
            lod: options.lod,
            count: LODS_PER_LOOK,
        });
    }

    let mut selected = BTreeSet::new();
    for &look in &options.looks {
        let lod = looks.lod(look, options.lod).ok_or(Error::LookOutOfRange {
            look,
            count: looks.looks.len(),
        })?;
        selected.extend(lod.meshes());
    }
    Ok(selected)
}

struct Buffers<'a> {
    vertices: &'a [Vertex],
    indices: &'a [u16],
    uv_override: Option<&'a UvOverrideSection>,
}

/// Resolve the display name of a material index.
///
/// Falls back to the path hash, then to the bare index, when the name
/// cannot be resolved.
fn material_name(dat1: &Dat1, materials: Option<&ModelMaterialSection>, index: u16) -> String {
    let Some(material) = materials.and_then(|m| m.materials.get(index as usize)) else {
        return format!("material{}", index);
    };
    match dat1.get_string(material.name_offset) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{:016X}", material.path_hash),
    }
}

/// Assemble the meshes selected by `options`.
///
/// Fails only when a required section is missing or a look/LOD does not
/// exist. Meshes whose ranges do not fit the buffers are skipped and listed
/// in [`ModelGeometry::warnings`].
pub fn assemble(dat1: &Dat1, options: &ExportOptions) -> Result<ModelGeometry> {
    let vertices = require::<VertexSection>(dat1)?;
    let indices = require::<IndexSection>(dat1)?;
    let meshes = require::<MeshSection>(dat1)?;
    let looks = require::<LookSection>(dat1)?;
    let materials = dat1.get::<ModelMaterialSection>();

    let buffers = Buffers {
        vertices: &vertices.vertices,
        indices: &indices.indices,
        uv_override: dat1.get::<UvOverrideSection>(),
    };

    let selected = select_meshes(looks, options)?;
    tracing::debug!("exporting {} meshes at LOD {}", selected.len(), options.lod);

    let mut geometry = ModelGeometry::default();
    let mut vertex_offset: u32 = 1;
    let mut current_material: Option<String> = None;

    for mesh_index in selected {
        let Some(mesh) = meshes.get(mesh_index) else {
            skip(&mut geometry, MeshWarning::MissingMesh {
                mesh: mesh_index,
                count: meshes.len(),
            });
            continue;
        };

        let built = build_mesh(mesh_index, &mesh, &buffers, options, vertex_offset);
        let (mesh_vertices, faces) = match built {
            Ok(built) => built,
            Err(warning) => {
                skip(&mut geometry, warning);
                continue;
            }
        };

        let material = material_name(dat1, materials, mesh.material_index);
        let material_switch = if current_material.as_deref() != Some(material.as_str()) {
            current_material = Some(material.clone());
            Some(material.clone())
        } else {
            None
        };

        vertex_offset += mesh.vertex_count;
        geometry.meshes.push(MeshGroup {
            mesh_index,
            name: format!("mesh{:02}_{}", mesh_index, material),
            material,
            material_switch,
            vertices: mesh_vertices,
            faces,
        });
    }

    Ok(geometry)
}

fn skip(geometry: &mut ModelGeometry, warning: MeshWarning) {
    tracing::warn!("skipping mesh: {}", warning);
    geometry.warnings.push(warning);
}

fn build_mesh(
    mesh_index: usize,
    mesh: &MeshDefinition,
    buffers: &Buffers<'_>,
    options: &ExportOptions,
    vertex_offset: u32,
) -> std::result::Result<(Vec<OutputVertex>, Vec<[u32; 3]>), MeshWarning> {
    let vertex_start = mesh.vertex_start as usize;
    let vertex_count = mesh.vertex_count as usize;
    let mesh_vertices = buffers
        .vertices
        .get(vertex_start..vertex_start + vertex_count)
        .ok_or(MeshWarning::VertexRange {
            mesh: mesh_index,
            start: vertex_start,
            count: vertex_count,
            len: buffers.vertices.len(),
        })?;

    let index_start = mesh.index_start as usize;
    let index_count = mesh.index_count as usize;
    let mesh_indices = buffers
        .indices
        .get(index_start..index_start + index_count)
        .ok_or(MeshWarning::IndexRange {
            mesh: mesh_index,
            start: index_start,
            count: index_count,
            len: buffers.indices.len(),
        })?;

    let local_indices = mesh.has_local_indices();
    let to_output = |raw: u16| -> std::result::Result<u32, MeshWarning> {
        let raw = raw as u32;
        let local = if local_indices {
            Some(raw)
        } else {
            raw.checked_sub(mesh.vertex_start)
        };
        match local {
            Some(local) if local < mesh.vertex_count => Ok(local + vertex_offset),
            _ => Err(MeshWarning::IndexOutsideMesh {
                mesh: mesh_index,
                index: raw,
                count: mesh.vertex_count,
            }),
        }
    };

    let mut faces = Vec::with_capacity(index_count / 3);
    for triangle in mesh_indices.chunks_exact(3) {
        faces.push([
            to_output(triangle[2])?,
            to_output(triangle[1])?,
            to_output(triangle[0])?,
        ]);
    }

    let uv_scale = options.uv_scale;
    let position_scale = options.position_scale;
    let vertices = mesh_vertices
        .iter()
        .enumerate()
        .map(|(i, vertex)| {
            let (u, v) = match buffers.uv_override.and_then(|uvs| uvs.get(vertex_start + i)) {
                Some(pair) => (pair.u, pair.v),
                None => (vertex.u, vertex.v),
            };
            OutputVertex {
                position: [
                    vertex.x as f32 * position_scale,
                    vertex.y as f32 * position_scale,
                    vertex.z as f32 * position_scale,
                ],
                uv: [u as f32 * uv_scale, 1.0 - v as f32 * uv_scale],
            }
        })
        .collect();

    Ok((vertices, faces))
}
