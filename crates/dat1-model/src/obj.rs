//! Wavefront OBJ text output.

use std::fmt::Write as _;
use std::io::Write;

use crate::assembler::{MeshGroup, ModelGeometry};
use crate::Result;

/// Renders assembled geometry as OBJ text.
///
/// Each mesh becomes an `o` object, preceded by `usemtl` when its material
/// differs from the previous mesh. Every vertex is written as a `v` line
/// followed by its `vt` line, so faces use the same index for both.
#[derive(Debug, Default)]
pub struct ObjWriter {
    buf: String,
    objects: usize,
}

impl ObjWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference an MTL library.
    pub fn mtllib(&mut self, path: &str) -> &mut Self {
        let _ = writeln!(self.buf, "mtllib {}", path);
        self
    }

    /// Append every mesh of an export.
    pub fn geometry(&mut self, geometry: &ModelGeometry) -> &mut Self {
        for mesh in &geometry.meshes {
            self.mesh(mesh);
        }
        self
    }

    /// Append one mesh.
    pub fn mesh(&mut self, mesh: &MeshGroup) -> &mut Self {
        let _ = writeln!(self.buf, "o {:02}_{}", self.objects, mesh.name);
        self.objects += 1;

        if let Some(material) = &mesh.material_switch {
            let _ = writeln!(self.buf, "usemtl {}", material);
        }

        for vertex in &mesh.vertices {
            let [x, y, z] = vertex.position;
            let [u, v] = vertex.uv;
            let _ = writeln!(self.buf, "v {} {} {}", x, y, z);
            let _ = writeln!(self.buf, "vt {} {}", u, v);
        }

        for [a, b, c] in &mesh.faces {
            let _ = writeln!(self.buf, "f {a}/{a} {b}/{b} {c}/{c}");
        }
        self
    }

    /// The text written so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the writer, returning the text.
    pub fn finish(self) -> String {
        self.buf
    }

    /// Write the text to an output stream.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(self.buf.as_bytes())?;
        Ok(())
    }
}

/// Render geometry as OBJ text.
pub fn to_obj(geometry: &ModelGeometry) -> String {
    let mut writer = ObjWriter::new();
    writer.geometry(geometry);
    writer.finish()
}

/// Render a placeholder MTL library declaring every material of an export.
pub fn to_mtl(geometry: &ModelGeometry) -> String {
    let mut buf = String::new();
    for material in geometry.materials() {
        let _ = writeln!(buf, "newmtl {}", material);
        buf.push_str("Kd 0.8 0.8 0.8\n\n");
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::tests::{look, model, two_looks, vertex, LOCAL};
    use crate::{assemble, ExportOptions};

    #[test]
    fn test_face_lines() {
        let vertices = (0..14).map(|i| vertex(i, 0, 0)).collect();
        let dat1 = model(
            vertices,
            vec![0, 1, 2, 1, 2, 3],
            &[(10, 4, 0, 6, 0, LOCAL)],
            vec![look(&[(0, 1)])],
            &["body"],
        );
        let options = ExportOptions {
            position_scale: 1.0,
            ..Default::default()
        };
        let geometry = assemble(&dat1, &options).unwrap();
        let text = to_obj(&geometry);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "o 00_mesh00_body");
        assert_eq!(lines[1], "usemtl body");
        assert_eq!(lines[2], "v 10 0 0");
        assert_eq!(lines[3], "vt 0 1");
        assert_eq!(lines.len(), 2 + 4 * 2 + 2);
        assert_eq!(lines[10], "f 3/3 2/2 1/1");
        assert_eq!(lines[11], "f 4/4 3/3 2/2");
    }

    #[test]
    fn test_usemtl_count() {
        let dat1 = two_looks([0, 0, 1, 1, 1]);
        let geometry = assemble(&dat1, &ExportOptions::new([0, 1], 0)).unwrap();
        let text = to_obj(&geometry);

        assert_eq!(text.lines().filter(|l| l.starts_with("o ")).count(), 5);
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 15);
        let usemtl: Vec<_> = text.lines().filter(|l| l.starts_with("usemtl")).collect();
        assert_eq!(usemtl, vec!["usemtl skin", "usemtl cloth"]);
    }

    #[test]
    fn test_mtllib_and_stream() {
        let dat1 = two_looks([0, 1, 0, 0, 0]);
        let geometry = assemble(&dat1, &ExportOptions::default()).unwrap();

        let mut writer = ObjWriter::new();
        writer.mtllib("model.mtl").geometry(&geometry);
        assert!(writer.as_str().starts_with("mtllib model.mtl\no 00_mesh00_skin\n"));

        let mut out = Vec::new();
        writer.write_to(&mut out).unwrap();
        assert_eq!(out, writer.as_str().as_bytes());

        let mtl = to_mtl(&geometry);
        assert_eq!(mtl.matches("newmtl").count(), 2);
        assert!(mtl.starts_with("newmtl skin\n"));
    }
}
