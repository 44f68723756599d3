//! ITP document writers
//!
//! Re-exports the document types from itp-common and fills them from a
//! [`ProcessedMesh`].

pub use itp_common::formats::*;

use anyhow::{Context, Result};
use itp_common::{FORMAT_NORMAL, FORMAT_SKINNED, FORMAT_TANGENT, FORMAT_UV};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::blend::BlendShape;
use crate::mesh::Vertex;
use crate::pipeline::ProcessedMesh;
use crate::skeleton::Bone;

/// Flatten one vertex in vertex-format order, leaving out absent channels
fn vertex_scalars(vertex: &Vertex, format: u8) -> Vec<Scalar> {
    let mut out = Vec::with_capacity(itp_common::vertex_scalar_count(format));
    let floats = |out: &mut Vec<Scalar>, values: &[f32]| {
        out.extend(values.iter().map(|&v| Scalar::Float(v)));
    };

    floats(&mut out, &vertex.position.to_array());
    if format & FORMAT_NORMAL != 0 {
        floats(&mut out, &vertex.normal.to_array());
    }
    if format & FORMAT_TANGENT != 0 {
        floats(&mut out, &vertex.tangent.to_array());
    }
    if format & FORMAT_SKINNED != 0 {
        out.extend(vertex.bones.iter().map(|&b| Scalar::Byte(b)));
        out.extend(vertex.weights.iter().map(|&w| Scalar::Byte(w)));
    }
    if format & FORMAT_UV != 0 {
        floats(&mut out, &vertex.uv.to_array());
    }
    out
}

pub fn mesh_document(processed: &ProcessedMesh) -> MeshDocument {
    let mut doc = MeshDocument::new(&processed.name, processed.format);
    doc.vertices = processed
        .mesh
        .vertices
        .iter()
        .map(|v| vertex_scalars(v, processed.format))
        .collect();
    doc.indices = processed.mesh.triangles.clone();
    doc
}

pub fn skeleton_document(bones: &[Bone]) -> SkeletonDocument {
    SkeletonDocument::new(
        bones
            .iter()
            .map(|bone| BoneDocument {
                name: bone.name.clone(),
                parent_index: bone.parent_index,
                bind_pose: BindPoseDocument {
                    rot: bone.bind_pose.rotation.to_array(),
                    trans: bone.bind_pose.translation.to_array(),
                },
            })
            .collect(),
    )
}

pub fn blend_document(shape: &BlendShape) -> BlendDocument {
    let mut doc = BlendDocument::new(&shape.name, shape.format);
    doc.deltas = shape
        .deltas
        .iter()
        .map(|delta| {
            let mut row = delta.position.to_array().to_vec();
            if shape.format & FORMAT_NORMAL != 0 {
                row.extend(delta.normal.to_array());
            }
            if shape.format & FORMAT_TANGENT != 0 {
                row.extend(delta.tangent.to_array());
            }
            row
        })
        .collect();
    doc
}

/// Write a complete ITP mesh document
pub fn write_itp_mesh<W: Write>(w: &mut W, processed: &ProcessedMesh) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, &mesh_document(processed))?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write a complete ITP skeleton document
pub fn write_itp_skeleton<W: Write>(w: &mut W, bones: &[Bone]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, &skeleton_document(bones))?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write a complete ITP blend-shape document
pub fn write_itp_blend<W: Write>(w: &mut W, shape: &BlendShape) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, &blend_document(shape))?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Turn a mesh or blend-shape name into a file stem that stays inside the
/// output directory
///
/// Path separators, characters Windows rejects and control characters become
/// `_`. A name that is empty or only dots gets a leading `_`.
pub fn file_stem(name: &str) -> String {
    let mut stem: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.chars().all(|c| c == '.') {
        stem.insert(0, '_');
    }
    stem
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("Failed to create output: {:?}", path))?;
    Ok(BufWriter::new(file))
}

/// Write every document for one processed mesh into `dir`
///
/// Produces `<mesh>.itpmesh3`, `<mesh>.itpskel` when the mesh has bones, and one
/// `<shape>.itpblend` per blend shape. Names pass through [`file_stem`]; making
/// them unique across meshes is up to the caller. Returns the written paths.
pub fn write_outputs(processed: &ProcessedMesh, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let path = dir.join(format!("{}.{}", file_stem(&processed.name), ITP_MESH_EXT));
    let mut w = create(&path)?;
    write_itp_mesh(&mut w, processed)?;
    w.flush()?;
    written.push(path);

    if !processed.bones.is_empty() {
        let path = dir.join(format!("{}.{}", file_stem(&processed.name), ITP_SKELETON_EXT));
        let mut w = create(&path)?;
        write_itp_skeleton(&mut w, &processed.bones)?;
        w.flush()?;
        written.push(path);
    }

    for shape in &processed.blend_shapes {
        let path = dir.join(format!("{}.{}", file_stem(&shape.name), ITP_BLEND_EXT));
        let mut w = create(&path)?;
        write_itp_blend(&mut w, shape)?;
        w.flush()?;
        written.push(path);
    }

    for path in &written {
        tracing::debug!("Wrote {:?}", path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::BlendDelta;
    use crate::mesh::DedupMesh;
    use crate::skeleton::{BindPose, ROOT_PARENT};
    use glam::{Quat, Vec2, Vec3};

    fn processed(format: u8) -> ProcessedMesh {
        let vertex = Vertex {
            position: Vec3::new(1.0, 2.0, 3.0),
            normal: Vec3::Z,
            tangent: Vec3::X,
            uv: Vec2::new(0.5, 0.25),
            bones: [2, 1, 0, 0],
            weights: [200, 55, 0, 0],
        };
        ProcessedMesh {
            name: "Hero".to_string(),
            format,
            mesh: DedupMesh {
                vertices: vec![vertex],
                triangles: vec![[0, 0, 0]],
                control_point_map: vec![vec![0]],
            },
            bones: Vec::new(),
            blend_shapes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_vertex_order_all_channels() {
        let format = FORMAT_NORMAL | FORMAT_TANGENT | FORMAT_SKINNED | FORMAT_UV;
        let doc = mesh_document(&processed(format));
        let row = &doc.vertices[0];
        assert_eq!(row.len(), itp_common::vertex_scalar_count(format));
        assert_eq!(row[0], Scalar::Float(1.0));
        assert_eq!(row[5], Scalar::Float(1.0)); // normal z
        assert_eq!(row[6], Scalar::Float(1.0)); // tangent x
        assert_eq!(row[9], Scalar::Byte(2));
        assert_eq!(row[13], Scalar::Byte(200));
        assert_eq!(row[17], Scalar::Float(0.5));
        assert_eq!(row[18], Scalar::Float(0.25));
    }

    #[test]
    fn test_absent_channels_omitted() {
        let doc = mesh_document(&processed(FORMAT_UV));
        assert_eq!(
            doc.vertices[0],
            vec![
                Scalar::Float(1.0),
                Scalar::Float(2.0),
                Scalar::Float(3.0),
                Scalar::Float(0.5),
                Scalar::Float(0.25),
            ]
        );
        assert_eq!(doc.material, "Assets/Materials/Hero.itpmat");
    }

    #[test]
    fn test_skeleton_document() {
        let doc = skeleton_document(&[Bone {
            name: "root".to_string(),
            parent_index: ROOT_PARENT,
            bind_pose: BindPose {
                rotation: Quat::IDENTITY,
                translation: Vec3::new(0.0, 1.0, 0.0),
            },
        }]);
        assert_eq!(doc.bonecount, 1);
        assert_eq!(doc.bones[0].bind_pose.rot, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(doc.bones[0].bind_pose.trans, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_blend_document_rows() {
        let shape = BlendShape {
            name: "Smile".to_string(),
            format: FORMAT_TANGENT,
            deltas: vec![BlendDelta {
                position: Vec3::Y,
                normal: Vec3::X,
                tangent: Vec3::Z,
            }],
        };
        let doc = blend_document(&shape);
        assert_eq!(doc.deltas, vec![vec![0.0, 1.0, 0.0, 0.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut mesh = processed(FORMAT_NORMAL);
        mesh.blend_shapes.push(BlendShape {
            name: "Smile".to_string(),
            format: 0,
            deltas: vec![BlendDelta::default()],
        });

        let written = write_outputs(&mesh, dir.path()).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        // No bones, no skeleton document
        assert_eq!(names, ["Hero.itpmesh3", "Smile.itpblend"]);

        let text = std::fs::read_to_string(&written[0]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["metadata"]["type"], "itpmesh");
        assert_eq!(value["indices"][0], serde_json::json!([0, 0, 0]));
    }

    #[test]
    fn test_file_stem_keeps_plain_names() {
        assert_eq!(file_stem("Hero"), "Hero");
        assert_eq!(file_stem("Face_target0"), "Face_target0");
        assert_eq!(file_stem("mouth.open"), "mouth.open");
    }

    #[test]
    fn test_file_stem_strips_path_components() {
        assert_eq!(file_stem("../x"), ".._x");
        assert_eq!(file_stem("a/b\\c"), "a_b_c");
        assert_eq!(file_stem("C:evil"), "C_evil");
        assert_eq!(file_stem(".."), "_..");
        assert_eq!(file_stem(""), "_");
        assert_eq!(file_stem("tab\there"), "tab_here");
    }

    #[test]
    fn test_write_outputs_stays_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let mut mesh = processed(0);
        mesh.name = "../x".to_string();

        let written = write_outputs(&mesh, &out).unwrap();
        assert_eq!(written, [out.join(".._x.itpmesh3")]);
        assert!(!dir.path().join("x.itpmesh3").exists());
    }
}
