//! Blend-shape delta extraction
//!
//! Each target shape of each channel becomes one [`BlendShape`] whose delta
//! buffer lines up with the deduplicated vertex buffer.

use glam::Vec3;
use itp_common::{FORMAT_NORMAL, FORMAT_TANGENT};

use crate::diagnostic::{report, Diagnostic};
use crate::mesh::DedupMesh;
use crate::source::{GeometryElement, MappingMode, MeshSource, TargetShape};

/// Per-vertex offset from the base mesh
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlendDelta {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlendShape {
    pub name: String,
    /// `FORMAT_NORMAL` / `FORMAT_TANGENT` when those deltas are present
    pub format: u8,
    /// One delta per vertex of the base vertex buffer
    pub deltas: Vec<BlendDelta>,
}

/// Output name of a target: the channel name, suffixed when the channel has several targets
pub fn blend_shape_name(channel: &str, target_count: usize, ordinal: usize) -> String {
    if target_count > 1 {
        format!("{}_target{}", channel, ordinal)
    } else {
        channel.to_string()
    }
}

/// Extract every blend shape of a mesh
///
/// `mesh_format` is the base mesh's format flags; normal and tangent deltas are
/// only produced when the base mesh has that channel too. Targets whose control
/// point count differs from the base mesh are skipped with a diagnostic.
pub fn extract_blend_shapes<S: MeshSource + ?Sized>(
    source: &S,
    mesh: &DedupMesh,
    mesh_format: u8,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<BlendShape> {
    let base_count = source.control_point_count();
    let mut shapes = Vec::new();

    for channel in source.blend_channels() {
        let target_count = channel.targets.len();
        for (ordinal, target) in channel.targets.iter().enumerate() {
            if target.positions.len() != base_count {
                report(
                    diagnostics,
                    Diagnostic::TopologyMismatch {
                        channel: channel.name.clone(),
                        target: ordinal,
                        expected: base_count,
                        found: target.positions.len(),
                    },
                );
                continue;
            }

            let name = blend_shape_name(&channel.name, target_count, ordinal);
            let shape = extract_target(name, target, mesh, mesh_format);
            tracing::debug!(
                "Blend shape '{}' from channel '{}' target {} ({} control points)",
                shape.name,
                channel.name,
                ordinal,
                base_count
            );
            shapes.push(shape);
        }
    }

    shapes
}

/// Compute the delta buffer of one target
///
/// Each control point's delta is measured against the first vertex created from
/// it and copied to every vertex of that control point. Split vertices with a
/// different normal or tangent receive the representative's normal/tangent
/// delta unchanged; this matches the established output and is not recomputed
/// per split vertex.
fn extract_target(name: String, target: &TargetShape, mesh: &DedupMesh, mesh_format: u8) -> BlendShape {
    let per_control_point =
        |element: &&GeometryElement<Vec3>| element.mapping == MappingMode::ByControlPoint;
    let normals = target
        .normals
        .as_ref()
        .filter(|_| mesh_format & FORMAT_NORMAL != 0)
        .filter(per_control_point);
    let tangents = target
        .tangents
        .as_ref()
        .filter(|_| mesh_format & FORMAT_TANGENT != 0)
        .filter(per_control_point);

    let mut format = 0u8;
    if normals.is_some() {
        format |= FORMAT_NORMAL;
    }
    if tangents.is_some() {
        format |= FORMAT_TANGENT;
    }

    let mut deltas = vec![BlendDelta::default(); mesh.vertices.len()];
    for (i, &target_position) in target.positions.iter().enumerate() {
        let duplicates = mesh.vertices_of(i);
        let Some(&representative) = duplicates.first() else {
            continue;
        };
        let base = &mesh.vertices[representative as usize];
        let cp = i as u32;

        let delta = BlendDelta {
            position: target_position - base.position,
            normal: normals
                .and_then(|element| element.resolve_control_point(cp))
                .map_or(Vec3::ZERO, |n| n - base.normal),
            tangent: tangents
                .and_then(|element| element.resolve_control_point(cp))
                .map_or(Vec3::ZERO, |t| t - base.tangent),
        };

        for &vertex in duplicates {
            deltas[vertex as usize] = delta;
        }
    }

    BlendShape { name, format, deltas }
}
