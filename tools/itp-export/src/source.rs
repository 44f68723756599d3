//! Mesh source interfaces
//!
//! The export pipeline never walks a scene graph itself. It reads a mesh through
//! [`MeshSource`], which answers per-corner attribute queries, lists skin clusters,
//! exposes the node parent chain for bone lookups, and lists blend-shape channels.

use glam::{Mat4, Vec2, Vec3};
use serde::Deserialize;

/// Index of a node in the source scene
pub type NodeId = usize;

/// Which element an attribute array is indexed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    /// One value per control point
    ByControlPoint,
    /// One value per polygon corner, in polygon order
    ByPolygonVertex,
}

/// How the mapped slot is turned into an index into the direct array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// The slot indexes the direct array
    Direct,
    /// The slot indexes the index array, which indexes the direct array
    IndexToDirect,
}

/// A per-mesh attribute array (normals, tangents, UVs) with its addressing mode
#[derive(Debug, Clone, Deserialize)]
pub struct GeometryElement<T> {
    pub mapping: MappingMode,
    pub reference: ReferenceMode,
    pub direct: Vec<T>,
    #[serde(default)]
    pub index: Vec<u32>,
}

impl<T: Copy> GeometryElement<T> {
    pub fn new(mapping: MappingMode, direct: Vec<T>) -> Self {
        Self {
            mapping,
            reference: ReferenceMode::Direct,
            direct,
            index: Vec::new(),
        }
    }

    pub fn indexed(mapping: MappingMode, direct: Vec<T>, index: Vec<u32>) -> Self {
        Self {
            mapping,
            reference: ReferenceMode::IndexToDirect,
            direct,
            index,
        }
    }

    /// Look up the value for a corner
    ///
    /// Returns `None` when the element has no value for this corner
    /// (slot or index out of range).
    pub fn resolve(&self, control_point: u32, polygon_vertex: u32) -> Option<T> {
        let slot = match self.mapping {
            MappingMode::ByControlPoint => control_point,
            MappingMode::ByPolygonVertex => polygon_vertex,
        };
        let index = match self.reference {
            ReferenceMode::Direct => slot,
            ReferenceMode::IndexToDirect => *self.index.get(slot as usize)?,
        };
        self.direct.get(index as usize).copied()
    }

    /// Look up the value for a control point, if this element is mapped per control point
    pub fn resolve_control_point(&self, control_point: u32) -> Option<T> {
        match self.mapping {
            MappingMode::ByControlPoint => self.resolve(control_point, 0),
            MappingMode::ByPolygonVertex => None,
        }
    }
}

/// Attribute values of one triangle corner
///
/// `uv` is already V-flipped (`v' = 1 - v`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeSample {
    pub control_point: u32,
    pub position: Vec3,
    pub normal: Option<Vec3>,
    pub tangent: Option<Vec3>,
    pub uv: Option<Vec2>,
}

/// Which optional channels a mesh carries at all
///
/// Decided once per mesh from whether the geometry element exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshChannels {
    pub normals: bool,
    pub tangents: bool,
    pub uvs: bool,
}

/// One skin cluster: a bone link and the control points it influences
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkinCluster {
    /// Node the cluster is linked to (`None` if the link could not be resolved)
    #[serde(default)]
    pub link: Option<NodeId>,
    /// (control point, raw weight) pairs
    #[serde(default)]
    pub influences: Vec<(u32, f32)>,
    /// Global transform of the link node at bind time
    #[serde(default)]
    pub link_bind_global: Mat4,
    /// Global transform of the mesh node at bind time
    #[serde(default)]
    pub mesh_bind_global: Mat4,
}

/// One target shape of a blend-shape channel
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetShape {
    /// Full per-control-point target positions
    pub positions: Vec<Vec3>,
    #[serde(default)]
    pub normals: Option<GeometryElement<Vec3>>,
    #[serde(default)]
    pub tangents: Option<GeometryElement<Vec3>>,
}

/// A named blend-shape channel with one or more targets
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlendChannel {
    pub name: String,
    #[serde(default)]
    pub targets: Vec<TargetShape>,
}

/// Read access to one triangulated mesh and its surroundings
///
/// Node parent chains reachable through [`MeshSource::node_parent`] must terminate.
pub trait MeshSource {
    /// Mesh name, used for output file names
    fn name(&self) -> &str;

    /// Number of control points in the base mesh
    fn control_point_count(&self) -> usize;

    /// Number of triangles
    fn triangle_count(&self) -> usize;

    /// Attribute sample for corner `corner` (0..3) of triangle `triangle`
    fn corner(&self, triangle: usize, corner: usize) -> AttributeSample;

    /// Optional channels present on this mesh
    fn channels(&self) -> MeshChannels;

    fn skin_clusters(&self) -> &[SkinCluster] {
        &[]
    }

    fn node_name(&self, _node: NodeId) -> Option<&str> {
        None
    }

    fn node_parent(&self, _node: NodeId) -> Option<NodeId> {
        None
    }

    fn blend_channels(&self) -> &[BlendChannel] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_control_point_direct() {
        let element = GeometryElement::new(MappingMode::ByControlPoint, vec![10, 11, 12]);
        assert_eq!(element.resolve(1, 7), Some(11));
        assert_eq!(element.resolve(3, 0), None);
    }

    #[test]
    fn test_resolve_by_polygon_vertex_direct() {
        let element = GeometryElement::new(MappingMode::ByPolygonVertex, vec![10, 11, 12]);
        assert_eq!(element.resolve(0, 2), Some(12));
    }

    #[test]
    fn test_resolve_index_to_direct() {
        let element =
            GeometryElement::indexed(MappingMode::ByPolygonVertex, vec![5, 6], vec![1, 1, 0]);
        assert_eq!(element.resolve(9, 0), Some(6));
        assert_eq!(element.resolve(9, 2), Some(5));
        assert_eq!(element.resolve(9, 3), None);
    }

    #[test]
    fn test_resolve_bad_index_entry() {
        let element = GeometryElement::indexed(MappingMode::ByControlPoint, vec![5], vec![4]);
        assert_eq!(element.resolve(0, 0), None);
    }

    #[test]
    fn test_resolve_control_point_requires_mapping() {
        let per_corner = GeometryElement::new(MappingMode::ByPolygonVertex, vec![1, 2]);
        assert_eq!(per_corner.resolve_control_point(0), None);

        let per_point = GeometryElement::new(MappingMode::ByControlPoint, vec![1, 2]);
        assert_eq!(per_point.resolve_control_point(1), Some(2));
    }

    #[test]
    fn test_element_from_json() {
        let element: GeometryElement<[f32; 2]> = serde_json::from_str(
            r#"{ "mapping": "by_polygon_vertex", "reference": "index_to_direct",
                 "direct": [[0.0, 0.0], [1.0, 0.5]], "index": [1, 0] }"#,
        )
        .unwrap();
        assert_eq!(element.reference, ReferenceMode::IndexToDirect);
        assert_eq!(element.resolve(0, 0), Some([1.0, 0.5]));
    }
}
