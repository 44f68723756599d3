//! JSON scene description
//!
//! A scene is a list of nodes (name + optional parent) and a list of meshes.
//! Mesh polygons are control-point index lists of any size; they are
//! fan-triangulated when a [`SceneMeshSource`] is built. Polygon-vertex numbering
//! runs over all corners of all polygons in document order, which is what
//! `by_polygon_vertex` elements index.
//!
//! ```json
//! {
//!   "nodes": [{ "name": "root" }, { "name": "arm", "parent": 0 }],
//!   "meshes": [{
//!     "name": "Arm",
//!     "control_points": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
//!     "polygons": [[0, 1, 2]],
//!     "skin": [{ "link": 1, "influences": [[0, 1.0]] }]
//!   }]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use serde::Deserialize;

use crate::source::{
    AttributeSample, BlendChannel, GeometryElement, MeshChannels, MeshSource, NodeId,
    SkinCluster,
};

/// Structural problems that make a scene unusable
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("node {node} has parent {parent}, but the scene has {count} nodes")]
    ParentOutOfRange {
        node: usize,
        parent: usize,
        count: usize,
    },

    #[error("node {node} is its own ancestor")]
    ParentCycle { node: usize },

    #[error("mesh {mesh} references node {node}, but the scene has {count} nodes")]
    MeshNodeOutOfRange {
        mesh: usize,
        node: usize,
        count: usize,
    },

    #[error("mesh {mesh} polygon {polygon} uses control point {index}, but the mesh has {count}")]
    ControlPointOutOfRange {
        mesh: usize,
        polygon: usize,
        index: u32,
        count: usize,
    },

    #[error("mesh {mesh} skin cluster {cluster} links node {node}, but the scene has {count} nodes")]
    LinkOutOfRange {
        mesh: usize,
        cluster: usize,
        node: usize,
        count: usize,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default)]
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneMesh {
    #[serde(default)]
    pub name: Option<String>,
    /// Node the mesh is attached to
    #[serde(default)]
    pub node: Option<NodeId>,
    pub control_points: Vec<Vec3>,
    pub polygons: Vec<Vec<u32>>,
    #[serde(default)]
    pub normals: Option<GeometryElement<Vec3>>,
    #[serde(default)]
    pub tangents: Option<GeometryElement<Vec3>>,
    #[serde(default)]
    pub uvs: Option<GeometryElement<Vec2>>,
    #[serde(default)]
    pub skin: Vec<SkinCluster>,
    #[serde(default)]
    pub blend_channels: Vec<BlendChannel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
    #[serde(default)]
    pub meshes: Vec<SceneMesh>,
}

impl Scene {
    /// Load and validate a scene file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene: {:?}", path))?;
        let scene: Scene = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scene: {:?}", path))?;
        scene
            .validate()
            .with_context(|| format!("Invalid scene: {:?}", path))?;
        Ok(scene)
    }

    /// Check every node and control point reference
    pub fn validate(&self) -> Result<(), SceneError> {
        let count = self.nodes.len();

        for (node, entry) in self.nodes.iter().enumerate() {
            if let Some(parent) = entry.parent {
                if parent >= count {
                    return Err(SceneError::ParentOutOfRange {
                        node,
                        parent,
                        count,
                    });
                }
            }
        }

        // A chain longer than the node count must revisit a node
        for node in 0..count {
            let mut current = self.nodes[node].parent;
            let mut steps = 0;
            while let Some(parent) = current {
                steps += 1;
                if parent == node || steps > count {
                    return Err(SceneError::ParentCycle { node });
                }
                current = self.nodes[parent].parent;
            }
        }

        for (mesh_index, mesh) in self.meshes.iter().enumerate() {
            if let Some(node) = mesh.node.filter(|&node| node >= count) {
                return Err(SceneError::MeshNodeOutOfRange {
                    mesh: mesh_index,
                    node,
                    count,
                });
            }

            let cp_count = mesh.control_points.len();
            for (polygon, indices) in mesh.polygons.iter().enumerate() {
                if let Some(&index) = indices.iter().find(|&&i| i as usize >= cp_count) {
                    return Err(SceneError::ControlPointOutOfRange {
                        mesh: mesh_index,
                        polygon,
                        index,
                        count: cp_count,
                    });
                }
            }

            for (cluster, skin) in mesh.skin.iter().enumerate() {
                if let Some(node) = skin.link.filter(|&node| node >= count) {
                    return Err(SceneError::LinkOutOfRange {
                        mesh: mesh_index,
                        cluster,
                        node,
                        count,
                    });
                }
            }
        }

        Ok(())
    }

    /// Source view of mesh `index`
    pub fn mesh_source(&self, index: usize) -> Option<SceneMeshSource<'_>> {
        self.meshes
            .get(index)
            .map(|mesh| SceneMeshSource::new(self, mesh, index))
    }

    /// Source views of every mesh, in document order
    pub fn mesh_sources(&self) -> impl Iterator<Item = SceneMeshSource<'_>> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(index, mesh)| SceneMeshSource::new(self, mesh, index))
    }
}

/// Parse and validate a scene from a JSON string
pub fn from_json(json: &str) -> Result<Scene> {
    let scene: Scene = serde_json::from_str(json).context("Failed to parse scene")?;
    scene.validate()?;
    Ok(scene)
}

/// One triangle corner: control point and polygon-vertex number
#[derive(Debug, Clone, Copy)]
struct Corner {
    control_point: u32,
    polygon_vertex: u32,
}

/// [`MeshSource`] over one triangulated scene mesh
#[derive(Debug)]
pub struct SceneMeshSource<'a> {
    scene: &'a Scene,
    mesh: &'a SceneMesh,
    name: String,
    triangles: Vec<[Corner; 3]>,
}

impl<'a> SceneMeshSource<'a> {
    fn new(scene: &'a Scene, mesh: &'a SceneMesh, index: usize) -> Self {
        let name = mesh
            .name
            .clone()
            .or_else(|| {
                mesh.node
                    .and_then(|node| scene.nodes.get(node))
                    .map(|node| node.name.clone())
            })
            .unwrap_or_else(|| format!("mesh_{}", index));

        let mut triangles = Vec::new();
        let mut polygon_vertex = 0u32;
        for polygon in &mesh.polygons {
            let corner = |i: usize| Corner {
                control_point: polygon[i],
                polygon_vertex: polygon_vertex + i as u32,
            };
            for i in 1..polygon.len().saturating_sub(1) {
                triangles.push([corner(0), corner(i), corner(i + 1)]);
            }
            polygon_vertex += polygon.len() as u32;
        }

        Self {
            scene,
            mesh,
            name,
            triangles,
        }
    }
}

impl MeshSource for SceneMeshSource<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn control_point_count(&self) -> usize {
        self.mesh.control_points.len()
    }

    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn corner(&self, triangle: usize, corner: usize) -> AttributeSample {
        let Corner {
            control_point,
            polygon_vertex,
        } = self.triangles[triangle][corner];
        let resolve3 = |element: &Option<GeometryElement<Vec3>>| {
            element
                .as_ref()
                .and_then(|e| e.resolve(control_point, polygon_vertex))
        };

        AttributeSample {
            control_point,
            position: self.mesh.control_points[control_point as usize],
            normal: resolve3(&self.mesh.normals),
            tangent: resolve3(&self.mesh.tangents),
            uv: self
                .mesh
                .uvs
                .as_ref()
                .and_then(|e| e.resolve(control_point, polygon_vertex))
                .map(|uv| Vec2::new(uv.x, 1.0 - uv.y)),
        }
    }

    fn channels(&self) -> MeshChannels {
        MeshChannels {
            normals: self.mesh.normals.is_some(),
            tangents: self.mesh.tangents.is_some(),
            uvs: self.mesh.uvs.is_some(),
        }
    }

    fn skin_clusters(&self) -> &[SkinCluster] {
        &self.mesh.skin
    }

    fn node_name(&self, node: NodeId) -> Option<&str> {
        self.scene.nodes.get(node).map(|n| n.name.as_str())
    }

    fn node_parent(&self, node: NodeId) -> Option<NodeId> {
        self.scene.nodes.get(node).and_then(|n| n.parent)
    }

    fn blend_channels(&self) -> &[BlendChannel] {
        &self.mesh.blend_channels
    }
}

/// Log the meshes of a scene file
pub fn list_meshes(input: &Path) -> Result<()> {
    let scene = Scene::load(input)?;

    if scene.meshes.is_empty() {
        tracing::info!("No meshes found in {:?}", input);
        return Ok(());
    }

    tracing::info!("Meshes in {:?}:", input);
    for (i, source) in scene.mesh_sources().enumerate() {
        tracing::info!(
            "  [{}] '{}': {} control points, {} triangles, {} skin clusters, {} blend channels",
            i,
            source.name(),
            source.control_point_count(),
            source.triangle_count(),
            source.skin_clusters().len(),
            source.blend_channels().len()
        );
    }

    Ok(())
}
