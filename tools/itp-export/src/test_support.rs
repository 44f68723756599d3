//! In-memory [`MeshSource`] for unit tests

use glam::{Vec2, Vec3};

use crate::source::{
    AttributeSample, BlendChannel, MeshChannels, MeshSource, NodeId, SkinCluster,
};

#[derive(Debug, Default)]
pub(crate) struct TestMesh {
    pub name: String,
    pub control_points: Vec<Vec3>,
    pub triangles: Vec<[AttributeSample; 3]>,
    pub channels: MeshChannels,
    pub clusters: Vec<SkinCluster>,
    pub nodes: Vec<(String, Option<NodeId>)>,
    pub blend_channels: Vec<BlendChannel>,
}

impl TestMesh {
    pub fn with_nodes(nodes: &[(&str, Option<NodeId>)]) -> Self {
        Self {
            nodes: nodes
                .iter()
                .map(|&(name, parent)| (name.to_string(), parent))
                .collect(),
            ..Default::default()
        }
    }

    /// Corner sample at control point `cp` with the given normal
    pub fn sample(&self, cp: u32, normal: Option<Vec3>) -> AttributeSample {
        AttributeSample {
            control_point: cp,
            position: self.control_points[cp as usize],
            normal,
            tangent: None,
            uv: None,
        }
    }

    pub fn sample_uv(&self, cp: u32, uv: Vec2) -> AttributeSample {
        AttributeSample {
            uv: Some(uv),
            ..self.sample(cp, None)
        }
    }
}

impl MeshSource for TestMesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn control_point_count(&self) -> usize {
        self.control_points.len()
    }

    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn corner(&self, triangle: usize, corner: usize) -> AttributeSample {
        self.triangles[triangle][corner]
    }

    fn channels(&self) -> MeshChannels {
        self.channels
    }

    fn skin_clusters(&self) -> &[SkinCluster] {
        &self.clusters
    }

    fn node_name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|(name, _)| name.as_str())
    }

    fn node_parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|&(_, parent)| parent)
    }

    fn blend_channels(&self) -> &[BlendChannel] {
        &self.blend_channels
    }
}
