//! Vertex deduplication
//!
//! Collapses triangle corners into a unique vertex buffer. Two corners share a
//! vertex only when every field is bitwise identical; there is no tolerance.
//! Vertices are numbered in first-seen order, so identical input order always
//! gives identical output.

use std::hash::{Hash, Hasher};

use glam::{Vec2, Vec3};
use hashbrown::HashMap;

use crate::skin::PackedInfluence;
use crate::source::{AttributeSample, MeshChannels, MeshSource};

/// One entry of the vertex buffer, also used as the deduplication key
///
/// Channels missing from the mesh are zero here and are left out on export.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub uv: Vec2,
    pub bones: [u8; 4],
    pub weights: [u8; 4],
}

impl Vertex {
    /// Build a vertex from a corner sample
    ///
    /// `channels` is the mesh-level presence; a channel absent from the mesh is
    /// zero even if the sample carries a value.
    pub fn from_sample(
        sample: &AttributeSample,
        channels: MeshChannels,
        influence: PackedInfluence,
    ) -> Self {
        let pick3 = |present: bool, value: Option<Vec3>| {
            value.filter(|_| present).unwrap_or(Vec3::ZERO)
        };
        Self {
            position: sample.position,
            normal: pick3(channels.normals, sample.normal),
            tangent: pick3(channels.tangents, sample.tangent),
            uv: sample.uv.filter(|_| channels.uvs).unwrap_or(Vec2::ZERO),
            bones: influence.bones,
            weights: influence.weights,
        }
    }

    fn float_bits(&self) -> [u32; 11] {
        [
            self.position.x.to_bits(),
            self.position.y.to_bits(),
            self.position.z.to_bits(),
            self.normal.x.to_bits(),
            self.normal.y.to_bits(),
            self.normal.z.to_bits(),
            self.tangent.x.to_bits(),
            self.tangent.y.to_bits(),
            self.tangent.z.to_bits(),
            self.uv.x.to_bits(),
            self.uv.y.to_bits(),
        ]
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.float_bits() == other.float_bits()
            && self.bones == other.bones
            && self.weights == other.weights
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.float_bits().hash(state);
        self.bones.hash(state);
        self.weights.hash(state);
    }
}

/// Deduplicated mesh topology
#[derive(Debug, Clone, Default)]
pub struct DedupMesh {
    /// Unique vertices in first-seen order
    pub vertices: Vec<Vertex>,
    /// One triangle per source triangle, winding reversed
    pub triangles: Vec<[u32; 3]>,
    /// Control point -> vertex indices created from it, in creation order
    pub control_point_map: Vec<Vec<u32>>,
}

impl DedupMesh {
    /// Vertex indices created from a control point
    pub fn vertices_of(&self, control_point: usize) -> &[u32] {
        self.control_point_map
            .get(control_point)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Incremental vertex deduplicator
#[derive(Debug, Default)]
pub struct VertexDeduplicator {
    lookup: HashMap<Vertex, u32>,
    mesh: DedupMesh,
}

impl VertexDeduplicator {
    pub fn new(control_point_count: usize) -> Self {
        Self {
            lookup: HashMap::new(),
            mesh: DedupMesh {
                control_point_map: vec![Vec::new(); control_point_count],
                ..Default::default()
            },
        }
    }

    /// Index of `vertex`, appending it if unseen
    ///
    /// A new vertex is also recorded under `control_point`. A hit on a vertex
    /// first created by another control point records nothing.
    pub fn insert(&mut self, control_point: u32, vertex: Vertex) -> u32 {
        if let Some(&index) = self.lookup.get(&vertex) {
            return index;
        }

        let index = self.mesh.vertices.len() as u32;
        self.mesh.vertices.push(vertex);
        self.lookup.insert(vertex, index);

        let cp = control_point as usize;
        if cp >= self.mesh.control_point_map.len() {
            self.mesh.control_point_map.resize(cp + 1, Vec::new());
        }
        self.mesh.control_point_map[cp].push(index);
        index
    }

    /// Add a triangle given its corners in source order
    ///
    /// Source corner `v` lands in output slot `2 - v`.
    pub fn push_triangle(&mut self, corners: [(u32, Vertex); 3]) {
        let mut triangle = [0u32; 3];
        for (v, (control_point, vertex)) in corners.into_iter().enumerate() {
            triangle[2 - v] = self.insert(control_point, vertex);
        }
        self.mesh.triangles.push(triangle);
    }

    pub fn finish(self) -> DedupMesh {
        self.mesh
    }
}

/// Deduplicate every corner of a mesh
///
/// `skin` holds one packed influence per control point, or `None` when the
/// mesh is not skinned.
pub fn deduplicate<S: MeshSource + ?Sized>(
    source: &S,
    skin: Option<&[PackedInfluence]>,
) -> DedupMesh {
    let channels = source.channels();
    let mut dedup = VertexDeduplicator::new(source.control_point_count());

    for triangle in 0..source.triangle_count() {
        let corners = [0, 1, 2].map(|v| {
            let sample = source.corner(triangle, v);
            let influence = skin
                .and_then(|influences| influences.get(sample.control_point as usize))
                .copied()
                .unwrap_or(PackedInfluence::UNSKINNED);
            (
                sample.control_point,
                Vertex::from_sample(&sample, channels, influence),
            )
        });
        dedup.push_triangle(corners);
    }

    dedup.finish()
}
