//! ITP mesh document (.itpmesh3)
//!
//! # Layout
//! ```text
//! {
//!   "metadata": { "type": "itpmesh", "version": 3 },
//!   "material": "Assets/Materials/<mesh>.itpmat",
//!   "vertexformat": [ { "name", "type", "count" }, ... ],
//!   "vertices": [ [ scalars... ], ... ],
//!   "indices": [ [ i0, i1, i2 ], ... ]
//! }
//! ```
//!
//! Vertex scalar order follows `itp_common::layout`.

use serde::{Deserialize, Serialize};

use super::{Metadata, Scalar, VertexFormatEntry};
use crate::layout::vertex_components;

/// File extension for mesh documents
pub const ITP_MESH_EXT: &str = "itpmesh3";
/// Mesh document version
pub const ITP_MESH_VERSION: u32 = 3;

const ITP_MESH_TYPE: &str = "itpmesh";

/// Material path referenced by a mesh of the given name
pub fn material_path(mesh_name: &str) -> String {
    format!("Assets/Materials/{}.itpmat", mesh_name)
}

/// Mesh document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDocument {
    pub metadata: Metadata,
    pub material: String,
    pub vertexformat: Vec<VertexFormatEntry>,
    pub vertices: Vec<Vec<Scalar>>,
    pub indices: Vec<[u32; 3]>,
}

impl MeshDocument {
    /// Create an empty document for a mesh with the given format flags
    pub fn new(mesh_name: &str, format: u8) -> Self {
        Self {
            metadata: Metadata::new(ITP_MESH_TYPE, ITP_MESH_VERSION),
            material: material_path(mesh_name),
            vertexformat: vertex_components(format).iter().map(Into::into).collect(),
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Whether the header identifies a supported mesh document
    pub fn is_supported(&self) -> bool {
        self.metadata.kind == ITP_MESH_TYPE && self.metadata.version == ITP_MESH_VERSION
    }
}
