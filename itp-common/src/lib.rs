//! Shared types for ITP mesh assets
//!
//! This crate provides the pieces shared between:
//! - `itp-export` (asset pipeline)
//! - runtime loaders that read the exported documents
//!
//! # Modules
//!
//! - [`layout`] - Vertex format flags and per-vertex component layout
//! - [`formats`] - JSON document formats (`.itpmesh3`, `.itpskel`, `.itpblend`)

pub mod formats;
pub mod layout;

// Re-export commonly used layout items
pub use layout::{
    Component, ComponentType, FORMAT_NORMAL, FORMAT_SKINNED, FORMAT_TANGENT, FORMAT_UV,
    blend_components, blend_scalar_count, vertex_components, vertex_scalar_count,
};

// Re-export commonly used format items
pub use formats::{
    BindPoseDocument, BlendDocument, BoneDocument, ITP_BLEND_EXT, ITP_BLEND_VERSION,
    ITP_MESH_EXT, ITP_MESH_VERSION, ITP_SKELETON_EXT, ITP_SKELETON_VERSION, Metadata,
    MeshDocument, Scalar, SkeletonDocument, VertexFormatEntry, material_path,
};
