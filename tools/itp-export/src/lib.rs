//! itp-export library
//!
//! Converts scene meshes into deduplicated runtime meshes with packed skin
//! influences, a parent-relative bone hierarchy and blend-shape deltas.
//! The stages can be driven one mesh at a time through [`process_mesh`] with
//! any [`MeshSource`], or over whole scene files through [`convert_scene`].

pub mod blend;
pub mod diagnostic;
pub mod formats;
pub mod manifest;
pub mod mesh;
pub mod pipeline;
pub mod scene;
pub mod skeleton;
pub mod skin;
pub mod source;

#[cfg(test)]
mod test_support;

// Re-export vertex format constants from itp-common
pub use itp_common::{FORMAT_NORMAL, FORMAT_SKINNED, FORMAT_TANGENT, FORMAT_UV};

// Re-export key types for mesh conversion
pub use diagnostic::Diagnostic;
pub use pipeline::{
    convert_scene, convert_scene_into, convert_scene_to_memory, process_mesh, ExportConfig,
    OutputNames, ProcessedMesh,
};
pub use scene::{Scene, SceneError, SceneMeshSource};
pub use skeleton::{Bone, Skeleton};
pub use source::{
    AttributeSample, BlendChannel, GeometryElement, MappingMode, MeshChannels, MeshSource,
    NodeId, ReferenceMode, SkinCluster, TargetShape,
};
