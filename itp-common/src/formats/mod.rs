//! ITP document formats
//!
//! Exported assets are JSON documents. Every document starts with a
//! [`Metadata`] block naming its type and version, followed by the payload.
//! These types only describe the documents; encoding is left to `serde_json`
//! (or any other serde backend) on the writing side.

pub mod blend;
pub mod mesh;
pub mod skeleton;

pub use blend::*;
pub use mesh::*;
pub use skeleton::*;

use serde::{Deserialize, Serialize};

use crate::layout::Component;

/// Document header shared by every ITP document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: u32,
}

impl Metadata {
    pub fn new(kind: &str, version: u32) -> Self {
        Self {
            kind: kind.to_string(),
            version,
        }
    }
}

/// One entry of a `vertexformat` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexFormatEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub count: u32,
}

impl From<&Component> for VertexFormatEntry {
    fn from(component: &Component) -> Self {
        Self {
            name: component.name.to_string(),
            ty: component.ty.as_str().to_string(),
            count: component.count,
        }
    }
}

/// A single vertex scalar: bone bytes stay integral, everything else is a float
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Byte(u8),
    Float(f32),
}
