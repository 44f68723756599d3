//! ITP blend-shape document (.itpblend)
//!
//! One document per blend shape. `deltas` has exactly one entry per vertex of
//! the mesh it was extracted from, in vertex-buffer order.

use serde::{Deserialize, Serialize};

use super::{Metadata, VertexFormatEntry};
use crate::layout::blend_components;

/// File extension for blend-shape documents
pub const ITP_BLEND_EXT: &str = "itpblend";
/// Blend-shape document version
pub const ITP_BLEND_VERSION: u32 = 1;

const ITP_BLEND_TYPE: &str = "itpblend";

/// Blend-shape document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendDocument {
    pub metadata: Metadata,
    pub name: String,
    pub vertexformat: Vec<VertexFormatEntry>,
    pub deltas: Vec<Vec<f32>>,
}

impl BlendDocument {
    /// Create an empty document; only the normal/tangent bits of `format` are used
    pub fn new(name: &str, format: u8) -> Self {
        Self {
            metadata: Metadata::new(ITP_BLEND_TYPE, ITP_BLEND_VERSION),
            name: name.to_string(),
            vertexformat: blend_components(format).iter().map(Into::into).collect(),
            deltas: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FORMAT_TANGENT, FORMAT_UV};

    #[test]
    fn test_blend_format_entries() {
        let doc = BlendDocument::new("Smile", FORMAT_TANGENT | FORMAT_UV);
        let names: Vec<_> = doc.vertexformat.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["position", "tangent"]);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["metadata"]["type"], "itpblend");
        assert_eq!(value["metadata"]["version"], 1);
        assert_eq!(value["name"], "Smile");
    }
}
