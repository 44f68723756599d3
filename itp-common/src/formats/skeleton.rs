//! ITP skeleton document (.itpskel)
//!
//! Bones are listed in registration order. `parentIndex` refers to an earlier
//! entry of the same list, or is `-1` for a root. Bind poses are parent-relative.

use serde::{Deserialize, Serialize};

use super::Metadata;

/// File extension for skeleton documents
pub const ITP_SKELETON_EXT: &str = "itpskel";
/// Skeleton document version
pub const ITP_SKELETON_VERSION: u32 = 1;

const ITP_SKELETON_TYPE: &str = "itpskel";

/// Bind pose of one bone relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BindPoseDocument {
    /// Quaternion rotation [x, y, z, w]
    pub rot: [f32; 4],
    /// Translation
    pub trans: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoneDocument {
    pub name: String,
    pub parent_index: i32,
    pub bind_pose: BindPoseDocument,
}

/// Skeleton document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonDocument {
    pub metadata: Metadata,
    pub bonecount: u32,
    pub bones: Vec<BoneDocument>,
}

impl SkeletonDocument {
    pub fn new(bones: Vec<BoneDocument>) -> Self {
        Self {
            metadata: Metadata::new(ITP_SKELETON_TYPE, ITP_SKELETON_VERSION),
            bonecount: bones.len() as u32,
            bones,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_fields() {
        let doc = SkeletonDocument::new(vec![BoneDocument {
            name: "root".to_string(),
            parent_index: -1,
            bind_pose: BindPoseDocument {
                rot: [0.0, 0.0, 0.0, 1.0],
                trans: [0.0, 1.0, 0.0],
            },
        }]);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["metadata"]["type"], "itpskel");
        assert_eq!(value["bonecount"], 1);
        assert_eq!(value["bones"][0]["parentIndex"], -1);
        assert_eq!(value["bones"][0]["bindPose"]["rot"][3], 1.0);
        assert_eq!(value["bones"][0]["bindPose"]["trans"][1], 1.0);
    }
}
