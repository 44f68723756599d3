//! JSON scene generation for integration tests.
//!
//! Generates a scene with:
//! - A skinned strip of two quads ("Strip") with a UV seam at control point 3
//! - 3-bone chain (root -> spine -> head) stacked one unit apart
//! - Blend channels "Stretch" (one target) and "Face" (two targets, the second
//!   with the wrong control point count)
//! - A second, unnamed and unskinned triangle mesh

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::Path;

/// Bone count of the generated skeleton
pub const BONE_COUNT: usize = 3;
/// Unique vertices of the strip after deduplication
pub const STRIP_VERTEX_COUNT: usize = 7;
/// Control points of the strip
pub const STRIP_CONTROL_POINTS: usize = 6;

/// Column-major translation matrix, as glam serializes a `Mat4`
fn translation(y: f32) -> Value {
    json!([1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, y, 0, 1])
}

fn strip_positions(lift: f32) -> Vec<[f32; 3]> {
    vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 2.0 + lift, 0.0],
        [0.0, 2.0 + lift, 0.0],
    ]
}

fn strip_mesh() -> Value {
    json!({
        "name": "Strip",
        "node": 3,
        "control_points": strip_positions(0.0),
        "polygons": [[0, 1, 2, 3], [3, 2, 4, 5]],
        "normals": {
            "mapping": "by_control_point",
            "reference": "direct",
            "direct": [[0, 0, 1], [0, 0, 1], [0, 0, 1], [0, 0, 1], [0, 0, 1], [0, 0, 1]]
        },
        "uvs": {
            "mapping": "by_polygon_vertex",
            "reference": "direct",
            "direct": [
                [0, 0], [1, 0], [1, 0.5], [0, 0.5],
                [0, 0.6], [1, 0.5], [1, 1], [0, 1]
            ]
        },
        "skin": [
            {
                "link": 0,
                "influences": [[0, 1.0], [1, 1.0], [2, 0.5], [3, 0.5]],
                "link_bind_global": translation(0.0)
            },
            {
                "link": 1,
                "influences": [[2, 0.5], [3, 0.5], [4, 0.25], [5, 0.25]],
                "link_bind_global": translation(1.0)
            },
            {
                "link": 2,
                "influences": [[4, 0.75], [5, 0.75]],
                "link_bind_global": translation(2.0)
            }
        ],
        "blend_channels": [
            {
                "name": "Stretch",
                "targets": [{ "positions": strip_positions(1.0) }]
            },
            {
                "name": "Face",
                "targets": [
                    { "positions": strip_positions(0.0) },
                    { "positions": [[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0], [1, 2, 0]] }
                ]
            }
        ]
    })
}

fn plain_triangle() -> Value {
    json!({
        "control_points": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
        "polygons": [[0, 1, 2]]
    })
}

/// Generate the full test scene
pub fn generate_scene() -> Value {
    json!({
        "nodes": [
            { "name": "root" },
            { "name": "spine", "parent": 0 },
            { "name": "head", "parent": 1 },
            { "name": "StripNode" }
        ],
        "meshes": [strip_mesh(), plain_triangle()]
    })
}

/// Scene with only the clean parts: no mismatched blend target
pub fn generate_clean_scene() -> Value {
    let mut scene = generate_scene();
    scene["meshes"][0]["blend_channels"][1]["targets"]
        .as_array_mut()
        .expect("targets array")
        .pop();
    scene
}

/// Write a scene to disk
pub fn write_scene(path: &Path, scene: &Value) -> std::io::Result<()> {
    let text = serde_json::to_string_pretty(scene).map_err(std::io::Error::other)?;
    std::fs::write(path, text)
}
