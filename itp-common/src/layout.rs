//! Vertex layout
//!
//! Exported vertices are flat scalar lists. Components appear in a fixed order,
//! each one only when its format flag is set:
//!
//! ```text
//! position  float × 3   (always)
//! normal    float × 3   FORMAT_NORMAL
//! tangent   float × 3   FORMAT_TANGENT
//! bones     byte  × 4   FORMAT_SKINNED
//! weights   byte  × 4   FORMAT_SKINNED
//! texcoord  float × 2   FORMAT_UV
//! ```
//!
//! Blend-shape deltas use the same ordering restricted to position, normal and tangent.

// ============================================================================
// Vertex Format Constants
// ============================================================================

/// Vertex format flag: Has normals (3 floats)
pub const FORMAT_NORMAL: u8 = 1;
/// Vertex format flag: Has tangents (3 floats)
pub const FORMAT_TANGENT: u8 = 2;
/// Vertex format flag: Has bone indices + quantized weights (4 + 4 bytes)
pub const FORMAT_SKINNED: u8 = 4;
/// Vertex format flag: Has UV coordinates (2 floats)
pub const FORMAT_UV: u8 = 8;

/// Scalar type of a vertex component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    Float,
    Byte,
}

impl ComponentType {
    /// Name used in the `vertexformat` document entry
    pub const fn as_str(self) -> &'static str {
        match self {
            ComponentType::Float => "float",
            ComponentType::Byte => "byte",
        }
    }
}

/// One named component of the vertex layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub name: &'static str,
    pub ty: ComponentType,
    pub count: u32,
}

const POSITION: Component = Component {
    name: "position",
    ty: ComponentType::Float,
    count: 3,
};
const NORMAL: Component = Component {
    name: "normal",
    ty: ComponentType::Float,
    count: 3,
};
const TANGENT: Component = Component {
    name: "tangent",
    ty: ComponentType::Float,
    count: 3,
};
const BONES: Component = Component {
    name: "bones",
    ty: ComponentType::Byte,
    count: 4,
};
const WEIGHTS: Component = Component {
    name: "weights",
    ty: ComponentType::Byte,
    count: 4,
};
const TEXCOORD: Component = Component {
    name: "texcoord",
    ty: ComponentType::Float,
    count: 2,
};

/// Components present in a mesh vertex, in emission order
pub fn vertex_components(format: u8) -> Vec<Component> {
    let mut components = vec![POSITION];
    if format & FORMAT_NORMAL != 0 {
        components.push(NORMAL);
    }
    if format & FORMAT_TANGENT != 0 {
        components.push(TANGENT);
    }
    if format & FORMAT_SKINNED != 0 {
        components.push(BONES);
        components.push(WEIGHTS);
    }
    if format & FORMAT_UV != 0 {
        components.push(TEXCOORD);
    }
    components
}

/// Components present in a blend-shape delta, in emission order
///
/// Only the normal and tangent flags are meaningful here.
pub fn blend_components(format: u8) -> Vec<Component> {
    vertex_components(format & (FORMAT_NORMAL | FORMAT_TANGENT))
}

/// Number of scalars written per mesh vertex
#[inline]
pub const fn vertex_scalar_count(format: u8) -> usize {
    let mut count = 3; // Position

    if format & FORMAT_NORMAL != 0 {
        count += 3;
    }
    if format & FORMAT_TANGENT != 0 {
        count += 3;
    }
    if format & FORMAT_SKINNED != 0 {
        count += 8; // Bone indices (u8x4) + weights (u8x4)
    }
    if format & FORMAT_UV != 0 {
        count += 2;
    }

    count
}

/// Number of scalars written per blend-shape delta
#[inline]
pub const fn blend_scalar_count(format: u8) -> usize {
    vertex_scalar_count(format & (FORMAT_NORMAL | FORMAT_TANGENT))
}
