//! Bone hierarchy builder
//!
//! Collects bind matrices while skin clusters are scanned, then rebuilds the bone
//! tree: parents are found by walking the source node hierarchy, and every bind
//! pose is re-expressed relative to its parent bone.
//!
//! Bones are stored in a flat list and reference their parent by index.

use glam::{EulerRot, Mat4, Quat, Vec3};
use hashbrown::HashMap;

use crate::source::{MeshSource, NodeId};

/// Parent index of a root bone
pub const ROOT_PARENT: i32 = -1;

/// Parent-relative bind transform of a bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindPose {
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for BindPose {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
        }
    }
}

impl BindPose {
    /// Split a parent-relative bind matrix into rotation and translation
    ///
    /// The rotation goes through XYZ Euler angles (X applied first) and is
    /// recomposed with [`quat_from_euler`].
    pub fn from_local(local: Mat4) -> Self {
        let translation = local.w_axis.truncate();
        let (_scale, rotation, _translation) = local.to_scale_rotation_translation();
        let (roll, yaw, pitch) = rotation.to_euler(EulerRot::ZYX);
        Self {
            rotation: quat_from_euler(pitch, yaw, roll),
            translation,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    /// Index of the parent bone in the same list, or [`ROOT_PARENT`]
    pub parent_index: i32,
    pub bind_pose: BindPose,
}

/// Compose a quaternion from Euler angles in radians
///
/// `pitch` is the X angle, `yaw` the Y angle and `roll` the Z angle.
pub fn quat_from_euler(pitch: f32, yaw: f32, roll: f32) -> Quat {
    let (sy, cy) = (yaw * 0.5).sin_cos();
    let (sp, cp) = (pitch * 0.5).sin_cos();
    let (sr, cr) = (roll * 0.5).sin_cos();

    Quat::from_xyzw(
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
        cr * cp * cy + sr * sp * sy,
    )
}

/// Bind transform of a link in mesh space
pub fn mesh_space_bind(link_bind_global: Mat4, mesh_bind_global: Mat4) -> Mat4 {
    link_bind_global * mesh_bind_global.inverse()
}

/// Whether a stored bind sample should give way to a later one for the same bone
///
/// A first sample whose translation is exactly zero is treated as never having
/// been filled in. This is a heuristic kept for output compatibility: a bone that
/// genuinely sits at the mesh origin will take whatever a later cluster reports.
pub fn bind_sample_is_unset(mesh_space_bind: &Mat4) -> bool {
    mesh_space_bind.w_axis.truncate() == Vec3::ZERO
}

#[derive(Debug, Clone)]
struct BoneEntry {
    name: String,
    link: Option<NodeId>,
    mesh_space_bind: Mat4,
}

/// Accumulates bind samples per bone index, then builds the [`Bone`] list
#[derive(Debug, Default)]
pub struct SkeletonBuilder {
    entries: Vec<BoneEntry>,
}

impl SkeletonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a bind sample for bone `index`
    ///
    /// New bones must arrive in index order. A bone without a link node gets an
    /// identity bind pose and stays a root.
    pub fn observe(
        &mut self,
        index: usize,
        name: &str,
        link: Option<NodeId>,
        link_bind_global: Mat4,
        mesh_bind_global: Mat4,
    ) {
        let bind = match link {
            Some(_) => mesh_space_bind(link_bind_global, mesh_bind_global),
            None => Mat4::IDENTITY,
        };

        if index == self.entries.len() {
            self.entries.push(BoneEntry {
                name: name.to_string(),
                link,
                mesh_space_bind: bind,
            });
            return;
        }

        let Some(entry) = self.entries.get_mut(index) else {
            tracing::warn!("Bind sample for bone {} arrived out of order, ignored", index);
            return;
        };
        if link.is_some() && bind_sample_is_unset(&entry.mesh_space_bind) {
            tracing::debug!("Replacing zero-translation bind sample of bone '{}'", entry.name);
            entry.mesh_space_bind = bind;
        }
    }

    /// Resolve parents and convert bind poses to parent-relative form
    ///
    /// Bones come out parents-first: a bone registered before its parent is
    /// moved behind it. Otherwise registration order is kept.
    pub fn build<S: MeshSource + ?Sized>(self, source: &S) -> Skeleton {
        // Unlinked bones carry synthesized names and never act as parents
        let by_name: HashMap<&str, usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.link.is_some())
            .map(|(i, entry)| (entry.name.as_str(), i))
            .collect();

        let mut parents: Vec<Option<usize>> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                entry
                    .link
                    .and_then(|link| find_parent_bone(source, link, i, &by_name))
            })
            .collect();
        break_cycles(&mut parents);

        let order = parents_first_order(&parents);
        let mut remap = vec![0usize; order.len()];
        for (output, &registered) in order.iter().enumerate() {
            remap[registered] = output;
        }
        if order.iter().enumerate().any(|(output, &registered)| output != registered) {
            tracing::debug!("Bones reordered so parents precede children");
        }

        let bones = order
            .iter()
            .map(|&registered| {
                let entry = &self.entries[registered];
                let parent = parents[registered];
                let local = match parent {
                    Some(p) => self.entries[p].mesh_space_bind.inverse() * entry.mesh_space_bind,
                    None => entry.mesh_space_bind,
                };
                let bone = Bone {
                    name: entry.name.clone(),
                    parent_index: parent.map_or(ROOT_PARENT, |p| remap[p] as i32),
                    bind_pose: BindPose::from_local(local),
                };
                tracing::debug!("Bone '{}' parent={}", bone.name, bone.parent_index);
                bone
            })
            .collect();

        Skeleton { bones, remap }
    }
}

/// Built bone list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    /// Bones in output order; every parent precedes its children
    pub bones: Vec<Bone>,
    /// Registration index -> index into `bones`
    pub remap: Vec<usize>,
}

/// Registration indices ordered so that each bone follows its parent
///
/// `parents` must be acyclic.
fn parents_first_order(parents: &[Option<usize>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(parents.len());
    let mut placed = vec![false; parents.len()];
    let mut chain = Vec::new();

    for bone in 0..parents.len() {
        let mut current = Some(bone);
        while let Some(b) = current {
            if placed[b] || chain.contains(&b) {
                break;
            }
            chain.push(b);
            current = parents[b];
        }
        while let Some(b) = chain.pop() {
            placed[b] = true;
            order.push(b);
        }
    }

    order
}

/// Walk up from `link` to the nearest ancestor node that is itself a bone
fn find_parent_bone<S: MeshSource + ?Sized>(
    source: &S,
    link: NodeId,
    bone: usize,
    by_name: &HashMap<&str, usize>,
) -> Option<usize> {
    let mut node = source.node_parent(link);
    while let Some(current) = node {
        if let Some(&candidate) = source.node_name(current).and_then(|name| by_name.get(name)) {
            if candidate != bone {
                return Some(candidate);
            }
        }
        node = source.node_parent(current);
    }
    None
}

/// Detach any bone whose parent chain loops back onto itself
///
/// Only possible when node names repeat across the hierarchy.
fn break_cycles(parents: &mut [Option<usize>]) {
    for start in 0..parents.len() {
        let mut current = parents[start];
        let mut steps = 0;
        while let Some(p) = current {
            if p == start {
                tracing::warn!("Bone {} is its own ancestor, detached as root", start);
                parents[start] = None;
                break;
            }
            steps += 1;
            if steps > parents.len() {
                break;
            }
            current = parents[p];
        }
    }
}
