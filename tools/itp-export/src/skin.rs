//! Skin influence packing
//!
//! Skin clusters are scanned once per mesh. Each cluster registers its bone,
//! feeds a bind sample to the [`SkeletonBuilder`], and appends its weights to the
//! raw influence list of every control point it touches. The raw lists are then
//! quantized to four (bone, weight) byte slots per control point.

use hashbrown::HashMap;

use crate::diagnostic::{report, Diagnostic};
use crate::skeleton::{Bone, SkeletonBuilder};
use crate::source::MeshSource;

/// Maximum distinct bones per mesh (bone indices are stored as u8)
pub const MAX_BONES: usize = 256;

/// Influence slots per control point
pub const MAX_INFLUENCES: usize = 4;

/// Sum of the packed weight bytes of any skinned control point
pub const WEIGHT_SUM: u32 = 255;

/// Quantized skin influences of one control point
///
/// Unused slots are (0, 0). All-zero weights mean "unskinned".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PackedInfluence {
    pub bones: [u8; MAX_INFLUENCES],
    pub weights: [u8; MAX_INFLUENCES],
}

impl PackedInfluence {
    pub const UNSKINNED: Self = Self {
        bones: [0; MAX_INFLUENCES],
        weights: [0; MAX_INFLUENCES],
    };

    pub fn weight_sum(&self) -> u32 {
        self.weights.iter().map(|&w| w as u32).sum()
    }
}

/// Quantize raw (bone, weight) pairs into four byte slots
///
/// The strongest influences are kept, ordered by descending weight. Ties go to
/// the lower bone index, i.e. the bone registered first. Weights are scaled so
/// the bytes sum to exactly 255; the last kept influence absorbs the rounding
/// error.
pub fn pack_influences(influences: &[(u8, f32)]) -> PackedInfluence {
    let mut sorted: Vec<(u8, f32)> = influences
        .iter()
        .copied()
        .filter(|&(_, weight)| weight > 0.0)
        .collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    sorted.truncate(MAX_INFLUENCES);

    let total: f32 = sorted.iter().map(|&(_, weight)| weight).sum();
    if sorted.is_empty() || !(total > 0.0) {
        return PackedInfluence::UNSKINNED;
    }

    let mut packed = PackedInfluence::UNSKINNED;
    let mut acc = 0u32;
    let last = sorted.len() - 1;
    for (slot, &(bone, weight)) in sorted.iter().enumerate() {
        let remaining = WEIGHT_SUM - acc;
        let byte = if slot == last {
            remaining
        } else {
            let rounded = (weight / total * WEIGHT_SUM as f32).round() as u32;
            rounded.min(remaining)
        };
        acc += byte;
        packed.bones[slot] = bone;
        packed.weights[slot] = byte as u8;
    }

    packed
}

/// Rewrite the bone bytes of the first `used` slots through `remap`
///
/// A slot can be used with a zero weight byte when its share rounds down, so
/// the count comes from the raw list rather than from the weights.
fn remap_bones(mut packed: PackedInfluence, used: usize, remap: &[usize]) -> PackedInfluence {
    if packed.weight_sum() == 0 {
        return packed;
    }
    for slot in 0..used.min(MAX_INFLUENCES) {
        if let Some(&index) = remap.get(packed.bones[slot] as usize) {
            packed.bones[slot] = index as u8;
        }
    }
    packed
}

/// Assigns bone indices by first encounter of a bone name
#[derive(Debug, Default)]
pub struct BoneRegistry {
    names: Vec<String>,
    lookup: HashMap<String, u8>,
}

impl BoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `name`, registering it if new
    ///
    /// Returns `None` once [`MAX_BONES`] distinct names are registered and
    /// `name` is not one of them.
    pub fn register(&mut self, name: &str) -> Option<u8> {
        if let Some(&index) = self.lookup.get(name) {
            return Some(index);
        }
        if self.names.len() >= MAX_BONES {
            return None;
        }
        let index = self.names.len() as u8;
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), index);
        Some(index)
    }

    /// Register a bone that no name lookup may ever return
    ///
    /// Used for clusters without a resolvable link node, whose names are
    /// synthesized and could collide with a real node name.
    pub fn register_unlinked(&mut self, name: &str) -> Option<u8> {
        if self.names.len() >= MAX_BONES {
            return None;
        }
        let index = self.names.len() as u8;
        self.names.push(name.to_string());
        Some(index)
    }

    pub fn index_of(&self, name: &str) -> Option<u8> {
        self.lookup.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Output of a skin cluster scan
#[derive(Debug, Clone, Default)]
pub struct SkinScan {
    /// Bone list, parents before children
    pub bones: Vec<Bone>,
    /// One packed influence per control point, indexing into `bones`
    pub influences: Vec<PackedInfluence>,
}

impl SkinScan {
    pub fn is_skinned(&self) -> bool {
        !self.bones.is_empty()
    }

    /// Packed influence of a control point (unskinned if out of range)
    pub fn influence(&self, control_point: u32) -> PackedInfluence {
        self.influences
            .get(control_point as usize)
            .copied()
            .unwrap_or(PackedInfluence::UNSKINNED)
    }
}

/// Scan all skin clusters of a mesh
///
/// Registers bones, collects bind samples and packs per-control-point influences.
/// Influences are packed against registration indices and then rewritten to
/// the parents-first order of the built skeleton.
pub fn scan_skin<S: MeshSource + ?Sized>(source: &S, diagnostics: &mut Vec<Diagnostic>) -> SkinScan {
    let control_points = source.control_point_count();
    let mut registry = BoneRegistry::new();
    let mut skeleton = SkeletonBuilder::new();
    let mut raw: Vec<Vec<(u8, f32)>> = vec![Vec::new(); control_points];

    for (cluster_index, cluster) in source.skin_clusters().iter().enumerate() {
        let link_name = cluster
            .link
            .and_then(|node| source.node_name(node).map(|name| (node, name.to_string())));
        let (link, name) = match link_name {
            Some((node, name)) => (Some(node), name),
            None => (None, format!("bone_{}", registry.len())),
        };

        let registered = match link {
            Some(_) => registry.register(&name),
            None => registry.register_unlinked(&name),
        };
        let Some(bone) = registered else {
            report(
                diagnostics,
                Diagnostic::BoneOverflow {
                    name,
                    limit: MAX_BONES,
                },
            );
            continue;
        };

        if link.is_none() {
            report(
                diagnostics,
                Diagnostic::UnresolvedLink {
                    cluster: cluster_index,
                    name: name.clone(),
                },
            );
        }

        skeleton.observe(
            bone as usize,
            &name,
            link,
            cluster.link_bind_global,
            cluster.mesh_bind_global,
        );

        let mut out_of_range = 0;
        for &(control_point, weight) in &cluster.influences {
            match raw.get_mut(control_point as usize) {
                Some(list) if weight > 0.0 => list.push((bone, weight)),
                Some(_) => {}
                None => out_of_range += 1,
            }
        }
        if out_of_range > 0 {
            report(
                diagnostics,
                Diagnostic::InfluenceOutOfRange {
                    bone: name,
                    count: out_of_range,
                    control_points,
                },
            );
        }
    }

    let skeleton = skeleton.build(source);
    let influences = raw
        .iter()
        .map(|list| remap_bones(pack_influences(list), list.len(), &skeleton.remap))
        .collect();
    let bones = skeleton.bones;

    tracing::debug!(
        "Skin scan: {} clusters, {} bones, {} control points",
        source.skin_clusters().len(),
        bones.len(),
        control_points
    );

    SkinScan { bones, influences }
}
