//! Mesh processing pipeline
//!
//! Runs the stages for one mesh in order: skin cluster scan, corner
//! deduplication, blend-shape extraction. Each stage reads the previous
//! stage's output and owns its own.
//!
//! [`convert_scene`] runs every mesh of a scene file and hands the results to
//! the document writers. Output names are made unique first, since every mesh
//! of a run writes into the same directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hashbrown::HashSet;
use itp_common::{FORMAT_NORMAL, FORMAT_SKINNED, FORMAT_TANGENT, FORMAT_UV};

use crate::blend::{extract_blend_shapes, BlendShape};
use crate::diagnostic::{report, Diagnostic};
use crate::formats::{file_stem, write_outputs};
use crate::mesh::{deduplicate, DedupMesh};
use crate::scene::Scene;
use crate::skeleton::Bone;
use crate::skin::{scan_skin, SkinScan};
use crate::source::MeshSource;

/// Optional passes of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportConfig {
    /// Scan skin clusters and pack bone influences into vertices
    pub compute_skinning: bool,
    /// Extract blend-shape deltas
    pub compute_blend_shapes: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            compute_skinning: true,
            compute_blend_shapes: true,
        }
    }
}

/// Everything produced for one mesh
#[derive(Debug, Clone)]
pub struct ProcessedMesh {
    pub name: String,
    /// Vertex format flags (`FORMAT_*`)
    pub format: u8,
    pub mesh: DedupMesh,
    pub bones: Vec<Bone>,
    pub blend_shapes: Vec<BlendShape>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ProcessedMesh {
    pub fn is_skinned(&self) -> bool {
        self.format & FORMAT_SKINNED != 0
    }
}

/// Process one mesh
pub fn process_mesh<S: MeshSource + ?Sized>(source: &S, config: &ExportConfig) -> ProcessedMesh {
    let mut diagnostics = Vec::new();

    let skin = if config.compute_skinning && !source.skin_clusters().is_empty() {
        scan_skin(source, &mut diagnostics)
    } else {
        SkinScan::default()
    };

    let channels = source.channels();
    let mut format = 0u8;
    if channels.normals {
        format |= FORMAT_NORMAL;
    }
    if channels.tangents {
        format |= FORMAT_TANGENT;
    }
    if skin.is_skinned() {
        format |= FORMAT_SKINNED;
    }
    if channels.uvs {
        format |= FORMAT_UV;
    }

    let influences = skin.is_skinned().then_some(skin.influences.as_slice());
    let mesh = deduplicate(source, influences);

    let blend_shapes = if config.compute_blend_shapes {
        extract_blend_shapes(source, &mesh, format, &mut diagnostics)
    } else {
        Vec::new()
    };

    tracing::info!(
        "Processed mesh '{}': {} vertices, {} triangles, {} bones, {} blend shapes, format={}",
        source.name(),
        mesh.vertices.len(),
        mesh.triangles.len(),
        skin.bones.len(),
        blend_shapes.len(),
        format
    );

    ProcessedMesh {
        name: source.name().to_string(),
        format,
        mesh,
        bones: skin.bones,
        blend_shapes,
        diagnostics,
    }
}

/// File stems already claimed in one output directory
///
/// Comparison ignores case so clashing names stay distinct on case-insensitive
/// filesystems too.
#[derive(Debug, Default)]
pub struct OutputNames {
    meshes: HashSet<String>,
    blends: HashSet<String>,
}

impl OutputNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give every mesh and blend shape a file-safe name not yet claimed
    ///
    /// A clashing name gets the first free `_1`, `_2`, ... suffix. Every rename
    /// is reported on the mesh's diagnostics.
    pub fn assign(&mut self, processed: &mut [ProcessedMesh]) {
        for mesh in processed.iter_mut() {
            let stem = claim(&mut self.meshes, &mesh.name);
            if stem != mesh.name {
                let name = std::mem::replace(&mut mesh.name, stem.clone());
                report(
                    &mut mesh.diagnostics,
                    Diagnostic::RenamedOutput {
                        kind: "mesh".to_string(),
                        name,
                        file: stem,
                    },
                );
            }

            for shape in &mut mesh.blend_shapes {
                let stem = claim(&mut self.blends, &shape.name);
                if stem != shape.name {
                    let name = std::mem::replace(&mut shape.name, stem.clone());
                    report(
                        &mut mesh.diagnostics,
                        Diagnostic::RenamedOutput {
                            kind: "blend shape".to_string(),
                            name,
                            file: stem,
                        },
                    );
                }
            }
        }
    }
}

fn claim(taken: &mut HashSet<String>, name: &str) -> String {
    let base = file_stem(name);
    let mut candidate = base.clone();
    let mut suffix = 1;
    while !taken.insert(candidate.to_lowercase()) {
        candidate = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    candidate
}

/// Process every mesh of a scene file without writing anything
pub fn convert_scene_to_memory(input: &Path, config: &ExportConfig) -> Result<Vec<ProcessedMesh>> {
    let scene = Scene::load(input)?;
    if scene.meshes.is_empty() {
        tracing::warn!("No meshes found in {:?}", input);
    }
    Ok(scene
        .mesh_sources()
        .map(|source| process_mesh(&source, config))
        .collect())
}

/// Process a scene file and write its documents into `output_dir`
///
/// With `strict`, any diagnostic fails the run before a single file is written.
/// Renamed outputs count as diagnostics.
pub fn convert_scene(
    input: &Path,
    output_dir: &Path,
    config: &ExportConfig,
    strict: bool,
) -> Result<Vec<PathBuf>> {
    convert_scene_into(input, output_dir, config, strict, &mut OutputNames::new())
}

/// [`convert_scene`] against names already claimed by earlier scenes of the
/// same output directory
pub fn convert_scene_into(
    input: &Path,
    output_dir: &Path,
    config: &ExportConfig,
    strict: bool,
    names: &mut OutputNames,
) -> Result<Vec<PathBuf>> {
    let mut processed = convert_scene_to_memory(input, config)?;
    names.assign(&mut processed);

    if strict {
        let problems: Vec<String> = processed
            .iter()
            .flat_map(|mesh| {
                mesh.diagnostics
                    .iter()
                    .map(move |d| format!("{}: {}", mesh.name, d))
            })
            .collect();
        if !problems.is_empty() {
            anyhow::bail!(
                "{:?} produced {} diagnostic(s) in strict mode:\n  {}",
                input,
                problems.len(),
                problems.join("\n  ")
            );
        }
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut written = Vec::new();
    for mesh in &processed {
        written.extend(write_outputs(mesh, output_dir)?);
    }
    Ok(written)
}
