//! Manifest parsing and build orchestration
//!
//! Parses itp.toml and converts every scene it lists.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::pipeline::{convert_scene_into, ExportConfig, OutputNames};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub scenes: BTreeMap<String, SceneEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/")
}

fn default_true() -> bool {
    true
}

/// Manifest-wide export switches
#[derive(Debug, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_true")]
    pub skinning: bool,
    #[serde(default = "default_true")]
    pub blend_shapes: bool,
    /// Fail the build on any diagnostic
    #[serde(default)]
    pub strict: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            skinning: true,
            blend_shapes: true,
            strict: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SceneEntry {
    Simple(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(default)]
        skinning: Option<bool>,
        #[serde(default)]
        blend_shapes: Option<bool>,
    },
}

impl SceneEntry {
    pub fn path(&self) -> &Path {
        match self {
            SceneEntry::Simple(p) => p,
            SceneEntry::Detailed { path, .. } => path,
        }
    }

    /// Effective pipeline configuration, entry overrides on top of manifest defaults
    pub fn config(&self, defaults: &ExportSettings) -> ExportConfig {
        let (skinning, blend_shapes) = match self {
            SceneEntry::Simple(_) => (None, None),
            SceneEntry::Detailed {
                skinning,
                blend_shapes,
                ..
            } => (*skinning, *blend_shapes),
        };
        ExportConfig {
            compute_skinning: skinning.unwrap_or(defaults.skinning),
            compute_blend_shapes: blend_shapes.unwrap_or(defaults.blend_shapes),
        }
    }
}

/// Load and parse a manifest file
///
/// Relative scene paths and the output directory are resolved against the
/// manifest's directory.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;

    if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        manifest.output.dir = base.join(&manifest.output.dir);
        for entry in manifest.scenes.values_mut() {
            match entry {
                SceneEntry::Simple(p) => *p = base.join(&*p),
                SceneEntry::Detailed { path, .. } => *path = base.join(&*path),
            }
        }
    }

    Ok(manifest)
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    for (name, entry) in &manifest.scenes {
        if !entry.path().exists() {
            anyhow::bail!("Scene '{}' source not found: {:?}", name, entry.path());
        }
    }
    Ok(())
}

/// Build all scenes from a manifest, returning the written paths
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<Vec<PathBuf>> {
    let output_dir = output_override.unwrap_or(&manifest.output.dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    // Every scene writes into the same directory
    let mut names = OutputNames::new();
    let mut written = Vec::new();
    for (name, entry) in &manifest.scenes {
        tracing::info!("Converting scene: {} -> {:?}", name, output_dir);
        let config = entry.config(&manifest.export);
        let files = convert_scene_into(
            entry.path(),
            output_dir,
            &config,
            manifest.export.strict,
            &mut names,
        )
        .with_context(|| format!("Failed to convert scene '{}'", name))?;
        written.extend(files);
    }

    Ok(written)
}
