//! itp-export - ITP mesh export tool
//!
//! Converts JSON scene descriptions to runtime mesh documents
//! (.itpmesh3, .itpskel, .itpblend)

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use itp_export::{manifest, pipeline, scene, ExportConfig};

#[derive(Parser)]
#[command(name = "itp-export")]
#[command(about = "ITP mesh export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build all scenes from a manifest file
    Build {
        /// Path to itp.toml manifest
        #[arg(default_value = "itp.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without building
    Check {
        /// Path to itp.toml manifest
        #[arg(default_value = "itp.toml")]
        manifest: PathBuf,
    },

    /// Export every mesh of a single scene file
    Scene {
        /// Input scene file (JSON)
        input: PathBuf,

        /// Output directory (default: next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip skin cluster processing
        #[arg(long)]
        no_skinning: bool,

        /// Skip blend-shape extraction
        #[arg(long)]
        no_blend_shapes: bool,

        /// Fail on any diagnostic instead of writing partial results
        #[arg(long)]
        strict: bool,
    },

    /// List the meshes in a scene file
    List {
        /// Input scene file (JSON)
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { manifest, output } => {
            tracing::info!("Building scenes from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            let written = manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete! {} files written", written.len());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Scene {
            input,
            output,
            no_skinning,
            no_blend_shapes,
            strict,
        } => {
            let output = output.unwrap_or_else(|| {
                input
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_default()
            });
            let config = ExportConfig {
                compute_skinning: !no_skinning,
                compute_blend_shapes: !no_blend_shapes,
            };
            tracing::info!("Converting {:?} -> {:?}", input, output);
            let written = pipeline::convert_scene(&input, &output, &config, strict)?;
            tracing::info!("Done! {} files written", written.len());
        }

        Commands::List { input } => {
            scene::list_meshes(&input)?;
        }
    }

    Ok(())
}
