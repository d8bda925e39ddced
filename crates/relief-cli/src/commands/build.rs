//! relief build command - heightmap to ASCII STL.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use relief_mesh::{
    MeshHeights, PreviewPngSink, ReliefParams, ReliefPipeline, ReliefSink, ReliefStats,
    StlFileSink,
};
use serde::Serialize;

use crate::{Cli, OutputFormat, ParamArgs, output};

/// Flags only `build` takes. `None` keeps the config value.
#[derive(Default)]
pub struct BuildFlags {
    pub side_walls: Option<bool>,
    pub quantize: Option<bool>,
    pub name: Option<String>,
    pub preview: Option<PathBuf>,
}

impl BuildFlags {
    fn apply(&self, params: &mut ReliefParams) {
        if let Some(side_walls) = self.side_walls {
            params.side_walls = side_walls;
        }
        if let Some(quantize) = self.quantize {
            params.mesh_heights = if quantize {
                MeshHeights::Quantized
            } else {
                MeshHeights::Continuous
            };
        }
        if let Some(name) = &self.name {
            params.solid_name = name.clone();
        }
    }
}

#[derive(Serialize)]
struct BuildResult {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<String>,
    solid_name: String,
    facets_written: usize,
    stats: ReliefStats,
}

pub fn run(
    input: &Path,
    output_path: &Path,
    param_args: &ParamArgs,
    flags: BuildFlags,
    cli: &Cli,
) -> Result<()> {
    let mut params = super::resolve_params(param_args)?;
    flags.apply(&mut params);
    params.validate()?;

    output::info(
        &format!("Building relief from {}...", input.display()),
        cli.format,
        cli.quiet,
    );

    let relief = ReliefPipeline::from_source(input, params)
        .with_context(|| format!("Failed to load heightmap from {:?}", input))?
        .run()
        .with_context(|| "Relief computation failed")?;

    if let Some(preview_path) = &flags.preview {
        PreviewPngSink::new(preview_path)
            .consume(&relief)
            .with_context(|| format!("Failed to save preview to {:?}", preview_path))?;
    }

    let mut facets_written = 0;
    let written = if relief.is_empty() {
        output::warning("heightmap is flat; nothing to export", cli.quiet);
        None
    } else {
        let mut sink = StlFileSink::new(output_path);
        sink.consume(&relief)
            .with_context(|| format!("Failed to save STL to {:?}", output_path))?;
        facets_written = sink.facets_written;
        Some(output_path.display().to_string())
    };

    let result = BuildResult {
        input: input.display().to_string(),
        output: written,
        preview: flags.preview.as_ref().map(|p| p.display().to_string()),
        solid_name: relief.solid_name.clone(),
        facets_written,
        stats: relief.stats.clone(),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                if result.output.is_some() {
                    output::success(
                        &format!("Relief saved to {}", output_path.display()),
                        cli.format,
                        cli.quiet,
                    );
                }
                let stats = &result.stats;
                println!(
                    "  {}: {}x{}",
                    "Heightmap".cyan(),
                    stats.width,
                    stats.height
                );
                println!("  {}: {}", "Ridge cells".cyan(), stats.ridge_cells);
                println!(
                    "  {}: {} ({} top, {} floor, {} wall)",
                    "Facets".cyan(),
                    result.facets_written,
                    stats.top_triangles,
                    stats.floor_triangles,
                    stats.wall_triangles
                );
                println!(
                    "  {}: {:.3}",
                    "Max height".cyan(),
                    stats.max_fillet_height
                );
                if let Some(preview) = &result.preview {
                    println!("  {}: {}", "Preview".cyan(), preview);
                }
                println!("  {}: {:.1} ms", "Time".cyan(), stats.elapsed_ms);
            }
        }
    }

    Ok(())
}
