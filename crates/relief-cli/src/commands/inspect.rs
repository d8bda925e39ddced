//! relief inspect command - report what a build would produce.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use relief_mesh::{ReliefPipeline, ReliefStats};
use serde::Serialize;

use crate::{Cli, OutputFormat, ParamArgs, output};

#[derive(Serialize)]
struct InspectResult {
    path: String,
    z_scale: f64,
    z_cut: f64,
    stats: ReliefStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
}

#[derive(Serialize)]
struct BoundsInfo {
    min: [f64; 3],
    max: [f64; 3],
}

pub fn run(input: &Path, param_args: &ParamArgs, detailed: bool, cli: &Cli) -> Result<()> {
    let params = super::resolve_params(param_args)?;
    let relief = ReliefPipeline::from_source(input, params.clone())
        .with_context(|| format!("Failed to load heightmap from {:?}", input))?
        .run()
        .with_context(|| "Relief computation failed")?;

    let bounds = if detailed {
        relief.mesh.bounds().map(|(min, max)| BoundsInfo {
            min: [min.x, min.y, min.z],
            max: [max.x, max.y, max.z],
        })
    } else {
        None
    };

    let info = InspectResult {
        path: input.display().to_string(),
        z_scale: params.z_scale,
        z_cut: params.z_cut,
        stats: relief.stats.clone(),
        bounds,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                let s = &info.stats;
                println!("{}", "Relief Information".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                println!("  {}: {}x{}", "Size".cyan(), s.width, s.height);
                println!(
                    "  {}: {:.2} .. {:.2}",
                    "Raw heights".cyan(),
                    s.min_raw_height,
                    s.max_raw_height
                );
                println!("  {}: {}", "Inside cells".cyan(), s.inside_cells);
                println!("  {}: {}", "Ridge cells".cyan(), s.ridge_cells);
                println!(
                    "  {}: {:.3}",
                    "Longest fillet distance".cyan(),
                    s.longest_distance
                );
                println!("  {}: {:.3}", "Max height".cyan(), s.max_fillet_height);
                println!("  {}: {}", "Triangles".cyan(), s.total_triangles);

                if detailed {
                    println!("    {}: {}", "top".cyan(), s.top_triangles);
                    println!("    {}: {}", "floor".cyan(), s.floor_triangles);
                    println!("    {}: {}", "walls".cyan(), s.wall_triangles);
                    if let Some(ref b) = info.bounds {
                        println!(
                            "  {}: ({:.2}, {:.2}, {:.2})",
                            "Min bounds".cyan(),
                            b.min[0],
                            b.min[1],
                            b.min[2]
                        );
                        println!(
                            "  {}: ({:.2}, {:.2}, {:.2})",
                            "Max bounds".cyan(),
                            b.max[0],
                            b.max[1],
                            b.max[2]
                        );
                    }
                }

                if relief.is_empty() {
                    output::warning("heightmap is flat; build would export nothing", cli.quiet);
                }
            }
        }
    }

    Ok(())
}
