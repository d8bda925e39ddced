//! relief: turn grayscale heightmaps into filleted STL reliefs.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=relief_mesh=info` - Stage summaries
//! - `RUST_LOG=relief_mesh=debug` - Per-stage details
//! - `RUST_LOG=relief_mesh::timing=info` - Stage timings
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Closed relief for printing, with a preview of the fillet heights
//! relief build logo.png -o logo.stl --side-walls --preview logo-preview.png
//!
//! # Stats only
//! relief inspect logo.png --format json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{build, inspect};

/// relief - Build filleted 3D reliefs from grayscale heightmaps.
///
/// The red channel of the input image is the height; dark pixels are
/// background. Edges are rounded automatically before triangulation.
#[derive(Parser)]
#[command(name = "relief")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Parameter overrides shared by every command.
#[derive(Args, Clone, Default)]
pub struct ParamArgs {
    /// Load parameters from a TOML or JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Height multiplier applied to 8-bit samples and fillet heights
    #[arg(long)]
    z_scale: Option<f64>,

    /// Samples at or below this height are background
    #[arg(long)]
    z_cut: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a relief mesh and write it as ASCII STL
    Build {
        /// Input heightmap (PNG, JPEG, BMP, GIF)
        input: PathBuf,

        /// Output STL path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        params: ParamArgs,

        /// Close the slab with vertical walls along the outline
        #[arg(long, overrides_with = "no_side_walls")]
        side_walls: bool,

        /// Leave the slab open even if the config enables walls
        #[arg(long, overrides_with = "side_walls")]
        no_side_walls: bool,

        /// Use heights rounded to the 8-bit preview values
        #[arg(long, overrides_with = "no_quantize")]
        quantize: bool,

        /// Use continuous heights even if the config enables quantizing
        #[arg(long, overrides_with = "quantize")]
        no_quantize: bool,

        /// Solid name written into the STL
        #[arg(long)]
        name: Option<String>,

        /// Also write the height preview as PNG
        #[arg(long)]
        preview: Option<PathBuf>,
    },

    /// Print heightmap and relief statistics without writing files
    Inspect {
        /// Input heightmap (PNG, JPEG, BMP, GIF)
        input: PathBuf,

        #[command(flatten)]
        params: ParamArgs,

        /// Also report mesh bounds and per-stage triangle counts
        #[arg(long)]
        detailed: bool,
    },
}

/// Collapse an `--x` / `--no-x` pair into an optional override.
fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "relief_mesh=info,relief=info",
            2 => "relief_mesh=debug,relief=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Build {
            input,
            output,
            params,
            side_walls,
            no_side_walls,
            quantize,
            no_quantize,
            name,
            preview,
        } => build::run(
            input,
            output,
            params,
            build::BuildFlags {
                side_walls: toggle(*side_walls, *no_side_walls),
                quantize: toggle(*quantize, *no_quantize),
                name: name.clone(),
                preview: preview.clone(),
            },
            &cli,
        ),
        Commands::Inspect {
            input,
            params,
            detailed,
        } => inspect::run(input, params, *detailed, &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(relief_err) = e.downcast_ref::<relief_mesh::ReliefError>() {
                eprintln!("{}: {}", "Error".red().bold(), relief_err);
                eprintln!("  {}: {}", "Code".cyan(), relief_err.code());
                eprintln!(
                    "  {}: {}",
                    "Suggestion".green(),
                    relief_err.recovery_suggestion()
                );
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
            }
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {}", "Caused by".yellow(), cause);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
