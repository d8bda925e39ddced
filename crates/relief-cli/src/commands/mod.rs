//! Subcommand implementations.

pub mod build;
pub mod inspect;

use anyhow::{Context, Result};
use relief_mesh::ReliefParams;

use crate::ParamArgs;

/// Start from the config file (or defaults) and apply flag overrides.
pub fn resolve_params(args: &ParamArgs) -> Result<ReliefParams> {
    let mut params = match &args.config {
        Some(path) => ReliefParams::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => ReliefParams::default(),
    };
    if let Some(z_scale) = args.z_scale {
        params.z_scale = z_scale;
    }
    if let Some(z_cut) = args.z_cut {
        params.z_cut = z_cut;
    }
    params.validate()?;
    Ok(params)
}
