//! Clean generated output and cache

use anyhow::Result;
use std::fs;

use crate::Nebula;

/// Remove the output directories and the cache
pub fn run(nebula: &Nebula) -> Result<()> {
    for dir in [
        &nebula.public_dir,
        &nebula.preview_dir,
        &nebula.base_dir.join(".nebula-cache"),
    ] {
        if dir.exists() {
            fs::remove_dir_all(dir)?;
            tracing::info!("Removed {:?}", dir);
        }
    }
    Ok(())
}
