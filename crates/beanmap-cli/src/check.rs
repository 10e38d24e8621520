//! Check command

use crate::input::{discover_mappers, load_config, load_types};
use anyhow::{Result, bail};
use std::path::Path;

/// Validate the type table and configuration, listing every problem found
pub fn run(types_path: &Path, config_path: Option<&Path>) -> Result<()> {
    println!("Checking type table: {}", types_path.display());

    let types = load_types(types_path)?;
    let config = load_config(config_path)?;

    let mut problems = types.validate();
    problems.extend(config.validate(&types));
    if !problems.is_empty() {
        for problem in &problems {
            println!("✗ {problem}");
        }
        bail!("Found {} problem(s)", problems.len());
    }

    println!("✓ Types: {}", types.len());
    println!("✓ Mappers: {}", discover_mappers(&types).len());
    println!("\nType table is valid!");

    Ok(())
}
