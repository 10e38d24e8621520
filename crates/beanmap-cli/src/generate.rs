//! Generate command

use crate::input::{discover_mappers, load_config, load_types};
use anyhow::{Context, Result, bail};
use beanmap_codegen::{JavaSourceSink, generate_mappers};
use std::path::Path;
use tracing::info;

/// Generate the given mappers (or every mapper in the table) into `output`
pub fn run(
    types_path: &Path,
    config_path: Option<&Path>,
    mappers: &[String],
    output: &Path,
) -> Result<()> {
    let types = load_types(types_path)?;
    let config = load_config(config_path)?;

    let mappers = if mappers.is_empty() {
        discover_mappers(&types)
    } else {
        mappers.to_vec()
    };
    if mappers.is_empty() {
        bail!("No mapper interface found in {}", types_path.display());
    }

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;
    let mut sink = JavaSourceSink::new(output);
    info!("Generating {} mapper(s) into {}", mappers.len(), output.display());

    let reports = generate_mappers(&types, &config, &mut sink, mappers.as_slice());

    let mut failed = 0;
    for report in &reports {
        let warnings = report.diagnostics.warnings().count();
        match &report.result {
            Ok(name) => println!("✓ {} -> {name} ({warnings} warning(s))", report.interface),
            Err(err) => {
                failed += 1;
                println!("✗ {}: {err}", report.interface);
            }
        }
    }
    println!("\nWrote {} source file(s) to {}", sink.written().len(), output.display());

    if failed > 0 {
        bail!("{failed} of {} mapper(s) failed", reports.len());
    }
    Ok(())
}
