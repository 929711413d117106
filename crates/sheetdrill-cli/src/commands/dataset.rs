//! The `sheetdrill dataset` command: write the practice workbook candidates
//! answer the practical questions against.

use std::path::PathBuf;

use anyhow::{Context, Result};

use sheetdrill_workbook::dataset::build_reference_workbook;

pub fn execute(output: PathBuf) -> Result<()> {
    let bytes = build_reference_workbook()?;
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&output, bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Dataset written to: {}", output.display());
    Ok(())
}
