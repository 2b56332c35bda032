//! Kernel module registry (`/proc/modules`).

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read the names of all currently loaded modules.
pub fn read_loaded_modules(registry: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(registry).with_context(|| {
        format!(
            "Cannot read module registry {}. Are you running on Linux?",
            registry.display()
        )
    })?;
    Ok(parse_registry(&content))
}

/// First whitespace-delimited token of every non-blank line.
pub fn parse_registry(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}
