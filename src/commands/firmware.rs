//! Firmware command - resolves firmware needed by a list of modules.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::firmware::{self, NO_FIRMWARE_NOTE};
use crate::modinfo::Modinfo;

/// Execute the firmware command.
///
/// Reads fragments from `input`, or stdin when `input` is `None` or `-`.
pub fn cmd_firmware(config: &Config, input: Option<PathBuf>, json: bool) -> Result<()> {
    let modinfo = Modinfo::locate(config)?;

    let fragments = match input.as_deref() {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("Cannot open module list {}", path.display()))?;
            firmware::read_fragments(BufReader::new(file))?
        }
        _ => firmware::read_fragments(io::stdin().lock())?,
    };
    log::debug!("{} module fragments to query", fragments.len());

    let rt = tokio::runtime::Runtime::new()?;
    let manifest = rt.block_on(firmware::resolve_firmware(
        Arc::new(modinfo),
        &fragments,
        config.jobs,
    ))?;

    if manifest.is_empty() {
        eprintln!("{}", NO_FIRMWARE_NOTE);
    }

    if json {
        super::emit(&format!("{}\n", serde_json::to_string_pretty(&manifest)?))
    } else {
        super::emit(&manifest.render())
    }
}
