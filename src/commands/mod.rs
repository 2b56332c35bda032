//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `modules` - List loaded modules as path fragments
//! - `firmware` - Resolve firmware for a list of path fragments
//! - `preflight` - Check modinfo and the module registry
//! - `show` - Display information

pub mod firmware;
pub mod modules;
mod preflight;
pub mod show;

pub use firmware::cmd_firmware;
pub use modules::cmd_modules;
pub use preflight::cmd_preflight;
pub use show::cmd_show;

use anyhow::{Context, Result};
use std::io::Write;

/// Write rendered output to stdout in one go.
fn emit(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write to stdout")
}
