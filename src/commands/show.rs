//! Show command - displays information.

use anyhow::Result;

use crate::config::Config;
use crate::modinfo::locate_modinfo;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration
    Config,
}

/// Execute the show command.
pub fn cmd_show(target: ShowTarget, config: &Config) -> Result<()> {
    match target {
        ShowTarget::Config => {
            config.print();
            match locate_modinfo(config.modinfo.as_deref()) {
                Ok(path) => println!("  modinfo: {}", path.display()),
                Err(e) => println!("  modinfo: NOT FOUND ({})", e),
            }
        }
    }
    Ok(())
}
