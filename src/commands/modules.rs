//! Modules command - lists loaded modules as config path fragments.

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::lister;
use crate::modinfo::Modinfo;
use crate::registry;

/// Execute the modules command.
pub fn cmd_modules(config: &Config, json: bool) -> Result<()> {
    // modinfo first: without it there is no point reading the registry
    let modinfo = Modinfo::locate(config)?;
    let modules = registry::read_loaded_modules(&config.module_registry)?;
    log::debug!(
        "{} modules listed in {}",
        modules.len(),
        config.module_registry.display()
    );

    let rt = tokio::runtime::Runtime::new()?;
    let fragments = rt.block_on(lister::list_loaded_modules(
        Arc::new(modinfo),
        modules,
        config.jobs,
    ))?;

    if json {
        super::emit(&format!("{}\n", serde_json::to_string_pretty(&fragments)?))
    } else {
        super::emit(&lister::render_module_list(&fragments))
    }
}
