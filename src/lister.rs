//! Loaded module listing.
//!
//! Maps every loaded module to its [`ModulePathFragment`] by asking modinfo
//! for the module's `filename` field.

use anyhow::Result;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::fragment::{ModulePathFragment, LIST_ITEM_INDENT};
use crate::modinfo::ModuleQuery;
use crate::pool;

/// Resolve loaded module names to their path fragments.
///
/// Modules modinfo can't describe, built-ins, and modules living outside the
/// `kernel/` tree are left out.
pub async fn list_loaded_modules<Q, I>(
    query: Arc<Q>,
    modules: I,
    jobs: usize,
) -> Result<BTreeSet<ModulePathFragment>>
where
    Q: ModuleQuery,
    I: IntoIterator<Item = String>,
{
    let described = pool::describe_all(query, modules, Some("filename"), jobs).await?;

    let mut fragments = BTreeSet::new();
    for (module, output) in &described {
        let Some(path) = first_absolute_path(output) else {
            log::debug!("{}: no module file reported, skipping", module);
            continue;
        };
        match ModulePathFragment::from_module_path(path) {
            Some(fragment) => {
                fragments.insert(fragment);
            }
            None => log::debug!("{}: {} is outside the kernel tree, skipping", module, path),
        }
    }

    Ok(fragments)
}

/// First line of modinfo output that is an absolute path.
///
/// modinfo may print alias or `(builtin)` lines; only a real path counts.
pub fn first_absolute_path(output: &str) -> Option<&str> {
    output
        .lines()
        .map(str::trim_end)
        .find(|line| line.starts_with('/'))
}

/// One indented config list item per fragment.
pub fn render_module_list(fragments: &BTreeSet<ModulePathFragment>) -> String {
    let mut out = String::new();
    for fragment in fragments {
        out.push_str(LIST_ITEM_INDENT);
        out.push_str(fragment.as_str());
        out.push('\n');
    }
    out
}
