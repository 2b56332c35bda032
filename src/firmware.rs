//! Firmware resolution.
//!
//! Reads module path fragments (typically `kmodfw modules` output, or a
//! pasted chunk of an image-build config), asks modinfo which firmware
//! each module declares, and renders a `FirmwareFiles=` block annotated
//! with the modules that need each file.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::sync::Arc;

use crate::fragment::{ModulePathFragment, LIST_ITEM_INDENT};
use crate::modinfo::ModuleQuery;
use crate::pool;

/// Config key the manifest is emitted under.
pub const FIRMWARE_KEY: &str = "FirmwareFiles=";

/// Written to stderr when nothing needs firmware.
pub const NO_FIRMWARE_NOTE: &str =
    "# No explicit firmware requirements found for the provided modules.";

const FIRMWARE_LABEL: &str = "firmware:";

/// Firmware files and the modules that require them.
///
/// Keyed by firmware path; each (firmware, module) pair is stored once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FirmwareManifest {
    entries: BTreeMap<String, BTreeSet<ModulePathFragment>>,
}

impl FirmwareManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `module` needs `firmware`.
    pub fn record(&mut self, firmware: &str, module: ModulePathFragment) {
        self.entries
            .entry(firmware.to_string())
            .or_default()
            .insert(module);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct firmware files.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Modules that declared `firmware`, sorted.
    #[cfg(test)]
    pub(crate) fn required_by(&self, firmware: &str) -> Option<&BTreeSet<ModulePathFragment>> {
        self.entries.get(firmware)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<ModulePathFragment>)> {
        self.entries.iter().map(|(fw, modules)| (fw.as_str(), modules))
    }

    /// Render the config block. Empty manifests render as an empty string.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        out.push_str(FIRMWARE_KEY);
        out.push('\n');
        for (firmware, modules) in self.iter() {
            let requesters: Vec<&str> = modules.iter().map(|m| m.as_str()).collect();
            out.push_str(&format!(
                "{}# Required by: {}\n",
                LIST_ITEM_INDENT,
                requesters.join(", ")
            ));
            out.push_str(&format!("{}{}\n", LIST_ITEM_INDENT, firmware));
        }
        out
    }
}

/// Interpret one input line as a fragment.
///
/// Blank lines, comments, section headers and `key=value` lines are ignored,
/// so a config file excerpt can be piped in unfiltered.
pub fn fragment_from_line(line: &str) -> Option<ModulePathFragment> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('[') || line.contains('=') {
        return None;
    }
    Some(ModulePathFragment::new(line))
}

/// Read every fragment from `reader`.
///
/// Lines are decoded lossily; a stray latin-1 comment in a hand-edited
/// config must not abort the run. Only I/O errors are fatal.
pub fn read_fragments<R: BufRead>(reader: R) -> Result<BTreeSet<ModulePathFragment>> {
    let mut fragments = BTreeSet::new();
    for line in reader.split(b'\n') {
        let line = line.context("Failed to read module list")?;
        if let Some(fragment) = fragment_from_line(&String::from_utf8_lossy(&line)) {
            fragments.insert(fragment);
        }
    }
    Ok(fragments)
}

/// Firmware files declared in full modinfo output.
pub fn parse_firmware(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter(|line| line.starts_with(FIRMWARE_LABEL))
        .filter_map(|line| line.split_once(':'))
        .map(|(_, firmware)| firmware.trim())
        .filter(|firmware| {
            if firmware.is_empty() {
                log::debug!("Ignoring '{}' line with no value", FIRMWARE_LABEL);
            }
            !firmware.is_empty()
        })
        .collect()
}

/// Build the firmware manifest for `fragments`.
///
/// Modules are queried by bare name; fragments sharing a name share one
/// query. Modules modinfo doesn't know contribute nothing.
pub async fn resolve_firmware<Q>(
    query: Arc<Q>,
    fragments: &BTreeSet<ModulePathFragment>,
    jobs: usize,
) -> Result<FirmwareManifest>
where
    Q: ModuleQuery,
{
    let names = fragments
        .iter()
        .filter_map(|fragment| fragment.module_name())
        .map(str::to_string);
    let described = pool::describe_all(query, names, None, jobs).await?;

    let mut manifest = FirmwareManifest::new();
    for fragment in fragments {
        let Some(output) = fragment.module_name().and_then(|name| described.get(name)) else {
            log::debug!("{}: no modinfo output, skipping", fragment);
            continue;
        };
        for firmware in parse_firmware(output) {
            manifest.record(firmware, fragment.clone());
        }
    }

    Ok(manifest)
}
