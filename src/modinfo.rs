//! The module-metadata query tool (`modinfo`).
//!
//! Lookups go through the [`ModuleQuery`] trait so the resolution stages can
//! be driven by canned output in tests. [`Modinfo`] is the real thing.

use anyhow::{bail, Context, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::process::Cmd;

/// Places modinfo usually lives when it isn't on PATH (e.g. /sbin for non-root users).
pub const FALLBACK_LOCATIONS: &[&str] = &[
    "/sbin/modinfo",
    "/usr/sbin/modinfo",
    "/bin/modinfo",
    "/usr/bin/modinfo",
];

/// Describe a kernel module by name.
pub trait ModuleQuery: Send + Sync + 'static {
    /// Query metadata for `module`, restricted to a single `field` when given.
    ///
    /// Returns the raw text output, or `None` if the tool rejected the module
    /// (non-zero exit) or didn't answer in time. `Err` is reserved for
    /// failures that would affect every module, like the tool vanishing.
    fn describe(
        &self,
        module: &str,
        field: Option<&str>,
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Runs the host's modinfo binary.
#[derive(Debug, Clone)]
pub struct Modinfo {
    bin: PathBuf,
    timeout: Option<Duration>,
}

impl Modinfo {
    pub fn new(bin: PathBuf, timeout: Option<Duration>) -> Self {
        Self { bin, timeout }
    }

    /// Locate modinfo according to `config` and wrap it.
    pub fn locate(config: &Config) -> Result<Self> {
        let bin = locate_modinfo(config.modinfo.as_deref())?;
        log::debug!("Using modinfo at {}", bin.display());
        Ok(Self::new(bin, config.timeout))
    }

    pub fn path(&self) -> &Path {
        &self.bin
    }
}

impl ModuleQuery for Modinfo {
    fn describe(
        &self,
        module: &str,
        field: Option<&str>,
    ) -> impl Future<Output = Result<Option<String>>> + Send {
        let mut cmd = Cmd::new(&self.bin);
        if let Some(field) = field {
            cmd = cmd.args(["-F", field]);
        }
        let cmd = cmd.arg(module);
        let timeout = self.timeout;
        let module = module.to_string();

        async move {
            let result = match timeout {
                Some(limit) => match tokio::time::timeout(limit, cmd.run()).await {
                    Ok(result) => result?,
                    Err(_) => {
                        log::debug!("modinfo {} timed out after {:?}, skipping", module, limit);
                        return Ok(None);
                    }
                },
                None => cmd.run().await?,
            };

            if !result.success() {
                log::debug!(
                    "modinfo {} exited with {}, skipping: {}",
                    module,
                    result.code(),
                    result.stderr_trimmed()
                );
                return Ok(None);
            }

            Ok(Some(result.stdout))
        }
    }
}

/// Find the modinfo binary.
///
/// An explicit path (from `--modinfo` or `MODINFO`) must resolve; otherwise
/// PATH is searched, then [`FALLBACK_LOCATIONS`].
pub fn locate_modinfo(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return which::which(path).with_context(|| {
            format!(
                "modinfo override '{}' is not an executable",
                path.display()
            )
        });
    }

    if let Ok(path) = which::which("modinfo") {
        return Ok(path);
    }

    match first_executable(FALLBACK_LOCATIONS.iter().map(Path::new)) {
        Some(path) => Ok(path),
        None => bail!("'modinfo' command not found. Ensure kmod is installed."),
    }
}

/// Return the first candidate that is an executable file.
pub fn first_executable<'a, I>(candidates: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = &'a Path>,
{
    candidates
        .into_iter()
        .find_map(|candidate| which::which(candidate).ok())
}
