//! Configuration management for kmodfw.
//!
//! `main` loads `.env` into the process environment first, so variables set
//! there and in the real environment are read the same way. CLI flags are
//! applied on top by the caller.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the kernel's loaded-module registry.
pub const DEFAULT_MODULE_REGISTRY: &str = "/proc/modules";

/// Default per-query timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound for the default worker count.
const MAX_DEFAULT_JOBS: usize = 8;

/// kmodfw configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Explicit modinfo binary (skips PATH and fallback search)
    pub modinfo: Option<PathBuf>,
    /// Module registry file (default: /proc/modules)
    pub module_registry: PathBuf,
    /// Maximum number of concurrent modinfo queries
    pub jobs: usize,
    /// Per-query timeout; `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            modinfo: None,
            module_registry: PathBuf::from(DEFAULT_MODULE_REGISTRY),
            jobs: default_jobs(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env_vars: HashMap<String, String> = vars.into_iter().collect();
        let defaults = Self::default();

        let modinfo = env_vars
            .get("MODINFO")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let module_registry = env_vars
            .get("MODULE_REGISTRY")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.module_registry);

        let jobs = match env_vars.get("KMODFW_JOBS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    log::warn!("Ignoring invalid KMODFW_JOBS={:?}", raw);
                    defaults.jobs
                }
            },
            None => defaults.jobs,
        };

        let timeout = match env_vars.get("KMODFW_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => timeout_from_secs(secs),
                Err(_) => {
                    log::warn!("Ignoring invalid KMODFW_TIMEOUT_SECS={:?}", raw);
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Self {
            modinfo,
            module_registry,
            jobs,
            timeout,
        }
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        match &self.modinfo {
            Some(path) => println!("  MODINFO: {}", path.display()),
            None => println!("  MODINFO: (search PATH and standard locations)"),
        }
        println!("  MODULE_REGISTRY: {}", self.module_registry.display());
        println!("  KMODFW_JOBS: {}", self.jobs);
        match self.timeout {
            Some(t) => println!("  KMODFW_TIMEOUT_SECS: {}", t.as_secs()),
            None => println!("  KMODFW_TIMEOUT_SECS: 0 (no timeout)"),
        }
        if self.module_registry.exists() {
            println!("  Module registry: FOUND");
        } else {
            println!("  Module registry: NOT FOUND");
        }
    }
}

/// `0` disables the timeout.
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_JOBS)
}
