//! Preflight checks.
//!
//! Verifies that modinfo and the module registry are usable before piping
//! `kmodfw modules` into an image build. Run with `kmodfw preflight`.

mod types;

use anyhow::{bail, Result};

use crate::config::Config;
use crate::modinfo::{Modinfo, ModuleQuery};
use crate::registry;

pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks.
pub fn run_preflight(config: &Config) -> Result<PreflightReport> {
    let mut checks = Vec::new();

    println!("Running preflight checks...\n");

    let modinfo = match Modinfo::locate(config) {
        Ok(modinfo) => {
            checks.push(CheckResult::pass(
                "modinfo",
                modinfo.path().display().to_string(),
            ));
            Some(modinfo)
        }
        Err(e) => {
            checks.push(CheckResult::fail("modinfo", format!("{:#}", e)));
            None
        }
    };

    let registry_name = "module registry";
    let modules = match registry::read_loaded_modules(&config.module_registry) {
        Ok(modules) if modules.is_empty() => {
            checks.push(CheckResult::warn(
                registry_name,
                format!("{} lists no modules", config.module_registry.display()),
            ));
            modules
        }
        Ok(modules) => {
            checks.push(CheckResult::pass(
                registry_name,
                format!(
                    "{} modules loaded ({})",
                    modules.len(),
                    config.module_registry.display()
                ),
            ));
            modules
        }
        Err(e) => {
            checks.push(CheckResult::fail(registry_name, format!("{:#}", e)));
            Vec::new()
        }
    };

    if let (Some(modinfo), Some(module)) = (modinfo, modules.first()) {
        checks.push(sample_query(modinfo, module)?);
    }

    checks.push(CheckResult::pass(
        "workers",
        format!("{} concurrent queries", config.jobs),
    ));
    checks.push(match config.timeout {
        Some(limit) => CheckResult::pass("query timeout", format!("{}s", limit.as_secs())),
        None => CheckResult::warn("query timeout", "disabled; a hung modinfo blocks forever"),
    });

    Ok(PreflightReport { checks })
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(config: &Config) -> Result<()> {
    let report = run_preflight(config)?;
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above first.",
            report.fail_count()
        );
    }

    println!("All preflight checks passed!\n");
    Ok(())
}

/// Ask modinfo about one loaded module to prove it works on this kernel.
fn sample_query(modinfo: Modinfo, module: &str) -> Result<CheckResult> {
    let name = "modinfo query";
    let rt = tokio::runtime::Runtime::new()?;
    let check = match rt.block_on(modinfo.describe(module, Some("filename"))) {
        Ok(Some(output)) if !output.trim().is_empty() => {
            CheckResult::pass(name, format!("{} -> {}", module, output.trim()))
        }
        Ok(_) => CheckResult::warn(
            name,
            format!("modinfo could not describe loaded module '{}'", module),
        ),
        Err(e) => CheckResult::fail(name, format!("{:#}", e)),
    };
    Ok(check)
}
