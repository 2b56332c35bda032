//! kmodfw - kernel module and firmware lists for minimal OS images.
//!
//! Typical use:
//!   kmodfw modules > modules.txt
//!   kmodfw firmware < modules.txt

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use kmodfw::commands;
use kmodfw::config::{self, Config};

#[derive(Parser)]
#[command(name = "kmodfw")]
#[command(about = "List loaded kernel modules and the firmware they need")]
#[command(
    after_help = "QUICK START:\n  kmodfw preflight                  Check modinfo and /proc/modules\n  kmodfw modules                    Print KernelModules= entries\n  kmodfw modules | kmodfw firmware  Print the FirmwareFiles= block"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log skipped modules and other details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to modinfo (default: PATH, then /sbin, /usr/sbin, /bin, /usr/bin)
    #[arg(long, global = true, value_name = "PATH")]
    modinfo: Option<PathBuf>,

    /// Maximum concurrent modinfo queries
    #[arg(short, long, global = true, value_name = "N")]
    jobs: Option<usize>,

    /// Per-query timeout in seconds (0 disables)
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List loaded modules as kernel-relative path fragments
    Modules {
        /// Module registry to read (default: /proc/modules)
        #[arg(long, value_name = "FILE")]
        registry: Option<PathBuf>,

        /// Print a JSON array instead of config lines
        #[arg(long)]
        json: bool,
    },

    /// Resolve firmware required by a list of module fragments
    Firmware {
        /// Read fragments from FILE instead of stdin ("-" for stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Print a JSON object instead of a config block
        #[arg(long)]
        json: bool,
    },

    /// Check that modinfo and the module registry are usable
    Preflight {
        /// Exit non-zero if any check fails
        #[arg(long)]
        strict: bool,

        /// Module registry to read (default: /proc/modules)
        #[arg(long, value_name = "FILE")]
        registry: Option<PathBuf>,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = Config::load();
    if let Some(modinfo) = cli.modinfo {
        config.modinfo = Some(modinfo);
    }
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs.max(1);
    }
    if let Some(secs) = cli.timeout {
        config.timeout = config::timeout_from_secs(secs);
    }

    match cli.command {
        Commands::Modules { registry, json } => {
            if let Some(registry) = registry {
                config.module_registry = registry;
            }
            commands::cmd_modules(&config, json)?;
        }

        Commands::Firmware { input, json } => {
            commands::cmd_firmware(&config, input, json)?;
        }

        Commands::Preflight { strict, registry } => {
            if let Some(registry) = registry {
                config.module_registry = registry;
            }
            commands::cmd_preflight(&config, strict)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
            };
            commands::cmd_show(show_target, &config)?;
        }
    }

    Ok(())
}
