//! Shared test utilities for kmodfw tests.
//!
//! Builds a scratch directory holding a fake `/proc/modules` and a fake
//! `modinfo` shell script with canned answers.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch environment for one test.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Write a registry in /proc/modules format listing `modules`.
    pub fn write_registry(&self, modules: &[&str]) -> PathBuf {
        let path = self.root.join("modules");
        let content: String = modules
            .iter()
            .map(|m| format!("{} 16384 0 - Live 0x0000000000000000\n", m))
            .collect();
        fs::write(&path, content).expect("Failed to write registry");
        path
    }

    /// Write a text file under the scratch root.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Install a fake modinfo answering from `modules`.
    pub fn write_modinfo(&self, modules: &[FakeModule]) -> PathBuf {
        write_fake_modinfo(&self.root.join("modinfo"), modules)
    }
}

/// Canned modinfo answers for one module.
pub struct FakeModule {
    pub name: &'static str,
    /// Output of `modinfo -F filename <name>`
    pub filename: &'static str,
    /// Output of `modinfo <name>`
    pub info: &'static str,
}

pub const NVME: FakeModule = FakeModule {
    name: "nvme",
    filename: "/lib/modules/6.1.0/kernel/drivers/nvme/host/nvme.ko.xz",
    info: "filename:       /lib/modules/6.1.0/kernel/drivers/nvme/host/nvme.ko.xz\nfirmware:       nvme/fw.bin\nlicense:        GPL\nname:           nvme",
};

pub const XFS: FakeModule = FakeModule {
    name: "xfs",
    filename: "/lib/modules/6.1.0/kernel/fs/xfs/xfs.ko.zst",
    info: "filename:       /lib/modules/6.1.0/kernel/fs/xfs/xfs.ko.zst\nlicense:        GPL\nname:           xfs",
};

pub const IWLWIFI: FakeModule = FakeModule {
    name: "iwlwifi",
    filename: "/lib/modules/6.1.0/kernel/drivers/net/wireless/intel/iwlwifi/iwlwifi.ko",
    info: "filename:       /lib/modules/6.1.0/kernel/drivers/net/wireless/intel/iwlwifi/iwlwifi.ko\nfirmware:       iwlwifi-cc-a0-72.ucode\nfirmware:       iwlwifi-Qu-b0-hr-b0-72.ucode\nfirmware:       iwlwifi-cc-a0-72.ucode",
};

pub const VBOXDRV: FakeModule = FakeModule {
    name: "vboxdrv",
    filename: "/lib/modules/6.1.0/misc/vboxdrv.ko",
    info: "filename:       /lib/modules/6.1.0/misc/vboxdrv.ko\nname:           vboxdrv",
};

/// Write a shell script that mimics `modinfo [-F field] <module>`.
///
/// Unknown modules exit 1 with an error on stderr, like the real tool.
pub fn write_fake_modinfo(path: &Path, modules: &[FakeModule]) -> PathBuf {
    let mut filename_cases = String::new();
    let mut info_cases = String::new();
    for module in modules {
        filename_cases.push_str(&format!(
            "    {}) cat <<'EOF'\n{}\nEOF\n    ;;\n",
            module.name, module.filename
        ));
        info_cases.push_str(&format!(
            "  {}) cat <<'EOF'\n{}\nEOF\n  ;;\n",
            module.name, module.info
        ));
    }

    let script = format!(
        r#"#!/bin/sh
if [ "$1" = "-F" ]; then
  [ "$2" = "filename" ] || exit 2
  case "$3" in
{filename_cases}    *) echo "modinfo: ERROR: Module $3 not found." >&2; exit 1 ;;
  esac
  exit 0
fi
case "$1" in
{info_cases}  *) echo "modinfo: ERROR: Module $1 not found." >&2; exit 1 ;;
esac
"#
    );

    write_script(path, &script)
}

/// Write an executable script.
pub fn write_script(path: &Path, content: &str) -> PathBuf {
    fs::write(path, content).expect("Failed to write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make script executable");
    path.to_path_buf()
}
