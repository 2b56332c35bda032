//! Module path fragments: the kernel-relative, extension-less module paths
//! that image-build configs use to name a module by location.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Indentation of list items in the image-build config.
pub const LIST_ITEM_INDENT: &str = "        ";

/// Directory segment the fragment is taken relative to.
const KERNEL_SEGMENT: &str = "/kernel/";

/// `.ko`, optionally followed by a compression suffix, at end of path.
static MODULE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.ko(\..*)?$").expect("module extension pattern is valid"));

/// A normalized module identifier such as `/drivers/nvme/host/nvme`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ModulePathFragment(String);

impl ModulePathFragment {
    /// Wrap an already-normalized fragment (e.g. a line from a config file).
    pub fn new(fragment: impl Into<String>) -> Self {
        Self(fragment.into())
    }

    /// Normalize an on-disk module path.
    ///
    /// `/lib/modules/6.1.0/kernel/drivers/nvme/host/nvme.ko.xz` becomes
    /// `/drivers/nvme/host/nvme`. Paths without a `kernel` directory yield
    /// `None`.
    pub fn from_module_path(path: &str) -> Option<Self> {
        let idx = path.find(KERNEL_SEGMENT)?;
        // Keep the separator after `kernel` so the fragment starts with '/'
        let relative = &path[idx + KERNEL_SEGMENT.len() - 1..];
        let stripped = MODULE_EXTENSION.replace(relative, "");
        Some(Self(stripped.into_owned()))
    }

    /// The bare module name: the last path segment.
    pub fn module_name(&self) -> Option<&str> {
        self.0.rsplit('/').next().filter(|name| !name.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModulePathFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(path: &str) -> Option<String> {
        ModulePathFragment::from_module_path(path).map(|f| f.to_string())
    }

    #[test]
    fn test_normalize_compressed_module() {
        assert_eq!(
            normalize("/lib/modules/6.1.0/kernel/drivers/nvme/host/nvme.ko.xz").as_deref(),
            Some("/drivers/nvme/host/nvme")
        );
    }

    #[test]
    fn test_strip_every_extension_form() {
        for ext in [".ko", ".ko.xz", ".ko.zst", ".ko.gz", ".ko.whatever"] {
            let path = format!("/lib/modules/6.8.0/kernel/fs/xfs/xfs{}", ext);
            assert_eq!(normalize(&path).as_deref(), Some("/fs/xfs/xfs"), "{}", ext);
        }
    }

    #[test]
    fn test_no_kernel_segment_is_dropped() {
        assert_eq!(normalize("/lib/modules/6.1.0/extra/vboxdrv.ko"), None);
        assert_eq!(normalize("/lib/modules/6.1.0/updates/dkms/zfs.ko.zst"), None);
        assert_eq!(normalize("(builtin)"), None);
        // "kernel" must be a whole directory
        assert_eq!(normalize("/lib/modules/6.1.0/mykernel/foo.ko"), None);
        assert_eq!(normalize("/lib/modules/6.1.0/kernelx/foo.ko"), None);
    }

    #[test]
    fn test_fragment_always_starts_with_slash() {
        for path in [
            "/lib/modules/6.1.0/kernel/drivers/md/dm-mod.ko",
            "/usr/lib/modules/6.9.1-arch1/kernel/net/ipv4/tunnel4.ko.zst",
            "kernel/crypto/crc32c.ko",
        ] {
            let fragment = normalize(path);
            assert!(fragment.is_none() || fragment.unwrap().starts_with('/'));
        }
    }

    #[test]
    fn test_other_dots_are_kept() {
        assert_eq!(
            normalize("/lib/modules/6.1.0/kernel/drivers/net/wireless/ath/ath10k/ath10k_pci.ko").as_deref(),
            Some("/drivers/net/wireless/ath/ath10k/ath10k_pci")
        );
        assert_eq!(
            normalize("/lib/modules/6.1.0-18-arm64/kernel/drivers/block/virtio_blk.ko.xz").as_deref(),
            Some("/drivers/block/virtio_blk")
        );
    }

    #[test]
    fn test_first_kernel_segment_wins() {
        assert_eq!(
            normalize("/lib/modules/6.1.0/kernel/kernel/time/test_udelay.ko").as_deref(),
            Some("/kernel/time/test_udelay")
        );
    }

    #[test]
    fn test_module_name() {
        let fragment = ModulePathFragment::new("/drivers/nvme/host/nvme");
        assert_eq!(fragment.module_name(), Some("nvme"));
        assert_eq!(ModulePathFragment::new("nvme").module_name(), Some("nvme"));
        assert_eq!(ModulePathFragment::new("/drivers/").module_name(), None);
    }
}
