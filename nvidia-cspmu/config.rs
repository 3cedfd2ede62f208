use std::path::PathBuf;

use crate::common::{CpuMask, SysfsTopology};

/// Overrides the sysfs root, e.g. when running against a captured tree
pub const SYSFS_ROOT_ENV: &str = "NVCSPMU_SYSFS_ROOT";

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub sysfs_root: PathBuf,
    pub cpus: CpuMask,
    pub resource: Option<PathBuf>,
    pub dev_name: String,
}

impl ProbeConfig {
    /// Create a new configuration for a PMU affine to `cpus`
    pub fn new(sysfs_root: impl Into<PathBuf>, cpus: CpuMask) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
            cpus,
            resource: None,
            dev_name: "nvidia_cspmu".to_string(),
        }
    }

    /// Default sysfs root with every online CPU associated
    pub fn auto_detect() -> Self {
        let root = Self::default_sysfs_root();
        let cpus = Self::detect_online_cpus(&root);

        tracing::info!("Auto-detected {} online CPUs ({})", cpus.len(), cpus);

        Self::new(root, cpus)
    }

    pub fn default_sysfs_root() -> PathBuf {
        std::env::var_os(SYSFS_ROOT_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/sys"))
    }

    /// Detect online CPUs from <root>/devices/system/cpu/online
    pub fn detect_online_cpus(sysfs_root: &std::path::Path) -> CpuMask {
        let path = sysfs_root.join("devices/system/cpu/online");
        std::fs::read_to_string(&path)
            .ok()
            .and_then(|s| CpuMask::parse(&s).ok())
            .filter(|mask| !mask.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!("Failed to detect online CPUs, using default: 0");
                CpuMask::from_cpus([0])
            })
    }

    pub fn with_resource(mut self, resource: impl Into<PathBuf>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_dev_name(mut self, name: impl Into<String>) -> Self {
        self.dev_name = name.into();
        self
    }

    pub fn topology(&self) -> SysfsTopology {
        SysfsTopology::new(&self.sysfs_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_online_cpus_from_fake_sysfs() {
        let sysfs = tempfile::tempdir().unwrap();
        let root = sysfs.path();
        std::fs::create_dir_all(root.join("devices/system/cpu")).unwrap();
        std::fs::write(root.join("devices/system/cpu/online"), "0-3,8\n").unwrap();

        let cpus = ProbeConfig::detect_online_cpus(root);
        assert_eq!(cpus.to_string(), "0-3,8");
    }

    #[test]
    fn test_detect_online_cpus_defaults_to_cpu0() {
        let cpus = ProbeConfig::detect_online_cpus(std::path::Path::new("/nonexistent"));
        assert_eq!(cpus.first(), Some(0));
        assert_eq!(cpus.len(), 1);
    }

    #[test]
    fn test_builder() {
        let config = ProbeConfig::new("/sys", CpuMask::parse("0-1").unwrap())
            .with_resource("/dev/uio0")
            .with_dev_name("pcie0");
        assert_eq!(config.resource.as_deref(), Some(std::path::Path::new("/dev/uio0")));
        assert_eq!(config.dev_name, "pcie0");
        assert_eq!(config.topology().root(), std::path::Path::new("/sys"));
    }
}
