// CPU to NUMA node resolution used by socket-indexed PMU names

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Maps a CPU to the NUMA node (socket) it belongs to
pub trait Topology {
    fn node_of_cpu(&self, cpu: u32) -> Option<u32>;
}

/// Topology read from `<root>/devices/system/cpu/cpuN/nodeM`
#[derive(Debug, Clone)]
pub struct SysfsTopology {
    root: PathBuf,
}

impl SysfsTopology {
    pub fn new(sysfs_root: impl Into<PathBuf>) -> Self {
        Self {
            root: sysfs_root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cpu_dir(&self, cpu: u32) -> PathBuf {
        self.root.join(format!("devices/system/cpu/cpu{cpu}"))
    }
}

impl Default for SysfsTopology {
    fn default() -> Self {
        Self::new("/sys")
    }
}

impl Topology for SysfsTopology {
    fn node_of_cpu(&self, cpu: u32) -> Option<u32> {
        let dir = self.cpu_dir(cpu);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot list {}: {}", dir.display(), e);
                return None;
            }
        };

        // The kernel links exactly one nodeN entry per online CPU
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| name.strip_prefix("node"))
                    .and_then(|id| id.parse::<u32>().ok())
            })
            .min()
    }
}

/// Static CPU to node map
#[derive(Debug, Clone, Default)]
pub struct FixedTopology {
    nodes: HashMap<u32, u32>,
}

impl FixedTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign every CPU in `cpus` to `node`
    pub fn with_node(mut self, node: u32, cpus: impl IntoIterator<Item = u32>) -> Self {
        for cpu in cpus {
            self.nodes.insert(cpu, node);
        }
        self
    }
}

impl Topology for FixedTopology {
    fn node_of_cpu(&self, cpu: u32) -> Option<u32> {
        self.nodes.get(&cpu).copied()
    }
}

impl<T: Topology + ?Sized> Topology for &T {
    fn node_of_cpu(&self, cpu: u32) -> Option<u32> {
        (**self).node_of_cpu(cpu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysfs_topology_reads_node_link() {
        let sysfs = tempfile::tempdir().unwrap();
        let root = sysfs.path();
        std::fs::create_dir_all(root.join("devices/system/cpu/cpu0/node0")).unwrap();
        std::fs::create_dir_all(root.join("devices/system/cpu/cpu72/node1")).unwrap();
        std::fs::create_dir_all(root.join("devices/system/cpu/cpu72/topology")).unwrap();

        let topology = SysfsTopology::new(root);
        assert_eq!(topology.node_of_cpu(0), Some(0));
        assert_eq!(topology.node_of_cpu(72), Some(1));
        assert_eq!(topology.node_of_cpu(5), None);
    }

    #[test]
    fn test_fixed_topology() {
        let topology = FixedTopology::new()
            .with_node(0, 0..72)
            .with_node(1, 72..144);
        assert_eq!(topology.node_of_cpu(10), Some(0));
        assert_eq!(topology.node_of_cpu(100), Some(1));
        assert_eq!(topology.node_of_cpu(200), None);
    }
}
