pub mod cpumask;
pub mod topology;

pub use cpumask::CpuMask;
pub use topology::{FixedTopology, SysfsTopology, Topology};
