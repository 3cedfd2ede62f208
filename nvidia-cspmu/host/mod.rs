//! Interfaces shared with the CoreSight PMU host framework
//!
//! The host owns device discovery, event scheduling and attribute
//! publishing. Vendor backends plug in through [`ImplBackend`] and hand back
//! an [`ImplOps`] per device; the host calls those operations for naming,
//! attribute lists and filter programming.

pub mod device;
pub mod registry;

pub use device::{MemoryDevice, PlatformDevice};
pub use registry::{BackendRegistry, BoundPmu, ImplBackend};

use crate::attrs::{EventAttrs, FormatAttrs};
use crate::common::CpuMask;
use crate::error::Result;

/// A discovered PMU as seen by vendor code
pub trait CspmuDevice {
    /// Host-side device name, used in diagnostics only
    fn dev_name(&self) -> &str;

    /// Raw PMIIDR value
    fn pmiidr(&self) -> Result<u32>;

    /// CPUs the PMU is affine to
    fn associated_cpus(&self) -> &CpuMask;

    /// Single 32-bit store into the PMU register page
    fn write32(&self, offset: u32, value: u32) -> Result<()>;
}

/// Counter an event was scheduled on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    /// General purpose counter with its hardware index
    Event(u32),
    /// Dedicated cycle counter
    Cycle,
}

/// The parts of a scheduled perf event vendor code looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PmuEvent {
    pub config: u64,
    pub config1: u64,
    pub counter: CounterKind,
}

impl PmuEvent {
    pub fn new(config: u64, config1: u64, counter: CounterKind) -> Self {
        Self {
            config,
            config1,
            counter,
        }
    }
}

/// Vendor operations bound to one device
pub trait ImplOps: Send + Sync {
    fn name(&self) -> &str;

    fn event_attrs(&self) -> EventAttrs;

    fn format_attrs(&self) -> FormatAttrs;

    /// Program the filter of the general purpose counter `event` runs on
    fn set_ev_filter(&self, device: &dyn CspmuDevice, event: &PmuEvent) -> Result<()>;

    /// Program the cycle counter filter
    fn set_cc_filter(&self, device: &dyn CspmuDevice, event: &PmuEvent) -> Result<()>;
}
