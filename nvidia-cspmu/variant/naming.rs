// Instance names for bound PMUs

use std::sync::atomic::{AtomicU32, Ordering};

use super::table::{NameScheme, VariantDescriptor};
use crate::common::Topology;
use crate::error::{CspmuError, Result};
use crate::host::CspmuDevice;

/// Node used when a PMU has no CPU or the CPU has no known node
pub const FALLBACK_NODE: u32 = 0;

/// Backend-wide index source for sequentially named PMUs
///
/// Indices are handed out once and never returned, so a PMU that is removed
/// and probed again gets a fresh name.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    next: AtomicU32,
}

impl SequenceCounter {
    pub const fn new() -> Self {
        Self {
            next: AtomicU32::new(0),
        }
    }

    /// Take the next index; `None` once the index space is used up
    pub fn next(&self) -> Option<u32> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_add(1))
            .ok()
    }

    #[cfg(test)]
    pub(crate) const fn starting_at(next: u32) -> Self {
        Self {
            next: AtomicU32::new(next),
        }
    }

    /// Index the next caller will receive
    pub fn peek(&self) -> u32 {
        self.next.load(Ordering::Relaxed)
    }
}

/// Renders instance names from a variant's pattern and scheme
pub struct NameGenerator<'a> {
    topology: &'a dyn Topology,
    counter: &'a SequenceCounter,
}

impl<'a> NameGenerator<'a> {
    pub fn new(topology: &'a dyn Topology, counter: &'a SequenceCounter) -> Self {
        Self { topology, counter }
    }

    pub fn generate(
        &self,
        device: &dyn CspmuDevice,
        variant: &VariantDescriptor,
    ) -> Result<String> {
        let malformed = || {
            CspmuError::resource_exhausted(
                device.dev_name(),
                format!(
                    "name pattern {:?} has no index placeholder",
                    variant.name_pattern.as_str()
                ),
            )
        };

        // Checked before a sequential index is taken so a failure leaves no gap
        if !variant.name_pattern.is_well_formed() {
            return Err(malformed());
        }

        let index = match variant.name_scheme {
            NameScheme::Socket => self.socket_of(device),
            NameScheme::Sequential => self.counter.next().ok_or_else(|| {
                CspmuError::resource_exhausted(device.dev_name(), "PMU name indices exhausted")
            })?,
        };

        variant.name_pattern.render(index).ok_or_else(malformed)
    }

    fn socket_of(&self, device: &dyn CspmuDevice) -> u32 {
        let Some(cpu) = device.associated_cpus().first() else {
            tracing::debug!(
                "{} has no associated CPU, naming it after node {}",
                device.dev_name(),
                FALLBACK_NODE
            );
            return FALLBACK_NODE;
        };

        self.topology.node_of_cpu(cpu).unwrap_or_else(|| {
            tracing::debug!(
                "No node for CPU {} of {}, naming it after node {}",
                cpu,
                device.dev_name(),
                FALLBACK_NODE
            );
            FALLBACK_NODE
        })
    }
}
