// Vendor backend registration and per-device binding

use parking_lot::RwLock;
use std::sync::Arc;

use cspmu_raw::arch::coresight::Pmiidr;

use super::{CounterKind, CspmuDevice, ImplOps, PmuEvent};
use crate::attrs::{EventAttrs, FormatAttrs};
use crate::error::{CspmuError, Result};

/// A vendor backend that binds devices of one implementer
pub trait ImplBackend: Send + Sync {
    /// PMIIDR implementer code this backend handles
    fn implementer(&self) -> u32;

    /// Build the per-device operations; nothing is kept on failure
    fn init_ops(&self, device: &dyn CspmuDevice) -> Result<Box<dyn ImplOps>>;
}

/// Registered backends, keyed by implementer
#[derive(Default)]
pub struct BackendRegistry {
    backends: RwLock<Vec<Arc<dyn ImplBackend>>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, backend: Arc<dyn ImplBackend>) -> Result<()> {
        let implementer = backend.implementer();
        let mut backends = self.backends.write();

        if backends.iter().any(|b| b.implementer() == implementer) {
            return Err(CspmuError::BackendBusy { implementer });
        }

        tracing::debug!("Registered backend for implementer 0x{:03X}", implementer);
        backends.push(backend);
        Ok(())
    }

    /// Remove the backend for `implementer`; returns whether one was registered
    pub fn unregister(&self, implementer: u32) -> bool {
        let mut backends = self.backends.write();
        let before = backends.len();
        backends.retain(|b| b.implementer() != implementer);
        before != backends.len()
    }

    pub fn is_registered(&self, implementer: u32) -> bool {
        self.backends
            .read()
            .iter()
            .any(|b| b.implementer() == implementer)
    }

    /// Bind `device` to the backend of its implementer
    pub fn probe<D: CspmuDevice>(&self, device: D) -> Result<BoundPmu<D>> {
        let implementer = Pmiidr::implementer(device.pmiidr()?);

        let backend = self
            .backends
            .read()
            .iter()
            .find(|b| b.implementer() == implementer)
            .cloned()
            .ok_or(CspmuError::NoBackend { implementer })?;

        let ops = backend.init_ops(&device)?;
        Ok(BoundPmu { device, ops })
    }
}

/// A device together with the vendor operations bound to it
pub struct BoundPmu<D> {
    device: D,
    ops: Box<dyn ImplOps>,
}

impl<D: CspmuDevice> BoundPmu<D> {
    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn name(&self) -> &str {
        self.ops.name()
    }

    pub fn event_attrs(&self) -> EventAttrs {
        self.ops.event_attrs()
    }

    pub fn format_attrs(&self) -> FormatAttrs {
        self.ops.format_attrs()
    }

    /// Route the filter write to the register of the counter `event` occupies
    pub fn set_event_filter(&self, event: &PmuEvent) -> Result<()> {
        match event.counter {
            CounterKind::Cycle => self.ops.set_cc_filter(&self.device, event),
            CounterKind::Event(_) => self.ops.set_ev_filter(&self.device, event),
        }
    }

    pub fn into_device(self) -> D {
        self.device
    }
}
