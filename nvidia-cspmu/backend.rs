// NVIDIA backend registration context

use std::sync::Arc;

use cspmu_raw::vendor::IMPLEMENTER_ID;

use crate::binder::{bind, NvCspmu};
use crate::common::Topology;
use crate::error::{CspmuError, Result};
use crate::host::{BackendRegistry, CspmuDevice, ImplBackend, ImplOps};
use crate::variant::{
    validate_table, NameGenerator, SequenceCounter, VariantDescriptor, NVIDIA_VARIANTS,
};

/// Shared state of the NVIDIA backend for as long as it is registered
///
/// Owns the sequence counter used by generically named PMUs, so indices
/// stay unique across every device this backend binds.
pub struct NvidiaBackend {
    table: &'static [VariantDescriptor],
    topology: Arc<dyn Topology + Send + Sync>,
    counter: SequenceCounter,
}

impl NvidiaBackend {
    pub fn new(topology: Arc<dyn Topology + Send + Sync>) -> Self {
        Self {
            table: NVIDIA_VARIANTS,
            topology,
            counter: SequenceCounter::new(),
        }
    }

    /// Backend driven by a custom match table
    pub fn with_table(
        table: &'static [VariantDescriptor],
        topology: Arc<dyn Topology + Send + Sync>,
    ) -> Result<Self> {
        validate_table(table).map_err(|e| CspmuError::ConfigError(e.to_string()))?;
        Ok(Self {
            table,
            topology,
            counter: SequenceCounter::new(),
        })
    }

    pub fn table(&self) -> &'static [VariantDescriptor] {
        self.table
    }

    pub fn counter(&self) -> &SequenceCounter {
        &self.counter
    }

    /// Bind one device without going through a registry
    pub fn bind(&self, device: &dyn CspmuDevice) -> Result<NvCspmu> {
        let names = NameGenerator::new(self.topology.as_ref(), &self.counter);
        bind(device, self.table, &names)
    }

    /// Register a new backend instance with `registry`
    pub fn register(
        registry: &BackendRegistry,
        topology: Arc<dyn Topology + Send + Sync>,
    ) -> Result<Arc<Self>> {
        let backend = Arc::new(Self::new(topology));
        registry.register(backend.clone())?;
        Ok(backend)
    }

    pub fn unregister(registry: &BackendRegistry) -> bool {
        registry.unregister(IMPLEMENTER_ID)
    }
}

impl ImplBackend for NvidiaBackend {
    fn implementer(&self) -> u32 {
        IMPLEMENTER_ID
    }

    fn init_ops(&self, device: &dyn CspmuDevice) -> Result<Box<dyn ImplOps>> {
        Ok(Box::new(self.bind(device)?))
    }
}
