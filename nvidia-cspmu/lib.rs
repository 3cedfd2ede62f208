// Macros (must be first for visibility)
#[macro_use]
pub mod macros;

pub mod attrs;
pub mod backend;
pub mod binder;
pub mod common;
pub mod config;
pub mod error;
pub mod host;
pub mod variant;

pub use backend::NvidiaBackend;
pub use binder::{bind, NvCspmu, NvCspmuContext};
pub use config::ProbeConfig;
pub use error::{CspmuError, Result};
pub use host::{BackendRegistry, CounterKind, CspmuDevice, ImplBackend, ImplOps, PmuEvent};
pub use variant::{compute_filter, find_variant, FilterSemantics, NameScheme, VariantDescriptor};
