//! Architecture and vendor specific register definitions
//!
//! The CoreSight PMU architecture fixes the register map and the PMIIDR
//! layout. Each implementer then ships its own products with vendor-specific
//! filter semantics on top of that map.
//!
//! ## Supported Implementers
//!
//! - **CoreSight PMU architecture** - register map common to all implementers
//! - **NVIDIA** (`nvidia` feature) - PCIe, NVLink-C2C, CNVLink and SCF PMUs

pub mod coresight;

#[cfg(feature = "nvidia")]
pub mod nvidia;
