//! # cspmu-raw
//!
//! Register definitions for Arm CoreSight Performance Monitoring Units.
//!
//! This crate provides type-safe abstractions over the memory-mapped register
//! window of a CoreSight PMU (Arm DEN0087) and the vendor
//! constants needed to drive NVIDIA uncore variants (PCIe, NVLink-C2C,
//! CNVLink, SCF).
//!
//! ## Features
//!
//! - `nvidia` (default) - NVIDIA product ids, port counts and filter masks
//!
//! ## Usage
//!
//! ```ignore
//! use cspmu_raw::arch::coresight::{self, Pmiidr};
//! use cspmu_raw::{FileWindow, RegisterLayout, RegisterWindow};
//!
//! let window = FileWindow::new("/sys/bus/platform/devices/NVDA2000:00/resource0");
//! let pmiidr = Pmiidr::from_reg_value(window.read32(coresight::regs::PMIIDR)?);
//!
//! // Per-counter filter register for counter 2
//! if let Some(offset) = coresight::regs::pmevfiltr(2) {
//!     window.write32(offset, 0x3FF)?;
//! }
//! ```

pub mod arch;
pub mod mmio;
pub mod register;

// Re-export for convenience
pub use mmio::{read_reg32, write_reg32, FileWindow, MmioError, RegisterWindow, Result};
pub use register::{genmask, RegisterLayout};

#[cfg(feature = "nvidia")]
pub use arch::nvidia as vendor;
