//! NVIDIA CoreSight PMU definitions
//!
//! NVIDIA ships several uncore PMUs that implement the CoreSight PMU
//! architecture. They share the register map but differ in what the
//! filter registers select:
//!
//! - **PCIe** - root ports (10 bits)
//! - **NVLink-C2C0 / C2C1** - chip-to-chip ports (2 bits)
//! - **CNVLink** - remote sockets (4 bits)
//! - **SCF** (Scalable Coherency Fabric) - no filter
//!
//! Unknown NVIDIA products are driven as generic PMUs with a full 32-bit
//! filter field.

use crate::register::{genmask, RegisterLayout};

/// JEP106 implementer code reported in PMIIDR by NVIDIA PMUs
pub const IMPLEMENTER_ID: u32 = 0x36B;

/// PMIIDR product ids
pub mod product {
    pub const PCIE: u32 = 0x103;
    pub const NVLINK_C2C1: u32 = 0x104;
    pub const NVLINK_C2C0: u32 = 0x105;
    pub const CNVLINK: u32 = 0x106;
    pub const SCF: u32 = 0x2CF;

    /// Product ids are compared on all 32 bits of the extracted field
    pub const MASK: u32 = super::genmask(31, 0);
}

pub const PCIE_PORT_COUNT: u32 = 10;
pub const NVLINK_C2C_PORT_COUNT: u32 = 2;
pub const CNVLINK_PORT_COUNT: u32 = 4;

/// Filter field masks, one bit per selectable port or socket
pub mod filter {
    use super::*;

    pub const PCIE_MASK: u32 = genmask(PCIE_PORT_COUNT - 1, 0);
    pub const NVLINK_C2C_MASK: u32 = genmask(NVLINK_C2C_PORT_COUNT - 1, 0);
    pub const CNVLINK_MASK: u32 = genmask(CNVLINK_PORT_COUNT - 1, 0);
    pub const GENERIC_MASK: u32 = genmask(31, 0);
}

/// PCIe PMU filter register layout
///
/// | Bits   | Field      | Description                      |
/// |--------|------------|----------------------------------|
/// | 0-9    | root_ports | One bit per PCIe root port       |
/// | 10-31  | reserved   |                                  |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PcieFilter {
    pub root_ports: u16,
}

impl RegisterLayout for PcieFilter {
    fn to_reg_value(&self) -> u32 {
        self.root_ports as u32 & filter::PCIE_MASK
    }

    fn from_reg_value(value: u32) -> Self {
        Self {
            root_ports: (value & filter::PCIE_MASK) as u16,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.root_ports as u32 > filter::PCIE_MASK {
            return Err("Root ports must be <= 0x3FF (10 bits)");
        }
        Ok(())
    }
}

/// NVLink-C2C PMU filter register layout
///
/// | Bits   | Field    | Description                 |
/// |--------|----------|-----------------------------|
/// | 0-1    | ports    | One bit per C2C port        |
/// | 2-31   | reserved |                             |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NvlinkC2cFilter {
    pub ports: u8,
}

impl RegisterLayout for NvlinkC2cFilter {
    fn to_reg_value(&self) -> u32 {
        self.ports as u32 & filter::NVLINK_C2C_MASK
    }

    fn from_reg_value(value: u32) -> Self {
        Self {
            ports: (value & filter::NVLINK_C2C_MASK) as u8,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.ports as u32 > filter::NVLINK_C2C_MASK {
            return Err("Ports must be <= 0x3 (2 bits)");
        }
        Ok(())
    }
}

/// CNVLink PMU filter register layout
///
/// | Bits   | Field       | Description                   |
/// |--------|-------------|-------------------------------|
/// | 0-3    | rem_sockets | One bit per remote socket     |
/// | 4-31   | reserved    |                               |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CnvlinkFilter {
    pub rem_sockets: u8,
}

impl RegisterLayout for CnvlinkFilter {
    fn to_reg_value(&self) -> u32 {
        self.rem_sockets as u32 & filter::CNVLINK_MASK
    }

    fn from_reg_value(value: u32) -> Self {
        Self {
            rem_sockets: (value & filter::CNVLINK_MASK) as u8,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.rem_sockets as u32 > filter::CNVLINK_MASK {
            return Err("Remote sockets must be <= 0xF (4 bits)");
        }
        Ok(())
    }
}

/// Indices of the set bits in a filter value, lowest first
pub fn selected_ports(value: u32) -> Vec<u32> {
    (0..32u32).filter(|bit| value & (1 << bit) != 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_masks() {
        assert_eq!(filter::PCIE_MASK, 0x3FF);
        assert_eq!(filter::NVLINK_C2C_MASK, 0x3);
        assert_eq!(filter::CNVLINK_MASK, 0xF);
        assert_eq!(filter::GENERIC_MASK, 0xFFFF_FFFF);
        assert_eq!(product::MASK, 0xFFFF_FFFF);
    }

    #[test]
    fn test_filter_layouts_drop_reserved_bits() {
        assert_eq!(PcieFilter::from_reg_value(0xFFFF).root_ports, 0x3FF);
        assert_eq!(NvlinkC2cFilter::from_reg_value(0x6).ports, 0x2);
        assert_eq!(CnvlinkFilter::from_reg_value(0x35).rem_sockets, 0x5);
    }

    #[test]
    fn test_filter_validation() {
        assert!(PcieFilter { root_ports: 0x3FF }.validate().is_ok());
        assert!(PcieFilter { root_ports: 0x400 }.validate().is_err());
        assert!(NvlinkC2cFilter { ports: 4 }.validate().is_err());
        assert!(CnvlinkFilter { rem_sockets: 0x10 }.validate().is_err());
    }

    #[test]
    fn test_selected_ports() {
        assert_eq!(selected_ports(0b1010), vec![1, 3]);
        assert!(selected_ports(0).is_empty());
        assert_eq!(selected_ports(filter::PCIE_MASK).len(), 10);
    }
}
