//! Arm CoreSight PMU architecture register definitions
//!
//! ## Register Page
//!
//! - **PMEVFILTR<n>** - per-counter filter, one 32-bit word per counter
//! - **PMCCFILTR** - filter for the dedicated cycle counter
//! - **PMIIDR** - implementation identification
//!
//! ## References
//!
//! - Arm CoreSight Performance Monitoring Unit Architecture (DEN0087)

use crate::register::{genmask, RegisterLayout};

/// Maximum number of counters the architecture allows
pub const MAX_HW_COUNTERS: u32 = 64;

/// Hardware index the host assigns to the dedicated cycle counter
pub const CYCLE_COUNTER_INDEX: u32 = 31;

/// Register offsets within page 0 of the PMU
pub mod regs {
    /// Event filter register for counter 0
    pub const PMEVFILTR: u32 = 0xA00;

    /// Stride between consecutive event filter registers
    pub const PMEVFILTR_STRIDE: u32 = 4;

    /// Cycle counter filter register
    pub const PMCCFILTR: u32 = 0x47C;

    /// Implementation identification register
    pub const PMIIDR: u32 = 0xE08;

    /// Get the event filter register offset for a counter
    ///
    /// Returns `None` for indices the architecture cannot have.
    pub const fn pmevfiltr(counter_index: u32) -> Option<u32> {
        if counter_index >= super::MAX_HW_COUNTERS {
            return None;
        }
        Some(PMEVFILTR + PMEVFILTR_STRIDE * counter_index)
    }
}

/// Event encodings that every CoreSight PMU understands
pub mod events {
    /// Event id the host routes to the dedicated cycle counter
    pub const CYCLES_DEFAULT: u64 = 1 << 32;
}

/// PMIIDR field masks
pub mod pmiidr {
    use super::genmask;

    pub const IMPLEMENTER_MASK: u32 = genmask(11, 0);
    pub const REVISION_MASK: u32 = genmask(15, 12);
    pub const VARIANT_MASK: u32 = genmask(19, 16);
    pub const PRODUCT_ID_MASK: u32 = genmask(31, 20);

    pub const REVISION_SHIFT: u32 = 12;
    pub const VARIANT_SHIFT: u32 = 16;
    pub const PRODUCT_ID_SHIFT: u32 = 20;
}

/// Implementation Identification Register layout
///
/// ## Register Format
///
/// | Bits   | Field        | Description                              |
/// |--------|--------------|------------------------------------------|
/// | 0-11   | implementer  | JEP106 code of the implementer           |
/// | 12-15  | revision     | Minor revision of the product            |
/// | 16-19  | variant      | Major revision of the product            |
/// | 20-31  | product_id   | Implementer-defined product identifier   |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pmiidr {
    /// Implementer code (bits 0-11)
    pub implementer: u16,

    /// Revision (bits 12-15)
    pub revision: u8,

    /// Variant (bits 16-19)
    pub variant: u8,

    /// Product id (bits 20-31)
    pub product_id: u16,
}

impl RegisterLayout for Pmiidr {
    fn to_reg_value(&self) -> u32 {
        (self.implementer as u32 & pmiidr::IMPLEMENTER_MASK)
            | (((self.revision as u32) << pmiidr::REVISION_SHIFT) & pmiidr::REVISION_MASK)
            | (((self.variant as u32) << pmiidr::VARIANT_SHIFT) & pmiidr::VARIANT_MASK)
            | (((self.product_id as u32) << pmiidr::PRODUCT_ID_SHIFT) & pmiidr::PRODUCT_ID_MASK)
    }

    fn from_reg_value(value: u32) -> Self {
        Self {
            implementer: (value & pmiidr::IMPLEMENTER_MASK) as u16,
            revision: ((value & pmiidr::REVISION_MASK) >> pmiidr::REVISION_SHIFT) as u8,
            variant: ((value & pmiidr::VARIANT_MASK) >> pmiidr::VARIANT_SHIFT) as u8,
            product_id: ((value & pmiidr::PRODUCT_ID_MASK) >> pmiidr::PRODUCT_ID_SHIFT) as u16,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.implementer > 0xFFF {
            return Err("Implementer must be <= 0xFFF (12 bits)");
        }
        if self.revision > 0xF {
            return Err("Revision must be <= 0xF (4 bits)");
        }
        if self.variant > 0xF {
            return Err("Variant must be <= 0xF (4 bits)");
        }
        if self.product_id > 0xFFF {
            return Err("Product id must be <= 0xFFF (12 bits)");
        }
        Ok(())
    }
}

impl Pmiidr {
    /// Product id field as the 32-bit value vendor match tables compare against
    pub fn product_id(value: u32) -> u32 {
        (value & pmiidr::PRODUCT_ID_MASK) >> pmiidr::PRODUCT_ID_SHIFT
    }

    /// Implementer field of a raw PMIIDR value
    pub fn implementer(value: u32) -> u32 {
        value & pmiidr::IMPLEMENTER_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pmiidr_decode() {
        // NVIDIA (0x36B), product 0x103, variant 1, revision 2
        let raw = (0x103 << 20) | (1 << 16) | (2 << 12) | 0x36B;
        let pmiidr = Pmiidr::from_reg_value(raw);

        assert_eq!(pmiidr.implementer, 0x36B);
        assert_eq!(pmiidr.revision, 2);
        assert_eq!(pmiidr.variant, 1);
        assert_eq!(pmiidr.product_id, 0x103);
        assert_eq!(pmiidr.to_reg_value(), raw);

        assert_eq!(Pmiidr::product_id(raw), 0x103);
        assert_eq!(Pmiidr::implementer(raw), 0x36B);
    }

    #[test]
    fn test_pmiidr_validation() {
        let mut pmiidr = Pmiidr::default();
        assert!(pmiidr.validate().is_ok());

        pmiidr.variant = 0x10; // Too large (4 bits)
        assert!(pmiidr.validate().is_err());

        pmiidr.variant = 0;
        pmiidr.product_id = 0x1000; // Too large (12 bits)
        assert!(pmiidr.validate().is_err());
    }

    #[test]
    fn test_filter_register_offsets() {
        assert_eq!(regs::pmevfiltr(0), Some(0xA00));
        assert_eq!(regs::pmevfiltr(2), Some(0xA08));
        assert_eq!(regs::pmevfiltr(63), Some(0xAFC));
        assert_ne!(regs::pmevfiltr(2), Some(regs::PMCCFILTR));
    }

    #[test]
    fn test_filter_register_index_out_of_range() {
        assert_eq!(regs::pmevfiltr(MAX_HW_COUNTERS), None);
        // 0xA00 + 4 * 0x4000_0000 would wrap back onto counter 0
        assert_eq!(regs::pmevfiltr(0x4000_0000), None);
        assert_eq!(regs::pmevfiltr(u32::MAX), None);
    }
}
