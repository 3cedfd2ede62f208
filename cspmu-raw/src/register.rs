//! Generic register abstractions for type-safe PMU register programming

/// Build a contiguous bit mask covering bits `low..=high`
///
/// Mirrors the `GENMASK` convention used by hardware manuals, so a port
/// field spanning bits 0-9 is written `genmask(9, 0)`.
pub const fn genmask(high: u32, low: u32) -> u32 {
    let upper = if high >= 31 {
        u32::MAX
    } else {
        (1u32 << (high + 1)) - 1
    };
    upper & !((1u32 << low) - 1)
}

/// Trait for register layouts that can be converted to/from raw register values
///
/// CoreSight PMU registers in the 4KB page are 32 bits wide, so layouts
/// convert to and from `u32`.
///
/// # Example
///
/// ```ignore
/// use cspmu_raw::register::RegisterLayout;
///
/// #[derive(Debug, Default)]
/// struct MyFilter {
///     ports: u16,
/// }
///
/// impl RegisterLayout for MyFilter {
///     fn to_reg_value(&self) -> u32 {
///         self.ports as u32 & 0x3FF
///     }
///
///     fn from_reg_value(value: u32) -> Self {
///         Self { ports: (value & 0x3FF) as u16 }
///     }
/// }
/// ```
pub trait RegisterLayout: Sized {
    /// Convert this register layout to a raw register value
    fn to_reg_value(&self) -> u32;

    /// Parse a raw register value into this register layout
    fn from_reg_value(value: u32) -> Self;

    /// Validate that the register values are within acceptable ranges
    ///
    /// Returns `Ok(())` if valid, or an error message if invalid.
    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genmask() {
        assert_eq!(genmask(9, 0), 0x3FF);
        assert_eq!(genmask(1, 0), 0x3);
        assert_eq!(genmask(3, 0), 0xF);
        assert_eq!(genmask(31, 0), 0xFFFF_FFFF);
        assert_eq!(genmask(31, 20), 0xFFF0_0000);
        assert_eq!(genmask(15, 12), 0xF000);
    }
}
