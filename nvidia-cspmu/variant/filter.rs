// Filter register encoding
//
// A requested filter word of zero (after masking) means "no filter selected".
// Hardware encodes that as a variant-specific match-all pattern, so zero is
// replaced by the variant default instead of being written literally.

use cspmu_raw::arch::coresight::{regs, MAX_HW_COUNTERS};

use crate::error::{CspmuError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSemantics {
    /// Bits of `config1` the variant honours
    pub mask: u32,
    /// Value written when no honoured bit is set
    pub default: u32,
}

impl FilterSemantics {
    pub const fn new(mask: u32, default: u32) -> Self {
        Self { mask, default }
    }

    pub fn compute(&self, requested: u64) -> u32 {
        compute_filter(self, requested)
    }
}

/// Map a user filter request onto the value written to a filter register
pub fn compute_filter(semantics: &FilterSemantics, requested: u64) -> u32 {
    let masked = (requested & semantics.mask as u64) as u32;

    if masked == 0 {
        return semantics.default;
    }

    masked
}

/// Which filter register a computed value lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    /// PMEVFILTR for the counter with this hardware index
    Event { index: u32 },
    /// The shared PMCCFILTR
    Cycle,
}

impl FilterTarget {
    pub fn offset(&self) -> Result<u32> {
        match *self {
            FilterTarget::Event { index } => {
                regs::pmevfiltr(index).ok_or(CspmuError::CounterOutOfRange {
                    index,
                    max: MAX_HW_COUNTERS,
                })
            }
            FilterTarget::Cycle => Ok(regs::PMCCFILTR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PCIE: FilterSemantics = FilterSemantics::new(0x3FF, 0x3FF);
    const SCF: FilterSemantics = FilterSemantics::new(0x0, 0x0);

    #[test]
    fn test_zero_request_selects_default() {
        assert_eq!(compute_filter(&PCIE, 0), 0x3FF);
        assert_eq!(compute_filter(&PCIE, 0x5), 0x5);
    }

    #[test]
    fn test_bits_outside_mask_are_dropped() {
        // Only bit 10 set: masks to zero and falls back to the default
        assert_eq!(compute_filter(&PCIE, 0x400), 0x3FF);
        assert_eq!(compute_filter(&PCIE, 0xFFFF_0000_0000_0401), 0x1);
    }

    #[test]
    fn test_zero_default_still_substituted() {
        assert_eq!(compute_filter(&SCF, 0), 0);
        assert_eq!(compute_filter(&SCF, 0xFFFF_FFFF), 0);
    }

    #[test]
    fn test_compute_is_stable_when_default_within_mask() {
        let semantics = [
            PCIE,
            SCF,
            FilterSemantics::new(0x3, 0x3),
            FilterSemantics::new(0xF, 0xF),
            FilterSemantics::new(u32::MAX, u32::MAX),
        ];
        let requests = [0u64, 1, 0x5, 0x3FF, 0x400, 0xDEAD_BEEF, u64::MAX];

        for s in &semantics {
            assert_eq!(s.default & s.mask, s.default);
            for &request in &requests {
                let once = s.compute(request);
                assert_eq!(s.compute(once as u64), once);
            }
        }
    }

    #[test]
    fn test_masked_result_otherwise() {
        let generic = FilterSemantics::new(u32::MAX, u32::MAX);
        for request in [1u64, 0x8000_0000, 0x1_0000_0001] {
            assert_eq!(generic.compute(request), (request & 0xFFFF_FFFF) as u32);
        }
    }

    #[test]
    fn test_filter_target_offsets() {
        assert_eq!(FilterTarget::Event { index: 2 }.offset().unwrap(), 0xA00 + 4 * 2);
        assert_eq!(FilterTarget::Event { index: 0 }.offset().unwrap(), 0xA00);
        assert_eq!(FilterTarget::Cycle.offset().unwrap(), 0x47C);
        assert_ne!(
            FilterTarget::Event { index: 2 }.offset().unwrap(),
            FilterTarget::Cycle.offset().unwrap()
        );
    }

    #[test]
    fn test_filter_target_rejects_impossible_counter() {
        assert!(matches!(
            FilterTarget::Event { index: 64 }.offset(),
            Err(CspmuError::CounterOutOfRange { index: 64, max: 64 })
        ));
        assert!(FilterTarget::Event { index: 0x4000_0000 }.offset().is_err());
    }
}
