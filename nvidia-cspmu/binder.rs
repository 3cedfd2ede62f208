// Per-device binding: pick the variant, build the context, expose ImplOps

use cspmu_raw::arch::coresight::Pmiidr;

use crate::attrs::{EventAttrs, FormatAttrs};
use crate::error::{CspmuError, Result};
use crate::host::{CounterKind, CspmuDevice, ImplOps, PmuEvent};
use crate::variant::{
    find_variant_in, FilterSemantics, FilterTarget, NameGenerator, VariantDescriptor,
};

/// State derived once from the matched variant, owned by one device
#[derive(Debug, Clone)]
pub struct NvCspmuContext {
    name: String,
    filter: FilterSemantics,
    event_attrs: EventAttrs,
    format_attrs: FormatAttrs,
    variant: &'static VariantDescriptor,
}

impl NvCspmuContext {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> FilterSemantics {
        self.filter
    }

    pub fn variant(&self) -> &'static VariantDescriptor {
        self.variant
    }

    /// Filter value for `event` under this device's semantics
    pub fn event_filter(&self, event: &PmuEvent) -> u32 {
        self.filter.compute(event.config1)
    }
}

/// NVIDIA implementation of the host callbacks for one device
#[derive(Debug, Clone)]
pub struct NvCspmu {
    ctx: NvCspmuContext,
}

impl NvCspmu {
    pub fn context(&self) -> &NvCspmuContext {
        &self.ctx
    }

    fn write_filter(
        &self,
        device: &dyn CspmuDevice,
        event: &PmuEvent,
        target: FilterTarget,
    ) -> Result<()> {
        let offset = target.offset()?;
        let filter = self.ctx.event_filter(event);

        tracing::trace!(
            "{}: filter 0x{:x} -> register 0x{:03x} (config1 0x{:x})",
            self.ctx.name,
            filter,
            offset,
            event.config1
        );

        device.write32(offset, filter)
    }
}

impl ImplOps for NvCspmu {
    fn name(&self) -> &str {
        &self.ctx.name
    }

    fn event_attrs(&self) -> EventAttrs {
        self.ctx.event_attrs
    }

    fn format_attrs(&self) -> FormatAttrs {
        self.ctx.format_attrs
    }

    fn set_ev_filter(&self, device: &dyn CspmuDevice, event: &PmuEvent) -> Result<()> {
        // Cycle events use the architected cycle counter index
        let index = match event.counter {
            CounterKind::Event(index) => index,
            CounterKind::Cycle => cspmu_raw::arch::coresight::CYCLE_COUNTER_INDEX,
        };
        self.write_filter(device, event, FilterTarget::Event { index })
    }

    fn set_cc_filter(&self, device: &dyn CspmuDevice, event: &PmuEvent) -> Result<()> {
        self.write_filter(device, event, FilterTarget::Cycle)
    }
}

/// Identify `device` against `table` and build its NVIDIA operations
///
/// The returned value is complete before the host sees it, so a failure
/// leaves no partially registered callbacks behind.
pub fn bind(
    device: &dyn CspmuDevice,
    table: &'static [VariantDescriptor],
    names: &NameGenerator<'_>,
) -> Result<NvCspmu> {
    let product_id = Pmiidr::product_id(device.pmiidr()?);

    let variant =
        find_variant_in(table, product_id).ok_or(CspmuError::NoMatchingVariant { product_id })?;

    let name = names.generate(device, variant)?;

    tracing::debug!(
        "{}: product 0x{:03x} bound as {} ({} variant)",
        device.dev_name(),
        product_id,
        name,
        variant.label
    );

    Ok(NvCspmu {
        ctx: NvCspmuContext {
            name,
            filter: variant.filter,
            event_attrs: variant.event_attrs,
            format_attrs: variant.format_attrs,
            variant,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::{events, formats};
    use crate::common::{CpuMask, FixedTopology};
    use crate::host::MemoryDevice;
    use crate::variant::{SequenceCounter, NVIDIA_VARIANTS};
    use cspmu_raw::arch::coresight::regs;

    fn topology() -> FixedTopology {
        FixedTopology::new().with_node(0, 0..4).with_node(1, 4..8)
    }

    fn bind_product(product_id: u32, cpus: &str) -> (MemoryDevice, NvCspmu) {
        let topology = topology();
        let counter = SequenceCounter::new();
        let names = NameGenerator::new(&topology, &counter);

        let dev = MemoryDevice::nvidia("pmu", product_id, CpuMask::parse(cpus).unwrap());
        let ops = bind(&dev, NVIDIA_VARIANTS, &names).unwrap();
        (dev, ops)
    }

    #[test]
    fn test_bind_pcie() {
        let (_, ops) = bind_product(0x103, "4-7");

        assert_eq!(ops.name(), "nvidia_pcie_pmu_1");
        assert_eq!(ops.event_attrs(), events::MCF_EVENTS);
        assert_eq!(ops.format_attrs(), formats::PCIE_FORMATS);
        assert_eq!(ops.context().filter(), FilterSemantics::new(0x3FF, 0x3FF));
        assert_eq!(ops.context().variant().label, "pcie");
    }

    #[test]
    fn test_bind_scf_and_generic() {
        let (_, scf) = bind_product(0x2CF, "0");
        assert_eq!(scf.name(), "nvidia_scf_pmu_0");
        assert_eq!(scf.event_attrs(), events::SCF_EVENTS);
        assert_eq!(scf.format_attrs(), formats::SCF_FORMATS);

        let (_, generic) = bind_product(0x777, "0");
        assert_eq!(generic.name(), "nvidia_uncore_pmu_0");
        assert_eq!(generic.event_attrs(), events::GENERIC_EVENTS);
        assert_eq!(generic.format_attrs(), formats::GENERIC_FORMATS);
    }

    #[test]
    fn test_event_filter_writes_per_counter_register() {
        let (dev, ops) = bind_product(0x103, "0");

        ops.set_ev_filter(&dev, &PmuEvent::new(0x0, 0x5, CounterKind::Event(2)))
            .unwrap();
        assert_eq!(dev.register(regs::PMEVFILTR + 4 * 2), 0x5);

        ops.set_ev_filter(&dev, &PmuEvent::new(0x0, 0x0, CounterKind::Event(3)))
            .unwrap();
        assert_eq!(dev.register(0xA0C), 0x3FF);

        // Cycle filter untouched by per-counter writes
        assert_eq!(dev.register(regs::PMCCFILTR), 0);
    }

    #[test]
    fn test_cycle_filter_writes_shared_register() {
        let (dev, ops) = bind_product(0x104, "0");

        ops.set_cc_filter(&dev, &PmuEvent::new(1 << 32, 0x1, CounterKind::Cycle))
            .unwrap();
        assert_eq!(dev.register(regs::PMCCFILTR), 0x1);

        ops.set_cc_filter(&dev, &PmuEvent::new(1 << 32, 0x0, CounterKind::Cycle))
            .unwrap();
        assert_eq!(dev.register(regs::PMCCFILTR), 0x3);
    }

    #[test]
    fn test_filter_bits_beyond_variant_are_ignored() {
        let (dev, ops) = bind_product(0x106, "0");

        // Bit 4 is outside the 4 remote-socket bits
        ops.set_ev_filter(&dev, &PmuEvent::new(0, 0x10, CounterKind::Event(0)))
            .unwrap();
        assert_eq!(dev.register(0xA00), 0xF);

        ops.set_ev_filter(&dev, &PmuEvent::new(0, 0x12, CounterKind::Event(0)))
            .unwrap();
        assert_eq!(dev.register(0xA00), 0x2);
    }

    #[test]
    fn test_scf_writes_zero_filter() {
        let (dev, ops) = bind_product(0x2CF, "0");
        CspmuDevice::write32(&dev, 0xA04, 0xFFFF).unwrap();

        ops.set_ev_filter(&dev, &PmuEvent::new(0xF0, 0xFFFF, CounterKind::Event(1)))
            .unwrap();
        assert_eq!(dev.register(0xA04), 0);
    }

    #[test]
    fn test_cycle_event_on_event_filter_uses_counter_31() {
        let (dev, ops) = bind_product(0x103, "0");

        ops.set_ev_filter(&dev, &PmuEvent::new(1 << 32, 0x0, CounterKind::Cycle))
            .unwrap();
        assert_eq!(dev.register(regs::PMEVFILTR + 4 * 31), 0x3FF);
        assert_eq!(dev.register(0xA7C), 0x3FF);
        assert_eq!(dev.register(regs::PMCCFILTR), 0);
    }

    #[test]
    fn test_out_of_range_counter_rejected() {
        let (dev, ops) = bind_product(0x103, "0");

        let err = ops
            .set_ev_filter(&dev, &PmuEvent::new(0, 0x5, CounterKind::Event(0x4000_0000)))
            .unwrap_err();
        assert!(matches!(
            err,
            CspmuError::CounterOutOfRange {
                index: 0x4000_0000,
                ..
            }
        ));

        assert!(ops
            .set_ev_filter(&dev, &PmuEvent::new(0, 0x5, CounterKind::Event(64)))
            .is_err());

        // Nothing written, in particular not counter 0's filter
        assert_eq!(dev.register(regs::PMEVFILTR), 0);
    }

    #[test]
    fn test_bind_fails_when_name_indices_exhausted() {
        let topology = topology();
        let counter = SequenceCounter::starting_at(u32::MAX);
        let names = NameGenerator::new(&topology, &counter);

        let dev = MemoryDevice::nvidia("pmu", 0x777, CpuMask::parse("0").unwrap());
        let err = bind(&dev, NVIDIA_VARIANTS, &names).unwrap_err();
        assert!(matches!(err, CspmuError::ResourceExhausted { .. }));
        assert_eq!(counter.peek(), u32::MAX);
    }

    #[test]
    fn test_bind_without_fallback_fails() {
        static NO_FALLBACK: &[VariantDescriptor] = &[];
        let topology = topology();
        let counter = SequenceCounter::new();
        let names = NameGenerator::new(&topology, &counter);

        let dev = MemoryDevice::nvidia("pmu", 0x103, CpuMask::new());
        let err = bind(&dev, NO_FALLBACK, &names).unwrap_err();
        assert!(matches!(
            err,
            CspmuError::NoMatchingVariant { product_id: 0x103 }
        ));
        assert_eq!(counter.peek(), 0);
    }
}
