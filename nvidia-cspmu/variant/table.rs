// Static NVIDIA variant table and masked first-match lookup

use cspmu_raw::vendor::{filter, product};

use super::filter::FilterSemantics;
use crate::attrs::{events, formats, EventAttrs, FormatAttrs};

/// How a variant derives the index in its instance name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameScheme {
    /// NUMA node of the first CPU associated with the PMU
    Socket,
    /// Next value of the backend-wide sequence counter
    Sequential,
}

/// Instance name template with a single `{}` placeholder for the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamePattern(&'static str);

impl NamePattern {
    pub const fn new(pattern: &'static str) -> Self {
        Self(pattern)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Substitute `index` for the placeholder; `None` if there is none
    pub fn render(&self, index: u32) -> Option<String> {
        let (prefix, suffix) = self.0.split_once("{}")?;
        Some(format!("{prefix}{index}{suffix}"))
    }

    pub fn is_well_formed(&self) -> bool {
        self.0.matches("{}").count() == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantDescriptor {
    /// Short family label
    pub label: &'static str,
    pub match_id: u32,
    pub match_mask: u32,
    pub filter: FilterSemantics,
    pub name_pattern: NamePattern,
    pub name_scheme: NameScheme,
    pub event_attrs: EventAttrs,
    pub format_attrs: FormatAttrs,
}

impl VariantDescriptor {
    pub fn matches(&self, product_id: u32) -> bool {
        (self.match_id & self.match_mask) == (product_id & self.match_mask)
    }

    /// A zero mask compares no bits and accepts every product id
    pub fn is_fallback(&self) -> bool {
        self.match_mask == 0
    }
}

const GENERIC_VARIANT: VariantDescriptor = VariantDescriptor {
    label: "generic",
    match_id: 0,
    match_mask: 0,
    filter: FilterSemantics::new(filter::GENERIC_MASK, filter::GENERIC_MASK),
    name_pattern: NamePattern::new("nvidia_uncore_pmu_{}"),
    name_scheme: NameScheme::Sequential,
    event_attrs: events::GENERIC_EVENTS,
    format_attrs: formats::GENERIC_FORMATS,
};

/// Known NVIDIA PMUs in priority order; the generic fallback must stay last
pub static NVIDIA_VARIANTS: &[VariantDescriptor] = &[
    VariantDescriptor {
        label: "pcie",
        match_id: product::PCIE,
        match_mask: product::MASK,
        filter: FilterSemantics::new(filter::PCIE_MASK, filter::PCIE_MASK),
        name_pattern: NamePattern::new("nvidia_pcie_pmu_{}"),
        name_scheme: NameScheme::Socket,
        event_attrs: events::MCF_EVENTS,
        format_attrs: formats::PCIE_FORMATS,
    },
    VariantDescriptor {
        label: "nvlink_c2c1",
        match_id: product::NVLINK_C2C1,
        match_mask: product::MASK,
        filter: FilterSemantics::new(filter::NVLINK_C2C_MASK, filter::NVLINK_C2C_MASK),
        name_pattern: NamePattern::new("nvidia_nvlink_c2c1_pmu_{}"),
        name_scheme: NameScheme::Socket,
        event_attrs: events::MCF_EVENTS,
        format_attrs: formats::NVLINK_C2C_FORMATS,
    },
    VariantDescriptor {
        label: "nvlink_c2c0",
        match_id: product::NVLINK_C2C0,
        match_mask: product::MASK,
        filter: FilterSemantics::new(filter::NVLINK_C2C_MASK, filter::NVLINK_C2C_MASK),
        name_pattern: NamePattern::new("nvidia_nvlink_c2c0_pmu_{}"),
        name_scheme: NameScheme::Socket,
        event_attrs: events::MCF_EVENTS,
        format_attrs: formats::NVLINK_C2C_FORMATS,
    },
    VariantDescriptor {
        label: "cnvlink",
        match_id: product::CNVLINK,
        match_mask: product::MASK,
        filter: FilterSemantics::new(filter::CNVLINK_MASK, filter::CNVLINK_MASK),
        name_pattern: NamePattern::new("nvidia_cnvlink_pmu_{}"),
        name_scheme: NameScheme::Socket,
        event_attrs: events::MCF_EVENTS,
        format_attrs: formats::CNVLINK_FORMATS,
    },
    VariantDescriptor {
        label: "scf",
        match_id: product::SCF,
        match_mask: product::MASK,
        filter: FilterSemantics::new(0x0, 0x0),
        name_pattern: NamePattern::new("nvidia_scf_pmu_{}"),
        name_scheme: NameScheme::Socket,
        event_attrs: events::SCF_EVENTS,
        format_attrs: formats::SCF_FORMATS,
    },
    GENERIC_VARIANT,
];

/// First descriptor in `table` whose masked id equals the masked product id
pub fn find_variant_in(table: &[VariantDescriptor], product_id: u32) -> Option<&VariantDescriptor> {
    table.iter().find(|variant| variant.matches(product_id))
}

/// Look up the built-in table; unmatched ids resolve to the generic variant
pub fn find_variant(product_id: u32) -> &'static VariantDescriptor {
    find_variant_in(NVIDIA_VARIANTS, product_id).unwrap_or(&GENERIC_VARIANT)
}

/// Check the ordering rules a match table relies on
pub fn validate_table(table: &[VariantDescriptor]) -> Result<(), &'static str> {
    let Some((last, rest)) = table.split_last() else {
        return Err("Variant table is empty");
    };

    if !last.is_fallback() {
        return Err("Last variant must have a zero match mask");
    }
    if rest.iter().any(VariantDescriptor::is_fallback) {
        return Err("Fallback variant shadows the entries after it");
    }
    if table.iter().any(|v| !v.name_pattern.is_well_formed()) {
        return Err("Name pattern must contain exactly one {} placeholder");
    }
    Ok(())
}
