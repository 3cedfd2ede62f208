// Format lists: where the event id and the per-variant filter live in perf_event_attr

use super::FormatAttr;
use crate::format_attrs;

pub const EVENT_FORMAT: FormatAttr = FormatAttr::new("event", "config:0-32");
pub const FILTER_FORMAT: FormatAttr = FormatAttr::new("filter", "config1:0-31");

pub static SCF_FORMATS: &[FormatAttr] = &[EVENT_FORMAT];

pub static PCIE_FORMATS: &[FormatAttr] = format_attrs![
    "event" => "config:0-32",
    "root_port" => "config1:0-9",
];

pub static NVLINK_C2C_FORMATS: &[FormatAttr] = format_attrs![
    "event" => "config:0-32",
    "port" => "config1:0-1",
];

pub static CNVLINK_FORMATS: &[FormatAttr] = format_attrs![
    "event" => "config:0-32",
    "rem_socket" => "config1:0-3",
];

pub static GENERIC_FORMATS: &[FormatAttr] = &[EVENT_FORMAT, FILTER_FORMAT];

/// Bit mask covered by the `config1` field of a format list, if any
pub fn config1_mask(formats: &[FormatAttr]) -> u32 {
    formats
        .iter()
        .filter_map(|attr| attr.field())
        .filter(|(word, _, _)| *word == "config1")
        .fold(0, |mask, (_, low, high)| {
            mask | cspmu_raw::genmask(high.min(31), low.min(31))
        })
}
