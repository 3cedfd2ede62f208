//! User-facing event and format attributes
//!
//! Each variant exposes two static lists: named events (rendered by the host
//! as `event=0x<id>`) and format fields that tell tools which bits of
//! `config`/`config1` carry the event id and the filter.

pub mod events;
pub mod formats;

use std::fmt;

/// A named event and the value of `config` that selects it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventAttr {
    pub name: &'static str,
    pub config: u64,
}

impl EventAttr {
    pub const fn new(name: &'static str, config: u64) -> Self {
        Self { name, config }
    }

    /// Text the host publishes for this event
    pub fn render(&self) -> String {
        format!("event=0x{:x}", self.config)
    }
}

impl fmt::Display for EventAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: event=0x{:x}", self.name, self.config)
    }
}

/// A format field: which attribute word and bit range a knob occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatAttr {
    pub name: &'static str,
    pub layout: &'static str,
}

impl FormatAttr {
    pub const fn new(name: &'static str, layout: &'static str) -> Self {
        Self { name, layout }
    }

    /// Split `config1:0-9` into the word name and the inclusive bit range
    pub fn field(&self) -> Option<(&'static str, u32, u32)> {
        let (word, bits) = self.layout.split_once(':')?;
        let (low, high) = match bits.split_once('-') {
            Some((low, high)) => (low.parse().ok()?, high.parse().ok()?),
            None => {
                let bit = bits.parse().ok()?;
                (bit, bit)
            }
        };
        Some((word, low, high))
    }
}

impl fmt::Display for FormatAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.layout)
    }
}

pub type EventAttrs = &'static [EventAttr];
pub type FormatAttrs = &'static [FormatAttr];

pub fn find_event(attrs: EventAttrs, name: &str) -> Option<&'static EventAttr> {
    attrs.iter().find(|attr| attr.name == name)
}
