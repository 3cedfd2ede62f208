use thiserror::Error;

#[derive(Error, Debug)]
pub enum CspmuError {
    #[error("Register access failed: {0}")]
    MmioError(#[from] cspmu_raw::MmioError),

    #[error("No variant matches product id 0x{product_id:X}; the match table has no fallback")]
    NoMatchingVariant { product_id: u32 },

    #[error("Out of resources while binding {device}: {reason}")]
    ResourceExhausted { device: String, reason: String },

    #[error("Counter index {index} is beyond the {max} counters a PMU can have")]
    CounterOutOfRange { index: u32, max: u32 },

    #[error("No backend registered for implementer 0x{implementer:03X}")]
    NoBackend { implementer: u32 },

    #[error("Backend for implementer 0x{implementer:03X} is already registered")]
    BackendBusy { implementer: u32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl CspmuError {
    pub fn resource_exhausted(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceExhausted {
            device: device.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CspmuError>;
