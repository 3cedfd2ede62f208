//! Variant identification for NVIDIA CoreSight PMUs
//!
//! - [`table`] - static descriptor table and masked first-match lookup
//! - [`filter`] - filter register value computation
//! - [`naming`] - socket-indexed and sequential instance names

pub mod filter;
pub mod naming;
pub mod table;

pub use filter::{compute_filter, FilterSemantics, FilterTarget};
pub use naming::{NameGenerator, SequenceCounter};
pub use table::{
    find_variant, find_variant_in, validate_table, NamePattern, NameScheme, VariantDescriptor,
    NVIDIA_VARIANTS,
};
