//! Driftwatch engine - schema diff and change classification
//!
//! Pure, synchronous comparison of a warehouse column listing against an
//! incoming file's inferred columns. No I/O, no configuration, no shared
//! state: identical inputs always yield the identical ordered change list.

pub mod diff;
pub mod normalize;

pub use diff::diff;
pub use normalize::{normalize, to_warehouse_type, trim_name};
