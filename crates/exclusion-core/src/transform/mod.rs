//! Per-pixel color transforms.

pub mod exclusion;
