//! Device-side resource bookkeeping.

pub mod tracker;

pub use tracker::{GpuAllocation, GpuResourceKind, GpuResourceTracker};
