//! Utility Module
//!
//! - [`time`]: platform `Instant`/`Duration` and the [`FrameClock`]

pub mod time;

pub use time::{Duration, FrameClock, Instant, MAX_FRAME_STEP};
