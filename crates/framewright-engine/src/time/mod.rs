//! Time subsystem.
//!
//! `StepTimer` drives the update cadence of a `FrameController`:
//! - variable timestep: one update per tick with the measured delta
//! - fixed timestep: as many fixed-size updates as the accumulated time allows
//!
//! Timestamps can be injected (`tick_at`, `reset_elapsed_time_at`) so the
//! timer is deterministic under test.

mod step_timer;

pub use step_timer::{MIN_FIXED_STEP, StepTimer, TimerConfig};
