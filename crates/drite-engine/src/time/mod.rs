//! Time subsystem.
//!
//! Frame timing decoupled from any clock source: the caller feeds it samples
//! (normally `Platform::time`) and gets `FrameTime` snapshots back.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
