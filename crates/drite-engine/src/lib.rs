//! Drite engine crate.
//!
//! This crate owns the platform, window and GPU abstractions plus the
//! application run loop that ties them together.

pub mod core;
pub mod device;
pub mod graphics;
pub mod input;
pub mod platform;
pub mod time;
pub mod window;

pub mod logging;
