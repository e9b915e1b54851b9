//! Application orchestration.
//!
//! `Application` acquires the platform, owns the single window and drives the
//! poll / update / render loop. Window callbacks reach it through shared
//! `AppState`, never through the `Application` value itself.

mod app;

pub use app::{AppPhase, Application};
