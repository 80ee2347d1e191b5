//! Terminal trace viewer.
//!
//! Replays a finished simulation one micro-step at a time:
//! - Registers with the changed ones highlighted
//! - Memory view with the accessed cell marked
//! - Active data paths
//! - The calculator display

mod app;
mod ui;

pub use app::{ViewerApp, run_viewer};
