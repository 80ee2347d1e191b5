//! # Von Neumann Calculator
//!
//! A step-by-step simulator of a small teaching computer built around the
//! von Neumann architecture.
//!
//! An arithmetic expression such as `3 * 2.5` is tokenized into a tiny
//! program, loaded into sixteen 8-bit memory cells and executed through
//! explicit fetch, decode and execute phases. Every micro-step is recorded as
//! a [`Snapshot`], so a front end can replay the run: which registers changed,
//! which data paths carried a value, what the display shows.
//!
//! ```
//! use vonneumann::{simulate, SimConfig};
//!
//! let sim = simulate("3 * 2.5", &SimConfig::default());
//! assert_eq!(sim.display(), "7.5");
//! ```

pub mod binary;
pub mod cpu;
pub mod asm;
pub mod config;
pub mod machine;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use binary::{Address, Word};
pub use cpu::{Alu, ArithError, ControlUnit, Memory, MemoryFault, Snapshot, StopReason, Trace};
pub use asm::{assemble, disassemble, tokenize, LoadError};
pub use config::SimConfig;
pub use machine::{simulate, run_tokens, Machine, MachineError, Outcome, Simulation};

#[cfg(feature = "tui")]
pub use tui::run_viewer;
