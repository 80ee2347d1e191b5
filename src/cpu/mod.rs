//! The simulated calculator.
//!
//! - 16 memory cells of 8 characters each
//! - Control unit with PC, MAR, IBR and IR
//! - ALU with an 8-bit fixed-point accumulator
//! - Six instructions: `+ - / *`, SAVE, END

pub mod register;
pub mod memory;
pub mod decode;
pub mod alu;
pub mod control;
pub mod snapshot;

pub use register::Register;
pub use memory::{Memory, MemoryFault, MemoryImage};
pub use decode::{ArithOp, Instruction, Opcode, DecodeError};
pub use alu::{Alu, ArithError};
pub use control::{ControlUnit, Cycle, StopReason};
pub use snapshot::{Snapshot, Trace, Wires, RegisterView};
