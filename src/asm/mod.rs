//! From expression text to a memory image.
//!
//! This module provides:
//! - An expression tokenizer (text → operator/number tokens)
//! - A two-pass loader (tokens → instruction and operand words)
//! - A disassembler (memory image → readable text)

pub mod tokenizer;
pub mod loader;
pub mod disasm;

pub use tokenizer::{tokenize, Expression};
pub use loader::{assemble, layout, LoadError};
pub use disasm::disassemble;
