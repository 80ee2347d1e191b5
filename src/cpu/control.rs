//! Control unit.
//!
//! Drives the fetch-decode-execute cycle over [`Memory`] and the [`Alu`],
//! recording every micro-step into a [`Trace`]:
//!
//! - fetch: 3 snapshots (MAR := PC, IBR := [MAR], PC := PC + 1)
//! - decode: 1 snapshot (IR := IBR, opcode shown)
//! - execute: 2 snapshots for arithmetic, 1 for everything else

use crate::binary::fixed::format_value;
use crate::binary::{Address, Word};
use crate::cpu::alu::{Alu, ArithError};
use crate::cpu::decode::{ArithOp, DecodeError, Instruction, Opcode};
use crate::cpu::memory::{Memory, MemoryFault};
use crate::cpu::register::{AddressRegister, WordRegister};
use crate::cpu::snapshot::{Snapshot, Trace};
use serde::{Serialize, Deserialize};
use std::fmt;
use tracing::{debug, warn};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// SAVE wrote the accumulator to memory.
    Stored { address: Address, value: Word },
    /// END reset the accumulator.
    Ended,
    /// An arithmetic operation was refused.
    Arithmetic(ArithError),
    /// The instruction register held an unused opcode.
    InvalidOpcode(Word),
    /// The program read memory it never wrote.
    MemoryFault(MemoryFault),
    /// The configured cycle budget ran out.
    CycleLimit,
}

impl StopReason {
    /// Check if the run stopped on an error rather than SAVE or END.
    pub fn is_error(&self) -> bool {
        !matches!(self, StopReason::Stored { .. } | StopReason::Ended)
    }

    /// Text for the calculator display, `None` when END leaves it as is.
    pub fn display_text(&self) -> Option<String> {
        match self {
            StopReason::Stored { value, .. } => Some(format_value(value.value())),
            StopReason::Ended => None,
            StopReason::Arithmetic(e) => Some(e.to_string()),
            StopReason::InvalidOpcode(_) => Some("INVALID OPCODE".into()),
            StopReason::MemoryFault(_) => Some("MEMORY FAULT".into()),
            StopReason::CycleLimit => Some("CYCLE LIMIT".into()),
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Stored { address, value } => {
                write!(f, "stored {} at {}", format_value(value.value()), address)
            }
            StopReason::Ended => write!(f, "halted"),
            StopReason::Arithmetic(ArithError::DivideByZero) => write!(f, "division by zero"),
            StopReason::Arithmetic(e) => write!(f, "arithmetic {}", e.to_string().to_lowercase()),
            StopReason::InvalidOpcode(word) => write!(f, "invalid opcode in {}", word),
            StopReason::MemoryFault(fault) => write!(f, "memory fault: {}", fault),
            StopReason::CycleLimit => write!(f, "cycle limit reached"),
        }
    }
}

/// Result of one execute phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// Fetch the next instruction.
    Continue,
    /// The run is over.
    Stop(StopReason),
}

/// The control unit and its four registers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlUnit {
    /// Instruction register
    ir: WordRegister,
    /// Program counter
    pc: AddressRegister,
    /// Memory address register
    mar: AddressRegister,
    /// Instruction buffer register
    ibr: WordRegister,
}

impl ControlUnit {
    /// Create a control unit with every register zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Program counter.
    pub fn pc(&self) -> Address {
        self.pc.read()
    }

    /// Instruction register.
    pub fn ir(&self) -> Word {
        self.ir.read()
    }

    /// Fetch the instruction at PC into IBR and advance PC.
    pub fn fetch(&mut self, memory: &Memory, trace: &mut Trace) -> Result<(), MemoryFault> {
        // MAR := PC
        self.mar.store(self.pc.read());
        let mar = self.mar.read();
        trace.advance(|s| {
            s.ac.lit = false;
            s.wires.alu_ac = false;
            s.wires.pc_mar = true;
            s.mar.light(mar);
        });

        // IBR := [MAR]
        let word = match memory.fetch(mar) {
            Ok(word) => word,
            Err(fault) => {
                warn!(address = %mar, "fetch from empty cell");
                let reason = StopReason::MemoryFault(fault);
                trace.advance(|s| {
                    s.mar.lit = false;
                    s.wires.pc_mar = false;
                    s.wires.mar_memory = true;
                    s.lit_cell = Some(mar);
                    s.display = reason.display_text().unwrap_or_default();
                });
                return Err(fault);
            }
        };
        self.ibr.store(word);
        trace.advance(|s| {
            s.mar.lit = false;
            s.wires.pc_mar = false;
            s.wires.mar_memory = true;
            s.lit_cell = Some(mar);
            s.wires.memory_mbr = true;
            s.wires.mbr_ibr = true;
            s.ibr.light(word);
        });

        // PC := PC + 1
        self.pc.increment();
        let pc = self.pc.read();
        trace.advance(|s| {
            s.wires.mar_memory = false;
            s.lit_cell = None;
            s.wires.memory_mbr = false;
            s.wires.mbr_ibr = false;
            s.ibr.lit = false;
            s.pc.light(pc);
        });

        debug!(address = %mar, word = %word, "fetched");
        Ok(())
    }

    /// Move IBR into IR and show its opcode. Returns the instruction word.
    pub fn decode(&mut self, trace: &mut Trace) -> Word {
        self.ir.store(self.ibr.read());
        let word = self.ir.read();
        let opcode = Opcode::of_word(&word);

        trace.advance(|s| {
            s.pc.lit = false;
            s.ibr.lit = false;
            s.wires.ibr_ir = true;
            s.ir.light(word);
            s.opcode = opcode;
            s.opcode_lit = true;
        });

        debug!(word = %word, opcode = opcode.map_or("?", Opcode::symbol), "decoded");
        word
    }

    /// Execute the instruction word in IR.
    pub fn execute(&mut self, word: Word, alu: &mut Alu, memory: &mut Memory, trace: &mut Trace) -> Cycle {
        let instr = match Instruction::decode(word) {
            Ok(instr) => instr,
            Err(e) => {
                let reason = match e {
                    DecodeError::InvalidOpcode(word) => StopReason::InvalidOpcode(word),
                    DecodeError::Memory(fault) => StopReason::MemoryFault(fault),
                };
                warn!(word = %word, %reason, "cannot execute");
                trace.advance(|s| {
                    leave_decode(s);
                    s.display = reason.display_text().unwrap_or_default();
                });
                return Cycle::Stop(reason);
            }
        };

        match instr {
            Instruction::Arith { op, operand } => self.execute_arith(op, operand, alu, memory, trace),

            Instruction::Save { target } => {
                alu.store_to_memory(memory, target);
                let value = alu.accumulator();
                let image = memory.image();
                let reason = StopReason::Stored { address: target, value };
                trace.advance(|s| {
                    leave_decode(s);
                    s.lit_cell = Some(target);
                    s.ac.lit = true;
                    s.wires.ac_alu = true;
                    s.wires.alu_mbr = true;
                    s.wires.memory_mbr = true;
                    s.memory = image;
                    s.display = reason.display_text().unwrap_or_default();
                });
                debug!(address = %target, value = %value, "stored accumulator");
                Cycle::Stop(reason)
            }

            Instruction::End => {
                alu.halt();
                let ac = alu.accumulator();
                trace.advance(|s| {
                    leave_decode(s);
                    s.ac.value = ac;
                });
                debug!("halted");
                Cycle::Stop(StopReason::Ended)
            }
        }
    }

    fn execute_arith(
        &mut self,
        op: ArithOp,
        operand: Address,
        alu: &mut Alu,
        memory: &Memory,
        trace: &mut Trace,
    ) -> Cycle {
        let value = match memory.fetch(operand) {
            Ok(value) => value,
            Err(fault) => {
                warn!(address = %operand, "operand cell is empty");
                let reason = StopReason::MemoryFault(fault);
                trace.advance(|s| {
                    leave_decode(s);
                    s.lit_cell = Some(operand);
                    s.display = reason.display_text().unwrap_or_default();
                });
                return Cycle::Stop(reason);
            }
        };

        // Operand travels from memory into the ALU.
        trace.advance(|s| {
            leave_decode(s);
            s.lit_cell = Some(operand);
            s.wires.memory_mbr = true;
            s.wires.mbr_alu = true;
            s.operand.light(value);
            s.alu_on = true;
            s.wires.ac_alu = true;
        });

        // Result travels back into the accumulator.
        let result = alu.apply(op, value);
        trace.advance(|s| {
            s.wires.memory_mbr = false;
            s.wires.mbr_alu = false;
            s.wires.ac_alu = false;
            s.operand.lit = false;
            s.alu_on = false;
            s.lit_cell = None;
            s.wires.alu_ac = true;
            match result {
                Ok(ac) => s.ac.light(ac),
                Err(e) => s.display = e.to_string(),
            }
        });

        match result {
            Ok(ac) => {
                debug!(op = %op.symbol(), operand = %value, ac = %ac, "arithmetic");
                Cycle::Continue
            }
            Err(e) => {
                warn!(op = %op.symbol(), operand = %value, error = %e, "arithmetic refused");
                Cycle::Stop(StopReason::Arithmetic(e))
            }
        }
    }
}

/// Overrides shared by the first execute snapshot of every instruction.
fn leave_decode(s: &mut Snapshot) {
    s.opcode_lit = false;
    s.ir.lit = false;
    s.wires.ibr_ir = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(i: u8) -> Address {
        Address::new(i).unwrap()
    }

    fn num(value: f64) -> Word {
        Word::from_value(value).unwrap()
    }

    /// Memory with `add [2]`, `SAVE 3` and the operand 5.
    fn add_program() -> Memory {
        let mut mem = Memory::new();
        mem.write(addr(0), Instruction::Arith { op: ArithOp::Add, operand: addr(2) }.encode());
        mem.write(addr(1), Instruction::Save { target: addr(3) }.encode());
        mem.write(addr(2), num(5.0));
        mem
    }

    #[test]
    fn test_fetch_produces_three_snapshots() {
        let mem = add_program();
        let mut cu = ControlUnit::new();
        let mut trace = Trace::new(Snapshot::loaded(mem.image()));

        cu.fetch(&mem, &mut trace).unwrap();
        assert_eq!(trace.len(), 4);

        let a = trace.get(1).unwrap();
        assert!(a.wires.pc_mar && a.mar.lit);

        let b = trace.get(2).unwrap();
        assert!(!b.wires.pc_mar && !b.mar.lit);
        assert!(b.wires.mar_memory && b.wires.memory_mbr && b.wires.mbr_ibr && b.ibr.lit);
        assert_eq!(b.lit_cell, Some(addr(0)));
        assert_eq!(b.ibr.value.to_string(), "00000010");

        let c = trace.get(3).unwrap();
        assert!(!c.wires.mar_memory && !c.wires.memory_mbr && !c.wires.mbr_ibr && !c.ibr.lit);
        assert_eq!(c.lit_cell, None);
        assert!(c.pc.lit);
        assert_eq!(c.pc.value, addr(1));
        assert_eq!(cu.pc(), addr(1));
    }

    #[test]
    fn test_decode_shows_opcode() {
        let mem = add_program();
        let mut cu = ControlUnit::new();
        let mut trace = Trace::new(Snapshot::loaded(mem.image()));

        cu.fetch(&mem, &mut trace).unwrap();
        let word = cu.decode(&mut trace);

        assert_eq!(word.to_string(), "00000010");
        assert_eq!(cu.ir(), word);
        let s = trace.last();
        assert_eq!(s.opcode_symbol(), "+");
        assert!(s.opcode_lit && s.ir.lit && s.wires.ibr_ir);
        assert!(!s.pc.lit && !s.ibr.lit);
    }

    #[test]
    fn test_execute_add_continues() {
        let mut mem = add_program();
        let mut alu = Alu::new();
        let mut cu = ControlUnit::new();
        let mut trace = Trace::new(Snapshot::loaded(mem.image()));

        cu.fetch(&mem, &mut trace).unwrap();
        let word = cu.decode(&mut trace);
        let before = trace.len();
        assert_eq!(cu.execute(word, &mut alu, &mut mem, &mut trace), Cycle::Continue);
        assert_eq!(trace.len(), before + 2);

        let a = trace.get(before).unwrap();
        assert!(a.wires.memory_mbr && a.wires.mbr_alu && a.wires.ac_alu);
        assert!(a.alu_on && a.operand.lit);
        assert_eq!(a.operand.value, num(5.0));
        assert_eq!(a.lit_cell, Some(addr(2)));
        assert!(!a.opcode_lit && !a.ir.lit && !a.wires.ibr_ir);

        let b = trace.last();
        assert!(b.wires.alu_ac && b.ac.lit);
        assert!(!b.alu_on && !b.operand.lit && !b.wires.mbr_alu);
        assert_eq!(b.ac.value, num(5.0));
        assert_eq!(b.display, "");
    }

    #[test]
    fn test_execute_save_stops() {
        let mut mem = add_program();
        let mut alu = Alu::new();
        alu.add(num(2.5)).unwrap();
        let mut cu = ControlUnit::new();
        let mut trace = Trace::default();

        let word = Instruction::Save { target: addr(3) }.encode();
        let cycle = cu.execute(word, &mut alu, &mut mem, &mut trace);

        assert_eq!(cycle, Cycle::Stop(StopReason::Stored { address: addr(3), value: num(2.5) }));
        assert_eq!(mem.read(addr(3)), Some(num(2.5)));
        let s = trace.last();
        assert_eq!(s.display, "2.5");
        assert_eq!(s.memory[3], Some(num(2.5)));
        assert_eq!(s.lit_cell, Some(addr(3)));
        assert!(s.wires.ac_alu && s.wires.alu_mbr && s.ac.lit);
    }

    #[test]
    fn test_execute_end_zeroes_accumulator() {
        let mut mem = Memory::new();
        let mut alu = Alu::new();
        alu.add(num(7.0)).unwrap();
        let mut cu = ControlUnit::new();
        let mut trace = Trace::default();

        let cycle = cu.execute(Instruction::End.encode(), &mut alu, &mut mem, &mut trace);
        assert_eq!(cycle, Cycle::Stop(StopReason::Ended));
        assert_eq!(alu.accumulator(), Word::ZERO);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.last().display, "");
    }

    #[test]
    fn test_execute_arith_error_stops() {
        let mut mem = Memory::new();
        mem.write(addr(4), Word::ZERO);
        let mut alu = Alu::new();
        let mut cu = ControlUnit::new();
        let mut trace = Trace::default();

        let word = Instruction::Arith { op: ArithOp::Divide, operand: addr(4) }.encode();
        let cycle = cu.execute(word, &mut alu, &mut mem, &mut trace);

        assert_eq!(cycle, Cycle::Stop(StopReason::Arithmetic(ArithError::DivideByZero)));
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.last().display, "UNDEFINED");
        assert!(!trace.last().ac.lit);
    }

    #[test]
    fn test_execute_invalid_opcode() {
        let mut mem = Memory::new();
        let mut alu = Alu::new();
        let mut cu = ControlUnit::new();
        let mut trace = Trace::default();

        let word = Word::parse("11110000").unwrap();
        let cycle = cu.execute(word, &mut alu, &mut mem, &mut trace);

        assert_eq!(cycle, Cycle::Stop(StopReason::InvalidOpcode(word)));
        assert_eq!(trace.last().display, "INVALID OPCODE");
    }

    #[test]
    fn test_execute_empty_operand_faults() {
        let mut mem = Memory::new();
        let mut alu = Alu::new();
        let mut cu = ControlUnit::new();
        let mut trace = Trace::default();

        let word = Instruction::Arith { op: ArithOp::Add, operand: addr(9) }.encode();
        let cycle = cu.execute(word, &mut alu, &mut mem, &mut trace);

        assert_eq!(cycle, Cycle::Stop(StopReason::MemoryFault(MemoryFault::EmptyCell(addr(9)))));
        assert_eq!(trace.last().display, "MEMORY FAULT");
    }

    #[test]
    fn test_fetch_empty_cell_faults() {
        let mem = Memory::new();
        let mut cu = ControlUnit::new();
        let mut trace = Trace::default();

        assert_eq!(cu.fetch(&mem, &mut trace), Err(MemoryFault::EmptyCell(Address::ZERO)));
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.last().display, "MEMORY FAULT");
    }

    #[test]
    fn test_stop_reason_classification() {
        assert!(!StopReason::Ended.is_error());
        assert!(!StopReason::Stored { address: addr(0), value: Word::ZERO }.is_error());
        assert!(StopReason::Arithmetic(ArithError::Overflow).is_error());
        assert!(StopReason::CycleLimit.is_error());
        assert_eq!(StopReason::Ended.display_text(), None);
    }
}
