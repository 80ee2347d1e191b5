//! Machine state snapshots and the simulation trace.
//!
//! Every micro-step of the fetch/decode/execute cycle produces one
//! [`Snapshot`]. A [`Trace`] is the append-only sequence of them: each new
//! snapshot starts as a copy of the last one and overrides only what the
//! step changes. The trace is everything a front end needs to replay a run.

use crate::binary::{Address, Word};
use crate::cpu::decode::Opcode;
use crate::cpu::memory::MemoryImage;
use serde::{Serialize, Deserialize};

/// A register's value and whether it is highlighted in this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegisterView<T> {
    pub value: T,
    pub lit: bool,
}

impl<T> RegisterView<T> {
    /// Set a new value and highlight the register.
    pub fn light(&mut self, value: T) {
        self.value = value;
        self.lit = true;
    }
}

/// Data paths between components; `true` while data is moving along one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wires {
    pub pc_mar: bool,
    pub mar_memory: bool,
    pub memory_mbr: bool,
    pub mbr_ibr: bool,
    pub ibr_ir: bool,
    pub mbr_alu: bool,
    pub ac_alu: bool,
    pub alu_ac: bool,
    pub alu_mbr: bool,
}

impl Wires {
    /// Names and states in panel order.
    pub fn labeled(&self) -> [(&'static str, bool); 9] {
        [
            ("PC→MAR", self.pc_mar),
            ("MAR→Memory", self.mar_memory),
            ("Memory→MBR", self.memory_mbr),
            ("MBR→IBR", self.mbr_ibr),
            ("IBR→IR", self.ibr_ir),
            ("MBR→ALU", self.mbr_alu),
            ("AC→ALU", self.ac_alu),
            ("ALU→AC", self.alu_ac),
            ("ALU→MBR", self.alu_mbr),
        ]
    }

    /// Check if any wire is active.
    pub fn any(&self) -> bool {
        self.labeled().iter().any(|(_, on)| *on)
    }
}

/// The full visible state of the machine at one micro-step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Calculator display: a result, an error, or empty
    pub display: String,
    /// Every memory cell
    pub memory: MemoryImage,
    /// Memory cell being accessed
    pub lit_cell: Option<Address>,
    pub pc: RegisterView<Address>,
    pub mar: RegisterView<Address>,
    pub ibr: RegisterView<Word>,
    pub ir: RegisterView<Word>,
    pub ac: RegisterView<Word>,
    /// Operand latched into the ALU
    pub operand: RegisterView<Word>,
    /// ALU is computing
    pub alu_on: bool,
    /// Opcode shown on the decoder panel
    pub opcode: Option<Opcode>,
    pub opcode_lit: bool,
    pub wires: Wires,
}

impl Snapshot {
    /// The state before anything is loaded: empty memory, zeroed registers.
    pub fn initial() -> Self {
        Self::default()
    }

    /// The state after a program has been written to memory.
    pub fn loaded(memory: MemoryImage) -> Self {
        Self { memory, ..Self::default() }
    }

    /// The state after a program was rejected.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self { display: message.into(), ..Self::default() }
    }

    /// Symbol on the decoder panel, empty when nothing is decoded.
    pub fn opcode_symbol(&self) -> &'static str {
        self.opcode.map_or("", Opcode::symbol)
    }
}

/// Append-only sequence of snapshots for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TraceSteps")]
pub struct Trace {
    steps: Vec<Snapshot>,
}

/// Wire form of a [`Trace`], checked before it becomes one.
#[derive(Deserialize)]
struct TraceSteps {
    steps: Vec<Snapshot>,
}

impl TryFrom<TraceSteps> for Trace {
    type Error = &'static str;

    fn try_from(wire: TraceSteps) -> Result<Self, Self::Error> {
        if wire.steps.is_empty() {
            return Err("a trace needs at least one snapshot");
        }
        Ok(Self { steps: wire.steps })
    }
}

impl Trace {
    /// Start a trace from its first snapshot.
    pub fn new(first: Snapshot) -> Self {
        Self { steps: vec![first] }
    }

    /// Append a copy of the last snapshot with `step` applied to it.
    pub fn advance<F>(&mut self, step: F) -> &Snapshot
    where
        F: FnOnce(&mut Snapshot),
    {
        let mut next = self.last().clone();
        step(&mut next);
        self.steps.push(next);
        self.last()
    }

    /// The most recent snapshot.
    pub fn last(&self) -> &Snapshot {
        // A trace is never empty: `new` seeds it and nothing removes steps.
        &self.steps[self.steps.len() - 1]
    }

    /// The first snapshot.
    pub fn first(&self) -> &Snapshot {
        &self.steps[0]
    }

    /// Snapshot at a position.
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.steps.get(index)
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the trace holds no snapshots. Never true once seeded.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Snapshots in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.steps.iter()
    }

    /// All snapshots as a slice.
    pub fn as_slice(&self) -> &[Snapshot] {
        &self.steps
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new(Snapshot::initial())
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
