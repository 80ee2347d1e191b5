//! Run orchestration.
//!
//! A [`Machine`] owns one memory, one ALU, one control unit and the trace of
//! a single run. It is used once: load a program, run it, read the trace.
//! [`simulate`] does all three for an expression.

use crate::asm::{self, LoadError};
use crate::config::SimConfig;
use crate::cpu::{Alu, ControlUnit, Cycle, Memory, Snapshot, StopReason, Trace};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Where a machine is in its single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    /// Nothing loaded yet.
    Empty,
    /// A program is in memory, ready to run.
    Loaded,
    /// The program was refused; the trace holds only snapshot 0.
    Rejected(LoadError),
    /// The run is over.
    Stopped(StopReason),
}

/// A calculator for one run.
#[derive(Debug, Clone)]
pub struct Machine {
    memory: Memory,
    alu: Alu,
    control: ControlUnit,
    trace: Trace,
    state: MachineState,
    config: SimConfig,
    /// Completed fetch/decode/execute cycles.
    cycles: u64,
}

impl Machine {
    /// Create an empty machine.
    pub fn new(config: SimConfig) -> Self {
        Self {
            memory: Memory::new(),
            alu: Alu::new(),
            control: ControlUnit::new(),
            trace: Trace::default(),
            state: MachineState::Empty,
            config,
            cycles: 0,
        }
    }

    /// Load a token program and seed snapshot 0.
    ///
    /// On rejection nothing is written to memory and snapshot 0 shows the
    /// reason.
    pub fn load<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<(), MachineError> {
        if self.state != MachineState::Empty {
            return Err(MachineError::AlreadyLoaded);
        }

        self.load_program(tokens).map_err(MachineError::Load)
    }

    fn load_program<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<(), LoadError> {
        match asm::assemble(tokens) {
            Ok(image) => {
                self.memory = Memory::from_image(image);
                self.trace = Trace::new(Snapshot::loaded(self.memory.image()));
                self.state = MachineState::Loaded;
                debug!(cells = self.memory.dump().len(), "program loaded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, detail = %e.detail(), "program rejected");
                self.trace = Trace::new(Snapshot::rejected(e.to_string()));
                self.state = MachineState::Rejected(e.clone());
                Err(e)
            }
        }
    }

    /// Run the loaded program to completion.
    ///
    /// Every micro-step is appended to the trace before this returns. Program
    /// failures (arithmetic errors, faults) end the run normally and are
    /// reported in the returned [`StopReason`]; `Err` means the machine was
    /// not in a state to run.
    pub fn run(&mut self) -> Result<StopReason, MachineError> {
        match &self.state {
            MachineState::Loaded => {}
            MachineState::Empty => return Err(MachineError::NotLoaded),
            MachineState::Rejected(e) => return Err(MachineError::Load(e.clone())),
            MachineState::Stopped(reason) => return Err(MachineError::Finished(*reason)),
        }
        Ok(self.run_program())
    }

    fn run_program(&mut self) -> StopReason {
        let reason = loop {
            if self.cycles >= self.config.max_cycles {
                warn!(cycles = self.cycles, "cycle limit reached");
                let reason = StopReason::CycleLimit;
                self.trace.advance(|s| s.display = reason.display_text().unwrap_or_default());
                break reason;
            }

            if let Err(fault) = self.control.fetch(&self.memory, &mut self.trace) {
                break StopReason::MemoryFault(fault);
            }
            let word = self.control.decode(&mut self.trace);
            let cycle = self.control.execute(word, &mut self.alu, &mut self.memory, &mut self.trace);
            self.cycles += 1;

            match cycle {
                Cycle::Continue => {}
                Cycle::Stop(reason) => break reason,
            }
        };

        debug!(cycles = self.cycles, steps = self.trace.len(), %reason, "run finished");
        self.state = MachineState::Stopped(reason);
        reason
    }

    /// The trace so far.
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Take the trace out of the machine.
    pub fn into_trace(self) -> Trace {
        self.trace
    }

    /// Current memory.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// The ALU.
    pub fn alu(&self) -> &Alu {
        &self.alu
    }

    /// The control unit.
    pub fn control(&self) -> &ControlUnit {
        &self.control
    }

    /// Where the machine is in its run.
    pub fn state(&self) -> &MachineState {
        &self.state
    }

    /// Completed instruction cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

/// Errors from driving a machine out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("program rejected: {}", .0.detail())]
    Load(LoadError),

    #[error("a program is already loaded")]
    AlreadyLoaded,

    #[error("no program loaded")]
    NotLoaded,

    #[error("run already finished: {0}")]
    Finished(StopReason),
}

/// How a simulation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The loader refused the program.
    Rejected(LoadError),
    /// The program ran and stopped.
    Stopped(StopReason),
}

impl Outcome {
    /// Check if the calculator ended on an error message.
    pub fn is_error(&self) -> bool {
        match self {
            Outcome::Rejected(_) => true,
            Outcome::Stopped(reason) => reason.is_error(),
        }
    }
}

/// A finished simulation: the program, its trace and how it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulation {
    /// The loader program derived from the expression
    pub tokens: Vec<String>,
    pub trace: Trace,
    pub outcome: Outcome,
}

impl Simulation {
    /// What the calculator display shows at the end.
    pub fn display(&self) -> &str {
        &self.trace.last().display
    }
}

/// Tokenize, load and run an expression.
pub fn simulate(expression: &str, config: &SimConfig) -> Simulation {
    let tokens = asm::tokenize(expression);
    debug!(expression, ?tokens, "tokenized");
    run_tokens(tokens, config)
}

/// Load and run an already tokenized program.
pub fn run_tokens(tokens: Vec<String>, config: &SimConfig) -> Simulation {
    let mut machine = Machine::new(config.clone());

    let outcome = match machine.load_program(&tokens) {
        Ok(()) => Outcome::Stopped(machine.run_program()),
        Err(e) => Outcome::Rejected(e),
    };

    Simulation { tokens, trace: machine.into_trace(), outcome }
}
