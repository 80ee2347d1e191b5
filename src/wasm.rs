//! WebAssembly bindings for the calculator.
//!
//! A browser front end builds a [`WasmSimulation`] from an expression and
//! replays its snapshots, fetching them as JSON one at a time.

use wasm_bindgen::prelude::*;
use crate::asm::{assemble, disassemble, tokenize};
use crate::config::SimConfig;
use crate::machine::{simulate, Simulation};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// A finished simulation held on the Rust side.
#[wasm_bindgen]
pub struct WasmSimulation {
    sim: Simulation,
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Tokenize, load and run an expression.
    #[wasm_bindgen(constructor)]
    pub fn new(expression: &str) -> Self {
        Self { sim: simulate(expression, &SimConfig::default()) }
    }

    /// Run with a custom cycle budget.
    #[wasm_bindgen]
    pub fn with_max_cycles(expression: &str, max_cycles: u32) -> Self {
        let config = SimConfig { max_cycles: u64::from(max_cycles.max(1)) };
        Self { sim: simulate(expression, &config) }
    }

    /// Number of snapshots.
    #[wasm_bindgen]
    pub fn len(&self) -> usize {
        self.sim.trace.len()
    }

    /// Always false; a trace holds at least snapshot 0.
    #[wasm_bindgen]
    pub fn is_empty(&self) -> bool {
        self.sim.trace.is_empty()
    }

    /// The loader program as space-separated tokens.
    #[wasm_bindgen]
    pub fn program(&self) -> String {
        self.sim.tokens.join(" ")
    }

    /// Snapshot `index` as JSON.
    #[wasm_bindgen]
    pub fn step_json(&self, index: usize) -> Result<String, JsError> {
        let step = self
            .sim
            .trace
            .get(index)
            .ok_or_else(|| JsError::new(&format!("no snapshot {}", index)))?;
        serde_json::to_string(step).map_err(|e| JsError::new(&e.to_string()))
    }

    /// The whole simulation as JSON.
    #[wasm_bindgen]
    pub fn trace_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.sim).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Display text of every snapshot, in order.
    #[wasm_bindgen]
    pub fn displays(&self) -> js_sys::Array {
        self.sim
            .trace
            .iter()
            .map(|s| JsValue::from_str(&s.display))
            .collect()
    }

    /// What the display shows at the end.
    #[wasm_bindgen]
    pub fn display(&self) -> String {
        self.sim.display().to_string()
    }

    /// Check if the run ended on an error message.
    #[wasm_bindgen]
    pub fn failed(&self) -> bool {
        self.sim.outcome.is_error()
    }
}

/// Tokenize an expression into its loader program.
#[wasm_bindgen]
pub fn wasm_tokenize(expression: &str) -> String {
    tokenize(expression).join(" ")
}

/// Disassemble the memory image an expression loads.
#[wasm_bindgen]
pub fn wasm_disassemble(expression: &str) -> Result<String, JsError> {
    let image = assemble(&tokenize(expression))
        .map_err(|e| JsError::new(&format!("{}: {}", e, e.detail())))?;
    Ok(disassemble(&image))
}
