//! Disassembler for memory images.
//!
//! Renders loaded cells back to readable text. Cells in the instruction
//! region print as `+ 0100`, `SAVE 0110`, `END`; cells past it print as
//! `DATA 2.5`.

use crate::binary::{Address, Word};
use crate::cpu::decode::{Instruction, Opcode};
use crate::cpu::memory::MemoryImage;

/// Disassemble a word read as an instruction.
pub fn disassemble_instruction(word: Word) -> String {
    match Instruction::decode(word) {
        Ok(Instruction::Arith { op, operand }) => format!("{} {}", op.symbol(), operand),
        Ok(Instruction::Save { target }) => format!("SAVE {}", target),
        Ok(Instruction::End) => "END".to_string(),
        Err(_) => format!("??? ; {}", word),
    }
}

/// Disassemble a word read as an operand.
pub fn disassemble_data(word: Word) -> String {
    format!("DATA {}", word.value())
}

/// Disassemble a whole memory image.
///
/// The instruction region is the run of cells from `0000` whose upper half is
/// a valid opcode and whose words carry no binary point.
pub fn disassemble(image: &MemoryImage) -> String {
    let code_len = image
        .iter()
        .take_while(|cell| {
            cell.is_some_and(|w| Opcode::of_word(&w).is_some() && w.address_field().is_ok())
        })
        .count();
    // Operand addresses begin right after the code, so nothing past the
    // first operand can be code.
    let code_len = code_len.min(first_operand(image).unwrap_or(code_len));

    let mut output = String::new();
    output.push_str("; Memory\n");
    output.push_str("; ------\n\n");

    for (index, cell) in image.iter().enumerate() {
        let Some(addr) = Address::from_index(index) else { break };
        let line = match cell {
            None => "--".to_string(),
            Some(word) if index < code_len => disassemble_instruction(*word),
            Some(word) => disassemble_data(*word),
        };
        let raw = cell.map_or_else(|| "        ".to_string(), |w| w.to_string());
        output.push_str(&format!("{}: {}  ; {}\n", addr, raw, line));
    }

    output
}

/// The smallest operand address referenced by the leading instruction.
fn first_operand(image: &MemoryImage) -> Option<usize> {
    let word = image[0]?;
    match Instruction::decode(word).ok()? {
        Instruction::Arith { operand, .. } => Some(operand.index()),
        Instruction::Save { target } => Some(target.index()),
        Instruction::End => None,
    }
}
