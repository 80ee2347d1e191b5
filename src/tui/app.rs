//! Viewer application state and logic.

use crate::asm::disasm::{disassemble_data, disassemble_instruction};
use crate::cpu::Snapshot;
use crate::machine::{Outcome, Simulation};

/// Trace viewer state.
pub struct ViewerApp {
    /// The finished simulation being replayed.
    pub sim: Simulation,
    /// Index of the snapshot on screen.
    pub cursor: usize,
    /// Is the viewer stepping forward on its own?
    pub playing: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
}

impl ViewerApp {
    /// Create a viewer positioned on snapshot 0.
    pub fn new(sim: Simulation) -> Self {
        Self {
            sim,
            cursor: 0,
            playing: false,
            should_quit: false,
            status: "Ready. Press → to step, p to play, q to quit.".into(),
        }
    }

    /// The snapshot on screen.
    pub fn current(&self) -> &Snapshot {
        // cursor is kept within 0..len and a trace is never empty
        self.sim.trace.get(self.cursor).unwrap_or_else(|| self.sim.trace.last())
    }

    fn last_index(&self) -> usize {
        self.sim.trace.len() - 1
    }

    /// Step forward one snapshot.
    pub fn next(&mut self) {
        if self.cursor >= self.last_index() {
            self.playing = false;
            self.status = format!("End of trace: {}", self.outcome_text());
            return;
        }
        self.cursor += 1;
        self.status = self.phase_text();
    }

    /// Step back one snapshot.
    pub fn prev(&mut self) {
        if self.cursor == 0 {
            self.status = "Start of trace.".into();
            return;
        }
        self.cursor -= 1;
        self.status = self.phase_text();
    }

    /// Jump to the first snapshot.
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.playing = false;
        self.status = "Rewound.".into();
    }

    /// Jump to the last snapshot.
    pub fn finish(&mut self) {
        self.cursor = self.last_index();
        self.playing = false;
        self.status = format!("End of trace: {}", self.outcome_text());
    }

    /// Start or pause playback.
    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
        self.status = if self.playing { "Playing...".into() } else { "Paused.".into() };
    }

    /// Run one playback tick.
    pub fn tick(&mut self) {
        if self.playing {
            self.next();
        }
    }

    /// What the on-screen step is doing, judged from the lit wires.
    pub fn phase_text(&self) -> String {
        let s = self.current();
        let w = &s.wires;
        let phase = if w.pc_mar {
            "fetch: MAR ← PC".to_string()
        } else if w.mbr_ibr {
            "fetch: IBR ← memory".to_string()
        } else if s.pc.lit {
            "fetch: PC ← PC + 1".to_string()
        } else if w.ibr_ir {
            format!("decode: {}", disassemble_instruction(s.ir.value))
        } else if w.alu_mbr {
            "execute: memory ← AC".to_string()
        } else if w.mbr_alu {
            format!("execute: ALU ← {}", disassemble_data(s.operand.value))
        } else if w.alu_ac {
            "execute: AC ← ALU".to_string()
        } else {
            "idle".to_string()
        };
        format!("Step {}/{}: {}", self.cursor, self.last_index(), phase)
    }

    /// How the run ended.
    pub fn outcome_text(&self) -> String {
        match &self.sim.outcome {
            Outcome::Rejected(e) => format!("rejected, {}", e.detail()),
            Outcome::Stopped(reason) => reason.to_string(),
        }
    }

    /// Memory rows of the on-screen snapshot: address, text, lit.
    pub fn memory_rows(&self) -> Vec<(String, String, bool)> {
        let s = self.current();
        s.memory
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let addr = format!("{:04b}", i);
                let text = cell.map_or_else(|| "--------".to_string(), |w| w.to_string());
                let lit = s.lit_cell.is_some_and(|a| a.index() == i);
                (addr, text, lit)
            })
            .collect()
    }
}

/// Replay a simulation in the terminal.
pub fn run_viewer(sim: Simulation) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = ViewerApp::new(sim);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
                        KeyCode::Right | KeyCode::Char('n') => {
                            app.playing = false;
                            app.next();
                        }
                        KeyCode::Left | KeyCode::Char('b') => {
                            app.playing = false;
                            app.prev();
                        }
                        KeyCode::Char('p') | KeyCode::Char(' ') => app.toggle_play(),
                        KeyCode::Home => app.rewind(),
                        KeyCode::End => app.finish(),
                        _ => {}
                    }
                }
            }
        } else {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
