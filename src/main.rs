//! Von Neumann calculator - CLI Entry Point
//!
//! Commands:
//! - `vn-sim run <expr>` - Run an expression and print the result
//! - `vn-sim trace <expr>` - Dump the full snapshot trace as JSON
//! - `vn-sim asm <expr>` - Show the loader program and memory image
//! - `vn-sim debug <expr>` - Step through the trace in a terminal UI

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vonneumann::{SimConfig, Simulation, Snapshot};

#[derive(Parser)]
#[command(name = "vn-sim")]
#[command(version)]
#[command(about = "A step-by-step simulator of a von Neumann calculator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an expression until the program stops
    Run {
        /// Arithmetic expression, e.g. "3 * 2.5"
        expression: String,
        /// Print every micro-step
        #[arg(short, long)]
        trace: bool,
        /// Maximum number of instruction cycles (overrides the config file)
        #[arg(short, long)]
        max_cycles: Option<u64>,
        /// JSON settings file
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Write the snapshot trace as JSON
    Trace {
        /// Arithmetic expression
        expression: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// JSON settings file
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Show the loader program and the memory image it produces
    Asm {
        /// Arithmetic expression
        expression: String,
    },
    /// Interactive trace viewer
    Debug {
        /// Arithmetic expression
        expression: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { expression, trace, max_cycles, config }) => {
            let mut config = load_config(config.as_deref());
            if let Some(max_cycles) = max_cycles {
                config.max_cycles = max_cycles.max(1);
            }
            run_expression(&expression, &config, trace);
        }
        Some(Commands::Trace { expression, output, config }) => {
            let config = load_config(config.as_deref());
            write_trace(&expression, &config, output.as_deref());
        }
        Some(Commands::Asm { expression }) => {
            show_program(&expression);
        }
        Some(Commands::Debug { expression }) => {
            debug_expression(&expression);
        }
        None => {
            println!("Von Neumann Calculator v{}", env!("CARGO_PKG_VERSION"));
            println!("A step-by-step simulator of a von Neumann machine");
            println!();
            println!("Use --help for available commands");
            println!();
            demo();
        }
    }
}

fn load_config(path: Option<&str>) -> SimConfig {
    let Some(path) = path else {
        return SimConfig::default();
    };
    match SimConfig::from_json_file(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn run_expression(expression: &str, config: &SimConfig, trace: bool) {
    use vonneumann::{simulate, Outcome};

    let sim = simulate(expression, config);
    println!("📝 Program: {}", sim.tokens.join(" "));

    if trace {
        println!();
        println!("━━━ Trace ━━━");
        for (i, step) in sim.trace.iter().enumerate() {
            println!("{:3}: {}", i, describe(step));
        }
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Steps:   {}", sim.trace.len());
    println!("Display: {}", display_or_blank(&sim));

    match &sim.outcome {
        Outcome::Rejected(e) => {
            eprintln!("❌ Program rejected: {}", e.detail());
            std::process::exit(1);
        }
        Outcome::Stopped(reason) if reason.is_error() => {
            eprintln!("❌ Stopped: {}", reason);
            std::process::exit(1);
        }
        Outcome::Stopped(reason) => println!("State:   {}", reason),
    }
}

fn write_trace(expression: &str, config: &SimConfig, output: Option<&str>) {
    use vonneumann::simulate;

    let sim = simulate(expression, config);
    let json = match serde_json::to_string_pretty(&sim) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("❌ Failed to serialize trace: {}", e);
            std::process::exit(1);
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, json) {
                eprintln!("❌ Failed to write {}: {}", path, e);
                std::process::exit(1);
            }
            println!("✓ Wrote {} snapshots to {}", sim.trace.len(), path);
        }
        None => println!("{}", json),
    }
}

fn show_program(expression: &str) {
    use vonneumann::{assemble, disassemble, tokenize};

    let tokens = tokenize(expression);
    println!("📝 Program: {}", tokens.join(" "));
    println!();

    match assemble(&tokens) {
        Ok(image) => println!("{}", disassemble(&image)),
        Err(e) => {
            eprintln!("❌ {}: {}", e, e.detail());
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "tui")]
fn debug_expression(expression: &str) {
    use vonneumann::{run_viewer, simulate};

    let sim = simulate(expression, &SimConfig::default());
    if let Err(e) = run_viewer(sim) {
        eprintln!("❌ Viewer error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_expression(_expression: &str) {
    eprintln!("❌ Built without the `tui` feature");
    std::process::exit(1);
}

/// One line per snapshot: registers, active wires, display.
fn describe(step: &Snapshot) -> String {
    let mark = |lit: bool| if lit { "*" } else { " " };
    let wires: Vec<&str> = step
        .wires
        .labeled()
        .iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| *name)
        .collect();

    format!(
        "PC={}{} MAR={}{} IBR={}{} IR={}{} AC={}{} OP={:<4} [{}] {}",
        step.pc.value, mark(step.pc.lit),
        step.mar.value, mark(step.mar.lit),
        step.ibr.value, mark(step.ibr.lit),
        step.ir.value, mark(step.ir.lit),
        step.ac.value, mark(step.ac.lit),
        step.opcode_symbol(),
        wires.join(" "),
        step.display,
    )
}

fn display_or_blank(sim: &Simulation) -> &str {
    match sim.display() {
        "" => "(blank)",
        text => text,
    }
}

fn demo() {
    use vonneumann::simulate;

    println!("━━━ Demo ━━━");
    println!();
    for expression in ["1 + 1", "3 * 2.5", "7 / 2", "4 / 0", "3 - 5"] {
        let sim = simulate(expression, &SimConfig::default());
        println!("  {:<8} → {:<10} ({} steps)", expression, sim.display(), sim.trace.len());
    }
    println!();
    println!("Try: vn-sim run \"3 * 2.5\" --trace");
}
