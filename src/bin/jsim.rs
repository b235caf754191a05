//! CLI for the jsim engine simulator.
//!
//! Usage:
//!   jsim <file.js>              # Print the step trace of a file
//!   jsim -e "code"              # Print the step trace of a snippet
//!   jsim <file.js> --json       # Trace as JSON
//!   jsim <file.js> --step       # Walk the trace interactively

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jsim::parser::JsParser;
use jsim::runner::api::{Simulator, SimulatorError, Trace};
use jsim::runner::config::SimulatorConfig;
use jsim::runner::playback::StepCursor;

#[derive(Parser)]
#[command(name = "jsim")]
#[command(about = "Step-by-step simulator of JavaScript engine execution", long_about = None)]
struct Cli {
    /// JavaScript file to simulate
    #[arg(required_unless_present = "eval", conflicts_with = "eval")]
    file: Option<PathBuf>,

    /// Simulate the given code instead of a file
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Print the trace as JSON
    #[arg(long, conflicts_with = "step")]
    json: bool,

    /// Walk through the trace interactively
    #[arg(long)]
    step: bool,

    /// Print the parse tree instead of simulating
    #[arg(long, conflicts_with_all = ["json", "step"])]
    tokens: bool,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum call stack depth, global frame included (overrides config)
    #[arg(long)]
    max_call_depth: Option<usize>,

    /// Maximum number of steps (overrides config)
    #[arg(long)]
    max_steps: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let source = match (&cli.eval, &cli.file) {
        (Some(code), _) => code.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?,
        (None, None) => anyhow::bail!("no input given"),
    };

    if cli.tokens {
        let tree = JsParser::parse_to_token_tree(&source).map_err(SimulatorError::from)?;
        println!("{}", tree);
        return Ok(());
    }

    let simulator = Simulator::new(load_config(&cli)?);
    let trace = simulator.run(&source)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
    } else if cli.step {
        step_through(trace)?;
    } else {
        print_trace(&trace);
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SimulatorConfig, SimulatorError> {
    let mut config = match &cli.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };
    if let Some(depth) = cli.max_call_depth {
        config = config.with_max_call_depth(depth);
    }
    if let Some(steps) = cli.max_steps {
        config = config.with_max_steps(steps);
    }
    config.validate()?;
    Ok(config)
}

fn print_trace(trace: &Trace) {
    for step in &trace.steps {
        println!("{}", step);
    }
    if let Some(fault) = &trace.fault {
        eprintln!("Uncaught {}", fault);
    }
}

fn print_step_help() {
    println!("Commands: n = next, p = previous, r = reset, q = quit");
}

fn step_through(trace: Trace) -> Result<()> {
    let total = trace.steps.len();
    let mut cursor = StepCursor::new(trace.steps);
    print_step_help();

    let stdin = io::stdin();
    loop {
        print!("[{}/{}]> ", cursor.position(), cursor.len());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "n" | "" => match cursor.next() {
                Some(step) => println!("{}", step),
                None => println!("(end of trace)"),
            },
            "p" => {
                if cursor.prev() {
                    match cursor.current() {
                        Some(step) => println!("back to {}", step),
                        None => println!("(start of trace)"),
                    }
                } else {
                    println!("(start of trace)");
                }
            }
            "r" => {
                cursor.reset();
                println!("trace cleared ({} steps dropped)", total);
            }
            "q" => break,
            _ => print_step_help(),
        }
    }
    Ok(())
}
