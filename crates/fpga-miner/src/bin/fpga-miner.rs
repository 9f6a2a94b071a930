//! Bitcoin miner driver for the SHA-256d FPGA core.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use fpga_miner::tracing::prelude::*;
use fpga_miner::{
    run_session, Config, JobController, MmioBus, Mode, RegisterBus, Registers, SessionReport,
    SimulatedCore, StdDelay,
};

/// Register backend to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Memory-mapped core, mapped from the configured device
    Mmio,
    /// Software model of the core
    Sim,
}

/// Drive the SHA-256d FPGA mining core through one session
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mode number (1 = test, 2 = real, 3 = known-answer); prompts if omitted
    #[arg(short, long)]
    mode: Option<String>,

    /// Register backend
    #[arg(short, long, value_enum, default_value_t = Backend::Mmio)]
    backend: Backend,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the session report as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    fpga_miner::tracing::init_stderr();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => Config::default(),
    };

    info!(
        "=== Bitcoin Miner for SHA-256d FPGA core (base 0x{:08X}) ===",
        config.base_address
    );

    let mode = match &args.mode {
        Some(choice) => Mode::parse_selection(choice),
        None => prompt_mode()?,
    };

    let bus: Box<dyn RegisterBus> = match args.backend {
        Backend::Mmio => {
            let bus = MmioBus::open(&config.device, config.map_offset())
                .context("Cannot reach the core's registers (try --backend sim)")?;
            Box::new(bus)
        }
        Backend::Sim => Box::new(SimulatedCore::new(config.sim)),
    };
    let report = run(bus, &config, mode)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}: {} after {} polls", report.mode, report.outcome, report.iterations);
    }

    Ok(())
}

fn run(bus: Box<dyn RegisterBus>, config: &Config, mode: Mode) -> Result<SessionReport> {
    let regs = Registers::new(bus, config.base_address);
    let mut ctl = JobController::new(regs, StdDelay, config.timing());
    let report = run_session(&mut ctl, mode, &config.poll_config(mode))
        .context("Mining session failed")?;
    Ok(report)
}

/// Ask the operator for a mode on stdin. Unreadable input counts as invalid.
fn prompt_mode() -> Result<Mode> {
    let mut stderr = io::stderr();
    write!(stderr, "{}Enter choice (1, 2 or 3): ", Mode::MENU)?;
    stderr.flush()?;

    let mut line = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut line) {
        warn!("Failed to read mode selection: {}", e);
        line.clear();
    }
    Ok(Mode::parse_selection(&line))
}
