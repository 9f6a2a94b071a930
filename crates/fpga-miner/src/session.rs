//! One complete mining session: clean reset, job load, start, poll.

use std::time::Instant;

use serde::Serialize;

use fpga_miner_core::block::current_timestamp;
use fpga_miner_core::difficulty::{bits_to_difficulty, format_difficulty};
use fpga_miner_core::outcome::JobOutcome;

use crate::controller::{Delay, JobController};
use crate::error::Result;
use crate::mode::Mode;
use crate::poll::{poll_until_done, PollConfig};
use crate::tracing::prelude::*;
use crate::transport::RegisterBus;

/// Summary of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub mode: Mode,
    #[serde(flatten)]
    pub outcome: JobOutcome,
    /// Status checks performed by the polling loop.
    pub iterations: u32,
    pub elapsed_ms: u64,
}

/// Run `mode` on the core behind `ctl` until it reaches an outcome.
pub fn run_session<B, D>(
    ctl: &mut JobController<B, D>,
    mode: Mode,
    poll: &PollConfig,
) -> Result<SessionReport>
where
    B: RegisterBus,
    D: Delay,
{
    let started = Instant::now();
    info!(
        "Starting Bitcoin mining loop ({}) at 0x{:08X}",
        mode,
        ctl.registers().base_addr()
    );

    // Ensure clean state before touching the parameter banks
    ctl.reset();

    let timestamp = current_timestamp();
    if let Some(header) = mode.header(timestamp) {
        let difficulty = bits_to_difficulty(header.bits);
        info!(
            timestamp = header.timestamp,
            difficulty = %format_difficulty(difficulty),
            "Processing block header: version 0x{:08X}, bits 0x{:08X}",
            header.version,
            header.bits
        );
        debug!(header = %header.to_hex(), "Serialized header");
    }

    let job = mode.job(timestamp);
    ctl.load_job(&job)?;
    ctl.start()?;

    let report = poll_until_done(ctl, poll)?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    info!(
        iterations = report.iterations,
        elapsed_ms, "Mining loop completed: {}", report.outcome
    );

    Ok(SessionReport {
        mode,
        outcome: report.outcome,
        iterations: report.iterations,
        elapsed_ms,
    })
}
