//! Polling loop that drives a running search to its outcome.

use std::time::Duration;

use serde::Serialize;

use fpga_miner_core::outcome::JobOutcome;

use crate::controller::{CoreState, Delay, JobController};
use crate::error::{DriverError, Result};
use crate::tracing::prelude::*;
use crate::transport::RegisterBus;

/// Pacing and bounds of a polling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Sleep between status checks.
    pub interval: Duration,
    /// Emit a status snapshot every this many iterations (0 behaves as 1).
    pub status_every: u32,
    /// Highest iteration index checked before giving up. The loop performs
    /// at most `iteration_cap + 1` status checks.
    pub iteration_cap: u32,
}

/// Point-in-time view of the core, logged periodically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub iteration: u32,
    pub current_nonce: u32,
    pub found: bool,
    pub exhausted: bool,
}

/// What a polling session ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PollReport {
    pub outcome: JobOutcome,
    /// Number of status checks performed.
    pub iterations: u32,
}

/// Poll a running core until it finds a nonce, exhausts its range, or the
/// iteration cap is reached. The core is stopped exactly once in every case.
///
/// Each iteration reads the status register once. Found is checked before
/// exhausted, since both bits may be set together.
pub fn poll_until_done<B, D>(
    ctl: &mut JobController<B, D>,
    config: &PollConfig,
) -> Result<PollReport>
where
    B: RegisterBus,
    D: Delay,
{
    if ctl.state() != CoreState::Running {
        return Err(DriverError::InvalidTransition {
            operation: "poll",
            state: ctl.state(),
        });
    }

    let status_every = config.status_every.max(1);
    let mut iteration: u32 = 0;

    let outcome = loop {
        let status = ctl.read_status();

        if iteration % status_every == 0 {
            let snapshot = StatusSnapshot {
                iteration,
                current_nonce: ctl.query_current_nonce(),
                found: status.found,
                exhausted: status.exhausted,
            };
            info!(
                iteration = snapshot.iteration,
                found = snapshot.found,
                exhausted = snapshot.exhausted,
                "Current nonce: 0x{:08X} ({})",
                snapshot.current_nonce,
                snapshot.current_nonce
            );
        }

        if status.found {
            let nonce = ctl.read_golden_nonce();
            info!("GOLDEN NONCE FOUND: 0x{:08X} ({})", nonce, nonce);
            break JobOutcome::GoldenNonceFound { nonce };
        }

        if status.exhausted {
            info!("No nonce found in current range");
            break JobOutcome::RangeExhausted;
        }

        if iteration >= config.iteration_cap {
            warn!(
                iterations = iteration.saturating_add(1),
                "Timeout reached, stopping mining"
            );
            break JobOutcome::TimedOut;
        }

        ctl.wait(config.interval);
        iteration += 1;
    };

    ctl.stop();

    Ok(PollReport {
        outcome,
        iterations: iteration.saturating_add(1),
    })
}
