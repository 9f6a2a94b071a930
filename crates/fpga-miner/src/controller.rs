//! Job controller: parameter loading and control sequencing for the core.
//!
//! The core runs one search per job:
//!
//! ```text
//! Idle -> Resetting -> Ready -> Loaded -> Running -> Found | Exhausted
//! ```
//!
//! `reset()` returns any state to `Ready`. A job must be completely loaded
//! after the last reset before `start()` is accepted, since a partially
//! written parameter set leaves the core searching an undefined job.

use std::time::Duration;

use serde::Serialize;

use fpga_miner_core::job::MiningJob;
use fpga_miner_core::regs::{
    RegisterBank, Status, ASSERT, CTRL_CURRENT_NONCE_REQ, CTRL_RESET, CTRL_START, CURRENT_NONCE,
    DEASSERT, GOLDEN_NONCE, STATUS,
};

use crate::error::{DriverError, Result};
use crate::tracing::prelude::*;
use crate::transport::{RegisterBus, Registers};

/// Blocking wait used to satisfy hardware timing.
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// Delay backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Pulse widths required by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// How long the soft reset line is held high.
    pub reset_pulse: Duration,
    /// How long the current-nonce request is held so the value can cross
    /// into the bus clock domain.
    pub cdc_settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            reset_pulse: Duration::from_millis(1),
            cdc_settle: Duration::from_millis(1),
        }
    }
}

/// Driver-side view of the core's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreState {
    /// Nothing has been done since the controller was created.
    Idle,
    /// Reset is asserted.
    Resetting,
    /// Reset released; no job loaded.
    Ready,
    /// All parameter banks written.
    Loaded,
    /// Start issued; search in progress.
    Running,
    /// Status reported a golden nonce.
    Found,
    /// Status reported the nonce range exhausted.
    Exhausted,
}

/// Exclusive controller for one mining core.
pub struct JobController<B, D> {
    regs: Registers<B>,
    delay: D,
    timing: Timing,
    state: CoreState,
}

impl<B: RegisterBus, D: Delay> JobController<B, D> {
    pub fn new(regs: Registers<B>, delay: D, timing: Timing) -> Self {
        JobController {
            regs,
            delay,
            timing,
            state: CoreState::Idle,
        }
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    pub fn registers(&self) -> &Registers<B> {
        &self.regs
    }

    /// Pulse the soft reset line. Leaves the core `Ready`.
    pub fn reset(&mut self) {
        debug!("Resetting core");
        self.state = CoreState::Resetting;
        self.pulse(CTRL_RESET, self.timing.reset_pulse);
        self.state = CoreState::Ready;
    }

    /// Abort any search. Identical to [`reset`](Self::reset).
    pub fn stop(&mut self) {
        info!("Stopping mining");
        self.reset();
    }

    /// Write all three parameter banks: midstate, residual data, target.
    pub fn load_job(&mut self, job: &MiningJob) -> Result<()> {
        if !matches!(self.state, CoreState::Ready | CoreState::Loaded) {
            return Err(self.invalid("load a job"));
        }

        self.regs.write_bank(RegisterBank::MidState, &job.midstate)?;
        self.regs.write_bank(RegisterBank::ResidualData, &job.residual)?;
        self.regs.write_bank(RegisterBank::Target, &job.target)?;

        self.state = CoreState::Loaded;
        Ok(())
    }

    /// Issue the start strobe. Fire-once; never deasserted by the driver.
    pub fn start(&mut self) -> Result<()> {
        if self.state != CoreState::Loaded {
            return Err(self.invalid("start"));
        }

        info!("Starting mining");
        self.regs.write(CTRL_START, ASSERT);
        self.state = CoreState::Running;
        Ok(())
    }

    /// Ask the core for the nonce it is currently hashing.
    ///
    /// The value register is only valid after the request has been asserted,
    /// held for the CDC settle time and released.
    pub fn query_current_nonce(&mut self) -> u32 {
        self.pulse(CTRL_CURRENT_NONCE_REQ, self.timing.cdc_settle);
        self.regs.read(CURRENT_NONCE)
    }

    /// Read and decode the status register.
    ///
    /// While running, a set found bit moves the controller to `Found`, else a
    /// set exhausted bit moves it to `Exhausted`.
    pub fn read_status(&mut self) -> Status {
        let status = Status::from_raw(self.regs.read(STATUS));
        if self.state == CoreState::Running {
            if status.found {
                self.state = CoreState::Found;
            } else if status.exhausted {
                self.state = CoreState::Exhausted;
            }
        }
        status
    }

    /// Whether the core has found a golden nonce.
    pub fn query_found(&mut self) -> bool {
        self.read_status().found
    }

    /// Read the golden nonce register. Only meaningful once found is set.
    pub fn read_golden_nonce(&mut self) -> u32 {
        self.regs.read(GOLDEN_NONCE)
    }

    /// Block for `duration` on the controller's clock.
    pub fn wait(&mut self, duration: Duration) {
        self.delay.delay(duration);
    }

    /// Assert `offset`, hold for `width`, deassert.
    fn pulse(&mut self, offset: u32, width: Duration) {
        self.regs.write(offset, ASSERT);
        self.delay.delay(width);
        self.regs.write(offset, DEASSERT);
    }

    fn invalid(&self, operation: &'static str) -> DriverError {
        DriverError::InvalidTransition {
            operation,
            state: self.state,
        }
    }
}
