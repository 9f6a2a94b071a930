//! Register-level model of the mining core.
//!
//! `SimulatedCore` answers the register protocol the way the hardware does,
//! without computing any hashes. Time advances one step per status read: each
//! poll, the search counter moves forward by `hashes_per_poll` nonces,
//! starting from 0 at every start strobe. A golden nonce is "found" when the
//! counter sweeps past the configured value, unless the loaded target is all
//! zeros (which no hash can meet).

use serde::{Deserialize, Serialize};

use fpga_miner_core::regs::{
    RegisterBank, Status, CTRL_CURRENT_NONCE_REQ, CTRL_RESET, CTRL_START, CURRENT_NONCE,
    GOLDEN_NONCE, STATUS, WORD_BYTES,
};

use crate::tracing::prelude::*;
use crate::transport::RegisterBus;

/// Behaviour of the simulated core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Nonces searched between two status reads.
    pub hashes_per_poll: u32,
    /// Nonce that meets any non-zero target, if any.
    pub golden_nonce: Option<u32>,
    /// Last nonce of the search range.
    pub range_end: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            hashes_per_poll: 0x0100_0000,
            golden_nonce: Some(0x2A5E_9C41),
            range_end: u32::MAX,
        }
    }
}

/// Software stand-in for the core behind a [`RegisterBus`].
#[derive(Debug, Clone)]
pub struct SimulatedCore {
    config: SimConfig,
    midstate: [u32; 8],
    residual: [u32; 3],
    target: [u32; 8],
    reset_line: bool,
    request_line: bool,
    running: bool,
    /// Next nonce to be searched.
    counter: u64,
    found: Option<u32>,
    exhausted: bool,
    current_nonce: u32,
}

impl SimulatedCore {
    pub fn new(config: SimConfig) -> Self {
        SimulatedCore {
            config,
            midstate: [0; 8],
            residual: [0; 3],
            target: [0; 8],
            reset_line: false,
            request_line: false,
            running: false,
            counter: 0,
            found: None,
            exhausted: false,
            current_nonce: 0,
        }
    }

    /// Parameter banks as currently latched.
    pub fn parameters(&self) -> ([u32; 8], [u32; 3], [u32; 8]) {
        (self.midstate, self.residual, self.target)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn clear_run_state(&mut self) {
        self.running = false;
        self.counter = 0;
        self.found = None;
        self.exhausted = false;
        self.current_nonce = 0;
    }

    fn target_reachable(&self) -> bool {
        self.target.iter().any(|w| *w != 0)
    }

    /// Advance the search by one poll's worth of nonces.
    fn step(&mut self) {
        if !self.running {
            return;
        }

        let end = self.counter + self.config.hashes_per_poll.max(1) as u64;

        if let Some(golden) = self.config.golden_nonce.filter(|_| self.target_reachable()) {
            let golden64 = golden as u64;
            if golden64 >= self.counter && golden64 < end && golden <= self.config.range_end {
                self.found = Some(golden);
                self.counter = golden64;
                self.running = false;
                return;
            }
        }

        self.counter = end;
        if self.counter > self.config.range_end as u64 {
            self.counter = self.config.range_end as u64;
            self.exhausted = true;
            self.running = false;
        }
    }

    fn write_parameter(&mut self, offset: u32, value: u32) -> bool {
        for bank in RegisterBank::PARAMETER_BANKS {
            let base = bank.base_offset();
            let end = base + bank.word_count() as u32 * WORD_BYTES;
            if (base..end).contains(&offset) {
                let index = ((offset - base) / WORD_BYTES) as usize;
                match bank {
                    RegisterBank::MidState => self.midstate[index] = value,
                    RegisterBank::ResidualData => self.residual[index] = value,
                    RegisterBank::Target => self.target[index] = value,
                    RegisterBank::Control => {}
                }
                return true;
            }
        }
        false
    }
}

impl RegisterBus for SimulatedCore {
    fn read32(&mut self, offset: u32) -> u32 {
        match offset {
            STATUS => {
                self.step();
                Status {
                    found: self.found.is_some(),
                    exhausted: self.exhausted,
                }
                .to_raw()
            }
            GOLDEN_NONCE => self.found.unwrap_or(0),
            CURRENT_NONCE => self.current_nonce,
            _ => 0,
        }
    }

    fn write32(&mut self, offset: u32, value: u32) {
        match offset {
            CTRL_RESET => {
                let asserted = value & 1 != 0;
                if asserted {
                    self.running = false;
                } else if self.reset_line {
                    // Falling edge releases the core from reset
                    self.clear_run_state();
                }
                self.reset_line = asserted;
            }
            CTRL_START => {
                if value & 1 != 0 && !self.reset_line && !self.running {
                    self.clear_run_state();
                    self.running = true;
                }
            }
            CTRL_CURRENT_NONCE_REQ => {
                let asserted = value & 1 != 0;
                if !asserted && self.request_line {
                    // Value crosses into the bus domain on request release
                    self.current_nonce = self.counter.min(u32::MAX as u64) as u32;
                }
                self.request_line = asserted;
            }
            _ => {
                if !self.write_parameter(offset, value) {
                    debug!("Simulated core ignoring write to 0x{:03X}", offset);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{JobController, Timing};
    use crate::poll::{poll_until_done, PollConfig};
    use crate::testing::{EventLog, RecordingDelay};
    use crate::transport::Registers;
    use fpga_miner_core::job::{MiningJob, UNREACHABLE_TARGET};
    use fpga_miner_core::outcome::JobOutcome;
    use std::time::Duration;

    fn run(config: SimConfig, job: MiningJob, cap: u32) -> (JobOutcome, SimulatedCore) {
        let log = EventLog::default();
        let mut ctl = JobController::new(
            Registers::new(SimulatedCore::new(config), 0x43C0_0000),
            RecordingDelay::new(log),
            Timing::default(),
        );
        ctl.reset();
        ctl.load_job(&job).unwrap();
        ctl.start().unwrap();
        let report = poll_until_done(
            &mut ctl,
            &PollConfig {
                interval: Duration::from_millis(100),
                status_every: 10,
                iteration_cap: cap,
            },
        )
        .unwrap();
        (report.outcome, ctl.registers().bus().clone())
    }

    #[test]
    fn test_finds_configured_golden_nonce() {
        let config = SimConfig {
            hashes_per_poll: 1000,
            golden_nonce: Some(12_345),
            range_end: u32::MAX,
        };

        let (outcome, core) = run(config, MiningJob::known_answer(), 1000);

        assert_eq!(outcome, JobOutcome::GoldenNonceFound { nonce: 12_345 });
        // The stop pulse left the core idle
        assert!(!core.is_running());
    }

    #[test]
    fn test_unreachable_target_exhausts() {
        let config = SimConfig {
            hashes_per_poll: 100,
            golden_nonce: Some(50),
            range_end: 999,
        };
        let job = MiningJob::known_answer().with_target(UNREACHABLE_TARGET);

        let (outcome, _) = run(config, job, 1000);

        assert_eq!(outcome, JobOutcome::RangeExhausted);
    }

    #[test]
    fn test_slow_core_times_out() {
        let config = SimConfig {
            hashes_per_poll: 1,
            golden_nonce: None,
            range_end: u32::MAX,
        };

        let (outcome, _) = run(config, MiningJob::known_answer(), 20);

        assert_eq!(outcome, JobOutcome::TimedOut);
    }

    #[test]
    fn test_latches_parameter_banks() {
        let job = MiningJob::known_answer();
        let (_, core) = run(SimConfig::default(), job, 1);

        assert_eq!(core.parameters(), (job.midstate, job.residual, job.target));
    }

    #[test]
    fn test_current_nonce_updates_only_on_request_release() {
        let mut core = SimulatedCore::new(SimConfig {
            hashes_per_poll: 10,
            golden_nonce: None,
            range_end: u32::MAX,
        });
        core.write32(CTRL_START, 1);
        core.read32(STATUS);
        core.read32(STATUS);

        // Without a request the value register is stale
        assert_eq!(core.read32(CURRENT_NONCE), 0);

        core.write32(CTRL_CURRENT_NONCE_REQ, 1);
        assert_eq!(core.read32(CURRENT_NONCE), 0);
        core.write32(CTRL_CURRENT_NONCE_REQ, 0);
        assert_eq!(core.read32(CURRENT_NONCE), 20);
    }

    #[test]
    fn test_start_ignored_while_reset_held() {
        let mut core = SimulatedCore::new(SimConfig::default());
        core.write32(CTRL_RESET, 1);
        core.write32(CTRL_START, 1);
        assert!(!core.is_running());

        core.write32(CTRL_RESET, 0);
        core.write32(CTRL_START, 1);
        assert!(core.is_running());
    }
}
