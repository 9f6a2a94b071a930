//! Operator-selectable mining modes.

use std::time::Duration;

use serde::Serialize;

use fpga_miner_core::block::BlockHeader;
use fpga_miner_core::job::{derive_job, MiningJob, EASY_TARGET, UNREACHABLE_TARGET};

use crate::poll::PollConfig;
use crate::tracing::prelude::*;

/// Bits used by the easy-difficulty test session (the genesis target).
pub const TEST_BITS: u32 = 0x1D00FFFF;
/// Bits used by the real-difficulty observation session.
pub const REAL_BITS: u32 = 0x1703FFFC;

/// Which session to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Easy target; the core should find a nonce quickly.
    Test,
    /// Unreachable target; runs until exhaustion or timeout.
    Real,
    /// Fixed known-answer vector for bitstream bring-up.
    KnownAnswer,
}

impl Mode {
    /// Menu shown when prompting for a mode.
    pub const MENU: &'static str = "Choose mining mode:\n\
        1. Test mode (easy difficulty - will find nonces)\n\
        2. Real mode (real difficulty - for observation only)\n\
        3. Known-answer mode (fixed bring-up vector)\n";

    /// Map a menu number to a mode.
    pub fn from_selection(choice: i64) -> Option<Mode> {
        match choice {
            1 => Some(Mode::Test),
            2 => Some(Mode::Real),
            3 => Some(Mode::KnownAnswer),
            _ => None,
        }
    }

    /// Parse operator input. Anything that is not a valid menu number falls
    /// back to [`Mode::Test`].
    pub fn parse_selection(input: &str) -> Mode {
        let choice = input.trim().parse::<i64>().ok();
        match choice.and_then(Mode::from_selection) {
            Some(mode) => mode,
            None => {
                warn!(input = input.trim(), "Invalid choice, running test mode...");
                Mode::Test
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Test => "TEST MODE - Easy Difficulty",
            Mode::Real => "REAL MODE - Real Difficulty",
            Mode::KnownAnswer => "KNOWN-ANSWER MODE",
        }
    }

    /// Header the session derives its job from, if it uses one.
    pub fn header(self, timestamp: u32) -> Option<BlockHeader> {
        match self {
            Mode::Test => Some(BlockHeader::new(timestamp, TEST_BITS)),
            Mode::Real => Some(BlockHeader::new(timestamp, REAL_BITS)),
            Mode::KnownAnswer => None,
        }
    }

    /// Job parameters for this mode.
    ///
    /// Test and real sessions derive from [`header`](Self::header) and then
    /// overwrite the target with a fixed preset; the derived target is never
    /// loaded.
    pub fn job(self, timestamp: u32) -> MiningJob {
        match self.header(timestamp) {
            Some(header) => {
                let preset = match self {
                    Mode::Real => UNREACHABLE_TARGET,
                    _ => EASY_TARGET,
                };
                derive_job(&header).with_target(preset)
            }
            None => MiningJob::known_answer(),
        }
    }

    /// Default polling parameters for this mode.
    pub fn poll_config(self) -> PollConfig {
        match self {
            // ~10 checks per second, status every second, give up after ~100s
            Mode::Test => PollConfig {
                interval: Duration::from_millis(100),
                status_every: 10,
                iteration_cap: 1000,
            },
            Mode::Real => PollConfig {
                interval: Duration::from_millis(100),
                status_every: 100,
                iteration_cap: 10000,
            },
            Mode::KnownAnswer => PollConfig {
                interval: Duration::from_millis(10),
                status_every: 1,
                iteration_cap: 10000,
            },
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
