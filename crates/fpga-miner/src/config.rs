//! Driver configuration.
//!
//! Loaded from an optional JSON file. Every field has a default matching the
//! reference hardware, so an empty object `{}` is a valid configuration.
//!
//! ```json
//! {
//!   "base_address": 1136656384,
//!   "device": "/dev/uio0",
//!   "map_offset": 0,
//!   "reset_pulse_us": 1000,
//!   "test": { "iteration_cap": 200 },
//!   "sim": { "hashes_per_poll": 65536 }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use fpga_miner_core::regs::{DEFAULT_BASE_ADDR, WORD_BYTES};

use crate::controller::Timing;
use crate::error::ConfigError;
use crate::mode::Mode;
use crate::poll::PollConfig;
use crate::sim::SimConfig;

/// Shortest pulse the core is guaranteed to sample.
pub const MIN_PULSE_US: u64 = 1000;

/// Device file giving access to physical memory.
pub const DEFAULT_DEVICE: &str = "/dev/mem";

/// Per-mode overrides of the polling defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollOverrides {
    pub interval_ms: Option<u64>,
    pub status_every: Option<u32>,
    pub iteration_cap: Option<u32>,
}

impl PollOverrides {
    fn apply(&self, mut config: PollConfig) -> PollConfig {
        if let Some(ms) = self.interval_ms {
            config.interval = Duration::from_millis(ms);
        }
        if let Some(every) = self.status_every {
            config.status_every = every;
        }
        if let Some(cap) = self.iteration_cap {
            config.iteration_cap = cap;
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Physical address of the core's register window, as logged.
    pub base_address: u32,
    /// Device file the register window is mapped from.
    pub device: PathBuf,
    /// Byte offset of the window within `device`. Defaults to
    /// `base_address`, which is right for `/dev/mem`; UIO devices want 0.
    pub map_offset: Option<u64>,
    /// Soft reset hold time in microseconds.
    pub reset_pulse_us: u64,
    /// Current-nonce request hold time in microseconds.
    pub cdc_settle_us: u64,
    pub test: PollOverrides,
    pub real: PollOverrides,
    pub known_answer: PollOverrides,
    /// Parameters of the simulated backend.
    pub sim: SimConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_address: DEFAULT_BASE_ADDR,
            device: PathBuf::from(DEFAULT_DEVICE),
            map_offset: None,
            reset_pulse_us: MIN_PULSE_US,
            cdc_settle_us: MIN_PULSE_US,
            test: PollOverrides::default(),
            real: PollOverrides::default(),
            known_answer: PollOverrides::default(),
            sim: SimConfig::default(),
        }
    }
}

impl Config {
    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the hardware cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_address == 0 || self.base_address % WORD_BYTES != 0 {
            return Err(ConfigError::Invalid(format!(
                "base_address 0x{:08X} must be non-zero and word aligned",
                self.base_address
            )));
        }
        if self.map_offset() % u64::from(WORD_BYTES) != 0 {
            return Err(ConfigError::Invalid(format!(
                "map_offset 0x{:X} must be word aligned",
                self.map_offset()
            )));
        }
        if self.reset_pulse_us < MIN_PULSE_US || self.cdc_settle_us < MIN_PULSE_US {
            return Err(ConfigError::Invalid(format!(
                "pulse widths must be at least {} us",
                MIN_PULSE_US
            )));
        }
        Ok(())
    }

    /// Offset to map the register window at within `device`.
    pub fn map_offset(&self) -> u64 {
        self.map_offset.unwrap_or(u64::from(self.base_address))
    }

    pub fn timing(&self) -> Timing {
        Timing {
            reset_pulse: Duration::from_micros(self.reset_pulse_us),
            cdc_settle: Duration::from_micros(self.cdc_settle_us),
        }
    }

    /// Polling parameters for `mode`, with overrides applied.
    pub fn poll_config(&self, mode: Mode) -> PollConfig {
        let overrides = match mode {
            Mode::Test => &self.test,
            Mode::Real => &self.real,
            Mode::KnownAnswer => &self.known_answer,
        };
        overrides.apply(mode.poll_config())
    }
}
