//! Error types for the driver.
//!
//! Bus faults have no variant here: a failed load or store on the register
//! space takes the process down.

use std::path::PathBuf;

use fpga_miner_core::regs::RegisterBank;

use crate::controller::CoreState;

/// Misuse of the job controller, or failure to reach the register window.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The requested operation is not valid in the current core state
    #[error("cannot {operation} while core is {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: CoreState,
    },

    /// More words than the register bank holds
    #[error("{len} words do not fit register bank {bank}")]
    BankOverflow { bank: RegisterBank, len: usize },

    /// The register window could not be mapped into this process
    #[error(
        "failed to map register window from {} at offset 0x{offset:X}: {source}",
        path.display()
    )]
    Map {
        path: PathBuf,
        offset: u64,
        #[source]
        source: std::io::Error,
    },
}

/// Problems reading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value parsed but is unusable
    #[error("invalid config value: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, DriverError>;
