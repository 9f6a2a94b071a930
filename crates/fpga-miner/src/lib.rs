//! Control-plane driver for the SHA-256d FPGA mining core.
//!
//! This crate provides:
//! - Instrumented register access over memory-mapped I/O
//! - Job loading and reset/start/stop sequencing
//! - A polling loop that drives a search to its outcome
//! - A register-level simulation of the core for running without hardware

pub mod config;
pub mod controller;
pub mod error;
pub mod mode;
pub mod poll;
pub mod session;
pub mod sim;
pub mod tracing;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use controller::{CoreState, Delay, JobController, StdDelay, Timing};
pub use error::{ConfigError, DriverError};
pub use mode::Mode;
pub use poll::{poll_until_done, PollConfig, PollReport};
pub use session::{run_session, SessionReport};
pub use sim::{SimConfig, SimulatedCore};
pub use transport::{MmioBus, RegisterBus, Registers};
