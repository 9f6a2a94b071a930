//! Core data model for the SHA-256d FPGA miner.
//!
//! This crate provides pure Rust implementations of:
//! - The register map of the mining core
//! - Block header construction and serialization
//! - Compact difficulty decoding
//! - Translation of a header into hardware job parameters
//! - The terminal outcomes of a search

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod block;
pub mod difficulty;
pub mod job;
pub mod outcome;
pub mod regs;

pub use block::BlockHeader;
pub use difficulty::{bits_to_difficulty, bits_to_target, format_difficulty};
pub use job::{derive_job, MiningJob};
pub use outcome::JobOutcome;
pub use regs::{RegisterBank, Status};
