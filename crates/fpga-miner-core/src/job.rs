//! Mining job parameters and the header-to-parameter translation.
//!
//! A [`MiningJob`] is the complete set of values the core needs before it can
//! be started: midstate, residual block data and target. The derivation here
//! is deliberately simplified. The midstate is a fixed test pattern rather
//! than a SHA-256 compression of the first header block, and the target uses
//! [`simplified_target_words`] rather than the real compact expansion.

use serde::{Deserialize, Serialize};

use crate::block::BlockHeader;
use crate::difficulty::{simplified_target_words, TARGET_WORDS};

/// Number of midstate words.
pub const MIDSTATE_WORDS: usize = 8;
/// Number of residual data words.
pub const RESIDUAL_WORDS: usize = 3;

/// First word of the placeholder midstate; word `i` is this plus `i`.
pub const PLACEHOLDER_MIDSTATE_SEED: u32 = 0x12345678;
/// SHA-256 padding marker placed after the residual data.
pub const PADDING_MARKER: u32 = 0x80000000;
/// Message length field written by the translator.
pub const HEADER_BIT_LENGTH: u32 = 0x00000140;

/// Target that almost every hash meets, for bring-up runs.
pub const EASY_TARGET: [u32; TARGET_WORDS] = [
    0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFF,
    0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFF, 0x000000FF,
];

/// Target no hash can meet; the core should always exhaust or time out.
pub const UNREACHABLE_TARGET: [u32; TARGET_WORDS] = [0; TARGET_WORDS];

/// SHA-256 initial hash values.
const SHA256_IV: [u32; MIDSTATE_WORDS] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a,
    0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Parameters of one hardware search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningJob {
    /// SHA-256 state after the first 64 bytes of the header.
    pub midstate: [u32; MIDSTATE_WORDS],
    /// Remaining header words (nonce seed, padding, length).
    pub residual: [u32; RESIDUAL_WORDS],
    /// Target, word 0 least significant.
    pub target: [u32; TARGET_WORDS],
}

impl MiningJob {
    /// Replace the target, keeping midstate and residual data.
    pub fn with_target(mut self, target: [u32; TARGET_WORDS]) -> Self {
        self.target = target;
        self
    }

    /// Known-answer job used to verify a freshly programmed bitstream.
    ///
    /// The midstate is the SHA-256 IV and the residual block holds only
    /// padding and length. The core under test is expected to report a
    /// golden nonce quickly against this target.
    pub fn known_answer() -> Self {
        let mut target = [0xFFFFFFFF; TARGET_WORDS];
        target[0] = 0x0000FFFF;

        MiningJob {
            midstate: SHA256_IV,
            residual: [PADDING_MARKER, 0x00000000, 0x00000100],
            target,
        }
    }
}

/// Translate a block header into hardware job parameters.
///
/// - midstate: `PLACEHOLDER_MIDSTATE_SEED + i`
/// - residual: `[header.nonce, PADDING_MARKER, HEADER_BIT_LENGTH]`
/// - target: mantissa of `header.bits` in word 0, other words saturated
pub fn derive_job(header: &BlockHeader) -> MiningJob {
    let mut midstate = [0u32; MIDSTATE_WORDS];
    for (i, word) in midstate.iter_mut().enumerate() {
        *word = PLACEHOLDER_MIDSTATE_SEED.wrapping_add(i as u32);
    }

    MiningJob {
        midstate,
        residual: [header.nonce, PADDING_MARKER, HEADER_BIT_LENGTH],
        target: simplified_target_words(header.bits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_job_genesis_bits() {
        let header = BlockHeader::new(1700000000, 0x1D00FFFF);
        let job = derive_job(&header);

        assert_eq!(job.target[0], 0x0000FFFF);
        assert!(job.target[1..].iter().all(|w| *w == 0xFFFFFFFF));
    }

    #[test]
    fn test_derive_job_placeholder_midstate() {
        let job = derive_job(&BlockHeader::new(0, 0x1703FFFC));

        assert_eq!(job.midstate[0], 0x12345678);
        assert_eq!(job.midstate[7], 0x1234567F);
    }

    #[test]
    fn test_derive_job_residual_carries_nonce_seed() {
        let mut header = BlockHeader::new(0, 0x1D00FFFF);
        header.nonce = 0xCAFEBABE;

        let job = derive_job(&header);
        assert_eq!(job.residual, [0xCAFEBABE, 0x80000000, 0x00000140]);
    }

    #[test]
    fn test_derive_job_ignores_timestamp() {
        let a = derive_job(&BlockHeader::new(1, 0x1D00FFFF));
        let b = derive_job(&BlockHeader::new(2, 0x1D00FFFF));
        assert_eq!(a, b);
    }

    #[test]
    fn test_with_target_keeps_other_banks() {
        let derived = derive_job(&BlockHeader::new(0, 0x1D00FFFF));
        let easy = derived.with_target(EASY_TARGET);

        assert_eq!(easy.midstate, derived.midstate);
        assert_eq!(easy.residual, derived.residual);
        assert_eq!(easy.target[7], 0x000000FF);
    }

    #[test]
    fn test_known_answer_job() {
        let job = MiningJob::known_answer();

        assert_eq!(job.midstate[0], 0x6a09e667);
        assert_eq!(job.residual, [0x80000000, 0, 0x100]);
        assert_eq!(job.target[0], 0x0000FFFF);
    }
}
