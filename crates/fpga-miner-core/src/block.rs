//! Bitcoin block header as consumed by the parameter translator.

use crate::difficulty::bits_to_target;

/// Block version with BIP9 versionbits signaling.
pub const BLOCK_VERSION: i32 = 0x20000000;

/// Size of a serialized block header in bytes.
pub const BLOCK_HEADER_SIZE: usize = 80;

/// A Bitcoin block header (80 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block version with BIP9 versionbits.
    pub version: i32,
    /// Hash of the previous block (internal byte order).
    pub prev_block_hash: [u8; 32],
    /// Merkle root of all transactions.
    pub merkle_root: [u8; 32],
    /// Block timestamp (Unix time).
    pub timestamp: u32,
    /// Difficulty target in compact "bits" format.
    pub bits: u32,
    /// Nonce the search starts from.
    pub nonce: u32,
}

impl BlockHeader {
    /// Create a header with zeroed hashes, as used by the bring-up sessions.
    pub fn new(timestamp: u32, bits: u32) -> Self {
        BlockHeader {
            version: BLOCK_VERSION,
            prev_block_hash: [0u8; 32],
            merkle_root: [0u8; 32],
            timestamp,
            bits,
            nonce: 0,
        }
    }

    /// Serialize the block header to 80 bytes.
    pub fn serialize(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut header = [0u8; BLOCK_HEADER_SIZE];

        header[0..4].copy_from_slice(&self.version.to_le_bytes());
        header[4..36].copy_from_slice(&self.prev_block_hash);
        header[36..68].copy_from_slice(&self.merkle_root);
        header[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        header[72..76].copy_from_slice(&self.bits.to_le_bytes());
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());

        header
    }

    /// Serialized header as lowercase hex, for log output.
    pub fn to_hex(&self) -> alloc::string::String {
        hex::encode(self.serialize())
    }

    /// Get the true 256-bit target encoded by `bits` (big-endian).
    pub fn target(&self) -> [u8; 32] {
        bits_to_target(self.bits)
    }
}

/// Get the current Unix timestamp.
#[cfg(feature = "std")]
pub fn current_timestamp() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

#[cfg(not(feature = "std"))]
pub fn current_timestamp() -> u32 {
    // No wall clock without std; the timestamp is informational only
    0
}
