//! Terminal results of a polling session.

use serde::{Deserialize, Serialize};

/// How a hardware search ended.
///
/// Exhaustion and timeout are ordinary results, not errors: the core searches
/// a bounded nonce range and the driver bounds how long it waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    /// The core reported a nonce meeting the target.
    GoldenNonceFound { nonce: u32 },
    /// The core searched its whole range without a match.
    RangeExhausted,
    /// The driver gave up after its iteration cap.
    TimedOut,
}

impl JobOutcome {
    /// The golden nonce, if one was found.
    pub fn nonce(&self) -> Option<u32> {
        match self {
            JobOutcome::GoldenNonceFound { nonce } => Some(*nonce),
            _ => None,
        }
    }
}

impl core::fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            JobOutcome::GoldenNonceFound { nonce } => {
                write!(f, "golden nonce 0x{:08X} ({})", nonce, nonce)
            }
            JobOutcome::RangeExhausted => write!(f, "nonce range exhausted"),
            JobOutcome::TimedOut => write!(f, "timed out"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_only_for_found() {
        assert_eq!(JobOutcome::GoldenNonceFound { nonce: 7 }.nonce(), Some(7));
        assert_eq!(JobOutcome::RangeExhausted.nonce(), None);
        assert_eq!(JobOutcome::TimedOut.nonce(), None);
    }

    #[test]
    fn test_display() {
        let found = JobOutcome::GoldenNonceFound { nonce: 0x10 };
        assert_eq!(alloc::format!("{}", found), "golden nonce 0x00000010 (16)");
    }
}
