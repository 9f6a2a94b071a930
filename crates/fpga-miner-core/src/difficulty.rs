//! Compact difficulty ("bits") decoding and target layouts.
//!
//! The core takes its target as eight 32-bit words, word 0 being the least
//! significant. Two expansions live here:
//!
//! - [`simplified_target_words`] is the placeholder the parameter translator
//!   writes to the hardware: mantissa in word 0, all other words saturated.
//! - [`bits_to_target`] / [`target_words`] perform the real compact-to-target
//!   expansion and are used for reporting only.

use alloc::format;
use alloc::string::String;

/// Number of 32-bit words in a target.
pub const TARGET_WORDS: usize = 8;

/// Genesis block bits, the "difficulty 1" target.
pub const GENESIS_BITS: u32 = 0x1d00ffff;

/// Split compact bits into `(exponent, mantissa)`.
///
/// The mantissa is the full low 24 bits, sign bit included.
#[inline]
pub const fn split_bits(bits: u32) -> (u8, u32) {
    ((bits >> 24) as u8, bits & 0x00FF_FFFF)
}

/// Placeholder target expansion used when deriving hardware parameters.
///
/// Word 0 receives the mantissa, words 1..8 are `0xFFFFFFFF`. The exponent is
/// ignored. This is not the Bitcoin target for `bits`.
pub fn simplified_target_words(bits: u32) -> [u32; TARGET_WORDS] {
    let (_exponent, mantissa) = split_bits(bits);
    let mut words = [u32::MAX; TARGET_WORDS];
    words[0] = mantissa;
    words
}

/// Convert compact "bits" representation to a 256-bit target.
///
/// The bits format is: [exponent (1 byte)][mantissa (3 bytes)]
/// Target = mantissa * 256^(exponent - 3)
///
/// The result is a 32-byte big-endian representation of the target. Mantissa
/// bytes that would land above the 256-bit range are dropped.
pub fn bits_to_target(bits: u32) -> [u8; 32] {
    let exponent = ((bits >> 24) & 0xFF) as i32;
    let mantissa = bits & 0x007FFFFF;

    let mut target = [0u8; 32];

    // Negative flag (bit 23 of mantissa) never appears in valid targets
    if bits & 0x00800000 != 0 || exponent == 0 {
        return target;
    }

    let mantissa_bytes = [
        ((mantissa >> 16) & 0xFF) as u8,
        ((mantissa >> 8) & 0xFF) as u8,
        (mantissa & 0xFF) as u8,
    ];

    // Most significant mantissa byte sits at index 32 - exponent; bytes that
    // fall past the end were shifted out (exponent < 3).
    let first = 32 - exponent;
    for (i, byte) in mantissa_bytes.iter().enumerate() {
        let pos = first + i as i32;
        if (0..32).contains(&pos) {
            target[pos as usize] = *byte;
        }
    }

    target
}

/// Regroup a big-endian 256-bit target into hardware word order
/// (word 0 least significant).
pub fn target_words(target: &[u8; 32]) -> [u32; TARGET_WORDS] {
    let mut words = [0u32; TARGET_WORDS];
    for (i, word) in words.iter_mut().enumerate() {
        let end = 32 - i * 4;
        let mut be = [0u8; 4];
        be.copy_from_slice(&target[end - 4..end]);
        *word = u32::from_be_bytes(be);
    }
    words
}

/// Difficulty of header `bits` relative to the genesis target, for the
/// session log. An all-zero target reports as infinite.
pub fn bits_to_difficulty(bits: u32) -> f64 {
    let target = target_magnitude(&bits_to_target(bits));
    if target == 0.0 {
        return f64::INFINITY;
    }
    target_magnitude(&bits_to_target(GENESIS_BITS)) / target
}

/// Lossy magnitude of a big-endian target.
fn target_magnitude(target: &[u8; 32]) -> f64 {
    target
        .iter()
        .fold(0.0, |acc, byte| acc * 256.0 + f64::from(*byte))
}

/// Log-line rendering of a difficulty with a metric suffix, e.g. `"70.37T"`.
pub fn format_difficulty(difficulty: f64) -> String {
    const UNITS: [(f64, &str); 5] = [
        (1e15, "P"),
        (1e12, "T"),
        (1e9, "G"),
        (1e6, "M"),
        (1e3, "K"),
    ];

    if difficulty.is_infinite() {
        return String::from("inf");
    }
    let (scale, unit) = UNITS
        .iter()
        .copied()
        .find(|(scale, _)| difficulty >= *scale)
        .unwrap_or((1.0, ""));
    format!("{:.2}{}", difficulty / scale, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_bits() {
        assert_eq!(split_bits(0x1D00FFFF), (0x1D, 0x00FFFF));
        assert_eq!(split_bits(0x1703FFFC), (0x17, 0x03FFFC));
    }

    #[test]
    fn test_simplified_target_genesis_bits() {
        let words = simplified_target_words(0x1D00FFFF);

        assert_eq!(words[0], 0x0000FFFF);
        for (i, word) in words.iter().enumerate().skip(1) {
            assert_eq!(*word, 0xFFFFFFFF, "word {} should be saturated", i);
        }
    }

    #[test]
    fn test_simplified_target_ignores_exponent() {
        assert_eq!(
            simplified_target_words(0x1703FFFC)[1..],
            simplified_target_words(0x0103FFFC)[1..]
        );
        assert_eq!(simplified_target_words(0x1703FFFC)[0], 0x03FFFC);
    }

    #[test]
    fn test_bits_to_target_genesis() {
        let target = bits_to_target(GENESIS_BITS);

        // Expected target starts with 00000000ffff...
        assert_eq!(&target[0..6], &[0x00, 0x00, 0x00, 0x00, 0xff, 0xff]);
        for i in 6..32 {
            assert_eq!(target[i], 0x00, "byte {} should be 0", i);
        }
    }

    #[test]
    fn test_bits_to_target_high_difficulty() {
        // Exponent = 0x17 = 23, so target starts at byte 32-23 = 9
        let target = bits_to_target(0x17034219);

        for i in 0..9 {
            assert_eq!(target[i], 0x00, "byte {} should be 0", i);
        }
        assert_eq!(&target[9..12], &[0x03, 0x42, 0x19]);
    }

    #[test]
    fn test_bits_to_target_small_and_oversized_exponents() {
        // Exponent 1 keeps only the top mantissa byte
        let small = bits_to_target(0x01120000);
        assert_eq!(small[31], 0x12);
        assert_eq!(&small[..31], &[0u8; 31][..]);

        // Exponent 34 would overflow; the high bytes are dropped, no panic
        let big = bits_to_target(0x22010203);
        assert_eq!(&big[0..1], &[0x03]);
    }

    #[test]
    fn test_target_words_genesis_differs_from_placeholder() {
        let words = target_words(&bits_to_target(GENESIS_BITS));

        assert_eq!(words[7], 0x00000000);
        assert_eq!(words[6], 0xFFFF0000);
        assert!(words[..6].iter().all(|w| *w == 0));
        assert_ne!(words, simplified_target_words(GENESIS_BITS));
    }

    #[test]
    fn test_difficulty_calculation() {
        let genesis_diff = bits_to_difficulty(GENESIS_BITS);
        assert!((genesis_diff - 1.0).abs() < 0.01);

        // Real-mode header bits land in the tens of trillions
        let real = bits_to_difficulty(0x1703FFFC);
        assert!(real > 7.0e13 && real < 7.1e13);
        assert!(bits_to_difficulty(0).is_infinite());
    }

    #[test]
    fn test_format_difficulty() {
        assert_eq!(format_difficulty(1.0), "1.00");
        assert_eq!(format_difficulty(2.5e12), "2.50T");
        assert_eq!(format_difficulty(1500.0), "1.50K");
        assert_eq!(format_difficulty(f64::INFINITY), "inf");
    }
}
