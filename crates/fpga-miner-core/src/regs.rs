//! Register map of the SHA-256d mining core.
//!
//! All registers are 32 bits wide. Offsets are relative to the AXI base
//! address of the core; the parameter banks are laid out as consecutive
//! words starting at a fixed bank offset.

/// Default AXI base address of the core in the reference block design.
pub const DEFAULT_BASE_ADDR: u32 = 0x43C0_0000;

/// Width of one register in bytes.
pub const WORD_BYTES: u32 = 4;

/// Size of the register window, covering all banks.
pub const WINDOW_BYTES: usize = 0x400;

/// Soft reset control (write 1, hold, write 0).
pub const CTRL_RESET: u32 = 0x000;
/// Start control (fire once).
pub const CTRL_START: u32 = 0x004;
/// Status register, see [`STATUS_FOUND`] and [`STATUS_EXHAUSTED`].
pub const STATUS: u32 = 0x008;
/// Golden nonce result. Only meaningful while the found bit is set.
pub const GOLDEN_NONCE: u32 = 0x00C;
/// Current-nonce request pulse (write 1, settle, write 0).
pub const CTRL_CURRENT_NONCE_REQ: u32 = 0x010;
/// Current nonce value, valid after a request pulse round-trip.
pub const CURRENT_NONCE: u32 = 0x014;

/// Status bit 0: a golden nonce was found.
pub const STATUS_FOUND: u32 = 1 << 0;
/// Status bit 1: the nonce range was exhausted without a match.
pub const STATUS_EXHAUSTED: u32 = 1 << 1;

/// Value written to assert a control line.
pub const ASSERT: u32 = 1;
/// Value written to release a control line.
pub const DEASSERT: u32 = 0;

/// An address range of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterBank {
    /// Control and status registers.
    Control,
    /// SHA-256 midstate, 8 words.
    MidState,
    /// Residual block data, 3 words.
    ResidualData,
    /// 256-bit difficulty target, 8 words.
    Target,
}

impl RegisterBank {
    /// Parameter banks in the order the loader writes them.
    pub const PARAMETER_BANKS: [RegisterBank; 3] = [
        RegisterBank::MidState,
        RegisterBank::ResidualData,
        RegisterBank::Target,
    ];

    /// Offset of the first word of this bank.
    pub const fn base_offset(self) -> u32 {
        match self {
            RegisterBank::Control => 0x000,
            RegisterBank::MidState => 0x100,
            RegisterBank::ResidualData => 0x200,
            RegisterBank::Target => 0x300,
        }
    }

    /// Number of addressable 32-bit words in this bank.
    pub const fn word_count(self) -> usize {
        match self {
            RegisterBank::Control => 6,
            RegisterBank::MidState => 8,
            RegisterBank::ResidualData => 3,
            RegisterBank::Target => 8,
        }
    }

    /// Offset of word `index`, or `None` if the index is outside the bank.
    pub const fn word_offset(self, index: usize) -> Option<u32> {
        if index < self.word_count() {
            Some(self.base_offset() + index as u32 * WORD_BYTES)
        } else {
            None
        }
    }

    /// Short name used in log output.
    pub fn name(self) -> &'static str {
        match self {
            RegisterBank::Control => "CONTROL",
            RegisterBank::MidState => "MID_STATE",
            RegisterBank::ResidualData => "RESIDUAL_DATA",
            RegisterBank::Target => "TARGET",
        }
    }
}

impl core::fmt::Display for RegisterBank {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decoded contents of the status register.
///
/// The two bits are not mutually exclusive; callers check `found` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status {
    pub found: bool,
    pub exhausted: bool,
}

impl Status {
    /// Decode a raw status register value. Unused bits are ignored.
    pub const fn from_raw(raw: u32) -> Self {
        Status {
            found: raw & STATUS_FOUND != 0,
            exhausted: raw & STATUS_EXHAUSTED != 0,
        }
    }

    /// Encode back into a register value.
    pub const fn to_raw(self) -> u32 {
        let mut raw = 0;
        if self.found {
            raw |= STATUS_FOUND;
        }
        if self.exhausted {
            raw |= STATUS_EXHAUSTED;
        }
        raw
    }
}
